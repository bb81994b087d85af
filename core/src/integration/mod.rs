//! Integration tests for the devlens core
//!
//! Drives the overlay controller the way a host framework would: render
//! components, register callbacks, fire invocations and open the callbacks
//! panel.

#[cfg(test)]
mod scenario_tests;
