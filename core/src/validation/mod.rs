//! Prop checking
//!
//! Components declare a [`PropSchema`] per type; [`PropValidator::validate`]
//! walks it on every render pass and returns the violations as data. Nothing
//! here aborts rendering or touches the props themselves.

pub mod schema;
pub mod validator;

pub use schema::{PropKind, PropSchema, PropSchemaBuilder, PropSpec};
pub use validator::{PropValidator, ValidationViolation, ViolationKind};
