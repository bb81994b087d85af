//! Debug overlay
//!
//! [`DebugOverlayController`] owns the session state and composes the
//! validator, profiler, graph and layout into what the menu and the
//! callbacks panel display.

mod controller;
mod menu;
mod session;
mod sink;
mod stats;

pub use controller::DebugOverlayController;
pub use menu::{CallbackGraphView, CallbackSampleView, DebugMenu, NodeView};
pub use session::{DebugSessionState, OverlayError};
pub use sink::{ConsoleEntry, ConsoleLevel, ConsoleSink, MemorySink, TracingSink};
pub use stats::{OverlayStat, StatValue, sample_stats};
