//! Shared types for the devlens introspection layer.
//!
//! Everything here crosses the boundary into the rendering layer, so it is
//! plain serializable data with no behavior beyond validation.

pub mod ids;
pub mod layout;
pub mod profile;
pub mod state;

pub use ids::{CallbackId, NodeKey, NodeKeyError, is_valid_component_id, is_valid_prop_name};
pub use layout::LayoutPosition;
pub use profile::{InvocationOutcome, NetworkTiming, ProfileSample};
pub use state::{
    CallbackProfileView, GraphLayoutState, ObservableState, PositionView, ProfileState,
};
