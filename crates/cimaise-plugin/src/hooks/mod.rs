//! Hook system: registry, dispatch, and the well-known hook catalog.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::HookPoint;
pub use registry::{DEFAULT_PRIORITY, HookId, HookInfo, HookKind, HookRegistry, Signature};
