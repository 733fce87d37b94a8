//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     module directories
//!     → registry discovery (one module per directory)
//!     → dependency admission
//!     → Router (immutable table, swapped whole on reload)
//!
//! Per request:
//!     Request
//!     → DispatchContext (request-local stack + filter state)
//!     → dispatcher.rs (prefix match in registration order, first answer wins)
//!     → fallback.rs (only when no module answered or one failed)
//!     → Response
//! ```

pub mod context;
pub mod dispatcher;
pub mod fallback;
pub mod filters;
pub mod paths;
pub mod stack;

pub use context::{DispatchContext, DEFAULT_MAX_DEPTH};
pub use dispatcher::{DispatchOutcome, Router};
pub use fallback::build_safe_response;
pub use filters::{FailedFilter, FilterLog, FilterManager};
pub use stack::ModuleStack;
