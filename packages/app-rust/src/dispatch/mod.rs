//! Operation dispatch.
//!
//! 1. **Registry** (`dispatcher`): operation name -> type-erased operation
//! 2. **Hooks** (`hooks`): before/after chains run around every call
//! 3. **Tower adapter** (`service`): the dispatcher as a `tower::Service`

pub mod dispatcher;
pub mod hooks;
pub mod service;

pub use dispatcher::Dispatcher;
pub use hooks::{AfterHook, BeforeHook, TraceHook};
pub use service::{Call, DispatchService};
