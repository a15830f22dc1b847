//! Application wiring: components registered around one shared dispatcher.

pub mod component;
pub mod registry;
pub mod runtime;

pub use component::{Component, ComponentContext};
pub use registry::ComponentRegistry;
pub use runtime::{App, AppError};
