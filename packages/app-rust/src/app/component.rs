//! Lifecycle-managed application parts (Controller, Service, Dao roles).

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;

/// Context provided to components when they start.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<Dispatcher>,
}

/// An application part with a wire/start/shutdown lifecycle.
///
/// Components are wired and started in registration order and shut down in
/// reverse order. The `Any` bound enables type-based lookup via
/// [`App::component`](super::App::component).
#[async_trait]
pub trait Component: Send + Sync + Any {
    /// Unique name of this component (e.g. `"controller"`, `"dao"`).
    fn name(&self) -> &'static str;

    /// Wiring phase: register operations and hooks on the shared dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if a registration fails; the application does not start.
    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()>;

    /// Serving phase entry point. Default is a no-op.
    async fn start(&self, _ctx: &ComponentContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources. Default is a no-op.
    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
