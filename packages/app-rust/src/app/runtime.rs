//! `App`: owns the shared dispatcher and drives component lifecycles.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::component::{Component, ComponentContext};
use super::registry::ComponentRegistry;
use crate::config::AppConfig;
use crate::dispatch::Dispatcher;

/// Errors from the application lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("component `{name}` already registered")]
    DuplicateComponent { name: &'static str },
    #[error("application already wired")]
    AlreadyWired,
    #[error("application wiring failed earlier; it cannot be wired or started again")]
    WiringFailed,
    #[error("component `{name}` failed to wire: {source}")]
    Wire {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("component `{name}` failed to start: {source}")]
    Start {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("component `{name}` failed to shut down: {source}")]
    Shutdown {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("component `{name}` did not shut down within {timeout_ms}ms")]
    ShutdownTimeout { name: &'static str, timeout_ms: u64 },
}

/// Progress of the wiring phase. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireState {
    Unwired,
    Wired,
    Failed,
}

/// Application shell wiring components around one shared [`Dispatcher`].
///
/// Typical use: build components holding `app.dispatcher()`, add them, then
/// `start().await` (wiring happens first), and `shutdown().await` on exit.
pub struct App {
    config: Arc<AppConfig>,
    dispatcher: Arc<Dispatcher>,
    components: ComponentRegistry,
    /// Held for the whole wiring phase so concurrent `wire`/`start` calls serialize.
    wire_state: Mutex<WireState>,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::with_config(config.dispatcher.clone()));
        Self {
            config: Arc::new(config),
            dispatcher,
            components: ComponentRegistry::new(),
            wire_state: Mutex::new(WireState::Unwired),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The shared dispatcher handle.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Add a component. Order of addition is wire/start order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateComponent`] if the name is taken.
    pub fn add_component<T: Component>(&self, component: T) -> Result<(), AppError> {
        let name = component.name();
        if self.components.register(component) {
            tracing::debug!(app = %self.config.name, component = name, "component added");
            Ok(())
        } else {
            Err(AppError::DuplicateComponent { name })
        }
    }

    /// Look up a component by concrete type. With several components of one
    /// type, this is the first one added.
    #[must_use]
    pub fn component<T: Component>(&self) -> Option<Arc<T>> {
        self.components.get::<T>()
    }

    /// Look up a component by name.
    #[must_use]
    pub fn component_by_name(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components.get_by_name(name)
    }

    /// Whether the wiring phase completed successfully.
    #[must_use]
    pub fn is_wired(&self) -> bool {
        *self.wire_state.lock() == WireState::Wired
    }

    /// Run the wiring phase: each component registers its operations and
    /// hooks, in registration order. Stops at the first failure, after which
    /// the application can no longer be wired or started.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyWired`] on a second call,
    /// [`AppError::WiringFailed`] after an earlier failure, or
    /// [`AppError::Wire`] naming the component that failed.
    pub fn wire(&self) -> Result<(), AppError> {
        let mut state = self.wire_state.lock();
        match *state {
            WireState::Unwired => {}
            WireState::Wired => return Err(AppError::AlreadyWired),
            WireState::Failed => return Err(AppError::WiringFailed),
        }
        for component in self.components.in_order() {
            let name = component.name();
            if let Err(source) = component.wire(&self.dispatcher) {
                tracing::error!(app = %self.config.name, component = name, error = %source, "wiring failed");
                *state = WireState::Failed;
                return Err(AppError::Wire { name, source });
            }
        }
        *state = WireState::Wired;
        tracing::info!(
            app = %self.config.name,
            components = self.components.len(),
            operations = self.dispatcher.len(),
            "application wired"
        );
        Ok(())
    }

    /// Wire (if not yet wired) and start every component in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first wiring or start failure, or [`AppError::WiringFailed`]
    /// if an earlier wiring attempt failed.
    pub async fn start(&self) -> Result<(), AppError> {
        if !self.is_wired() {
            match self.wire() {
                Ok(()) | Err(AppError::AlreadyWired) => {}
                Err(err) => return Err(err),
            }
        }
        let ctx = ComponentContext {
            config: Arc::clone(&self.config),
            dispatcher: Arc::clone(&self.dispatcher),
        };
        for component in self.components.in_order() {
            let name = component.name();
            component
                .start(&ctx)
                .await
                .map_err(|source| AppError::Start { name, source })?;
            tracing::debug!(app = %self.config.name, component = name, "component started");
        }
        tracing::info!(app = %self.config.name, "application started");
        Ok(())
    }

    /// Shut down every component in reverse registration order.
    ///
    /// Each component gets `shutdown_timeout_ms` to finish.
    ///
    /// # Errors
    ///
    /// Returns the first shutdown failure or timeout.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let timeout_ms = self.config.shutdown_timeout_ms;
        for component in self.components.in_order().iter().rev() {
            let name = component.name();
            match tokio::time::timeout(Duration::from_millis(timeout_ms), component.shutdown()).await
            {
                Ok(Ok(())) => {
                    tracing::debug!(app = %self.config.name, component = name, "component stopped");
                }
                Ok(Err(source)) => return Err(AppError::Shutdown { name, source }),
                Err(_elapsed) => {
                    tracing::warn!(app = %self.config.name, component = name, timeout_ms, "shutdown timed out");
                    return Err(AppError::ShutdownTimeout { name, timeout_ms });
                }
            }
        }
        tracing::info!(app = %self.config.name, "application stopped");
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
