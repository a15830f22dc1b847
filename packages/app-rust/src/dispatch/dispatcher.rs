//! Name-based operation dispatcher with ordered before/after hook chains.

use std::sync::Arc;
use std::time::Instant;

use appwire_core::{DispatchError, Handler, HookStage, Operation, TypedOperation, Value};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug_span;

use super::hooks::{AfterHook, BeforeHook};
use crate::config::DispatcherConfig;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Registry of named operations plus the hook chains run around every call.
///
/// All methods take `&self`, so one `Arc<Dispatcher>` can be handed to every
/// collaborator during wiring and then used concurrently while serving.
/// Registration and hook installation may race with calls: a call sees the
/// hooks present when it takes its snapshot of each chain.
pub struct Dispatcher {
    config: DispatcherConfig,
    /// Operation name -> operation. Entries are never removed.
    operations: DashMap<String, Arc<dyn Operation>>,
    /// Run in registration order before lookup.
    before: RwLock<Vec<Arc<dyn BeforeHook>>>,
    /// Run in registration order after a successful invocation.
    after: RwLock<Vec<Arc<dyn AfterHook>>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Creates an empty dispatcher.
    #[must_use]
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            config,
            operations: DashMap::new(),
            before: RwLock::new(Vec::new()),
            after: RwLock::new(Vec::new()),
        }
    }

    /// Register a typed function under `name`.
    ///
    /// Any `Fn(A1, ..., An) -> R` with up to eight `'static + Send + Sync`
    /// parameters and an [`IntoResults`](appwire_core::IntoResults) return
    /// type is accepted. Arguments are downcast positionally at call time.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidName`] for an empty name and
    /// [`DispatchError::DuplicateRegistration`] if `name` is taken; the
    /// existing binding is left untouched.
    pub fn register<H, M>(&self, name: impl Into<String>, handler: H) -> Result<(), DispatchError>
    where
        H: Handler<M>,
        M: 'static,
    {
        self.register_operation(name, Arc::new(TypedOperation::new(handler)))
    }

    /// Register an already type-erased operation under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::register`].
    pub fn register_operation(
        &self,
        name: impl Into<String>,
        operation: Arc<dyn Operation>,
    ) -> Result<(), DispatchError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DispatchError::InvalidName);
        }
        match self.operations.entry(name) {
            Entry::Occupied(entry) => {
                tracing::error!(operation = %entry.key(), "operation already registered");
                Err(DispatchError::DuplicateRegistration {
                    name: entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                tracing::debug!(operation = %entry.key(), "operation registered");
                entry.insert(operation);
                Ok(())
            }
        }
    }

    /// Append a closure to the before-hook chain.
    pub fn add_before_hook<F>(&self, hook: F)
    where
        F: Fn(&str, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_shared_before_hook(Arc::new(hook));
    }

    /// Append a shared hook to the before-hook chain. The same hook may be
    /// added more than once and then runs once per addition.
    pub fn add_shared_before_hook(&self, hook: Arc<dyn BeforeHook>) {
        self.before.write().push(hook);
    }

    /// Append a closure to the after-hook chain.
    pub fn add_after_hook<F>(&self, hook: F)
    where
        F: Fn(&str, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_shared_after_hook(Arc::new(hook));
    }

    /// Append a shared hook to the after-hook chain.
    pub fn add_shared_after_hook(&self, hook: Arc<dyn AfterHook>) {
        self.after.write().push(hook);
    }

    /// Invoke the operation registered under `name`.
    ///
    /// Runs every before-hook with `(name, &args)`, resolves and invokes the
    /// operation, then runs every after-hook with `(name, &results)`. No lock
    /// is held while user code runs, so operations and hooks may call back
    /// into the dispatcher.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Hook`] if any hook fails; later stages are skipped.
    /// - [`DispatchError::UnknownOperation`] if `name` is not registered.
    /// - [`DispatchError::SignatureMismatch`] if `args` do not fit the operation.
    /// - [`DispatchError::Operation`] if the operation reports a failure.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Vec<Value>, DispatchError> {
        let span = debug_span!(
            "dispatch",
            operation = name,
            args = args.len(),
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        let _entered = span.enter();

        let start = Instant::now();
        let result = self.run_pipeline(name, args);

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        span.record("duration_ms", duration_ms);
        span.record("outcome", outcome);

        let threshold = self.config.slow_call_threshold_ms;
        if threshold > 0 && duration_ms >= threshold {
            tracing::warn!(
                operation = name,
                duration_ms,
                threshold_ms = threshold,
                "slow operation call"
            );
        }
        match &result {
            Ok(results) => {
                tracing::debug!(operation = name, results = results.len(), duration_ms, "call complete");
            }
            Err(err) => tracing::debug!(operation = name, error = %err, duration_ms, "call failed"),
        }
        result
    }

    fn run_pipeline(&self, name: &str, args: Vec<Value>) -> Result<Vec<Value>, DispatchError> {
        let before = self.before.read().clone();
        for hook in &before {
            hook.before(name, &args)
                .map_err(|source| hook_error(name, HookStage::Before, source))?;
        }

        let operation = self.operation(name).ok_or_else(|| DispatchError::UnknownOperation {
            name: name.to_string(),
        })?;
        let results = operation
            .invoke(args)
            .map_err(|err| err.for_operation(name))?;

        let after = self.after.read().clone();
        for hook in &after {
            hook.after(name, &results)
                .map_err(|source| hook_error(name, HookStage::After, source))?;
        }
        Ok(results)
    }

    /// Clone the operation handle out of the map so no shard lock outlives the lookup.
    fn operation(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an operation is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Registered operation names, sorted.
    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .operations
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn before_hook_count(&self) -> usize {
        self.before.read().len()
    }

    #[must_use]
    pub fn after_hook_count(&self) -> usize {
        self.after.read().len()
    }

    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("operations", &self.operation_names())
            .field("before_hooks", &self.before_hook_count())
            .field("after_hooks", &self.after_hook_count())
            .finish()
    }
}

fn hook_error(name: &str, stage: HookStage, source: anyhow::Error) -> DispatchError {
    DispatchError::Hook {
        name: name.to_string(),
        stage,
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
