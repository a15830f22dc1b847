//! Before/after hook traits for the dispatch pipeline.
//!
//! Hooks observe every call for cross-cutting concerns (logging, auditing).
//! They cannot change the arguments or results; an `Err` aborts the call.

use appwire_core::Value;

/// Runs before an operation is looked up and invoked.
///
/// Used as `Arc<dyn BeforeHook>`. Any `Fn(&str, &[Value]) -> anyhow::Result<()>`
/// closure implements this trait.
pub trait BeforeHook: Send + Sync {
    /// Observe the operation name and the arguments it will receive.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the call before the operation runs.
    fn before(&self, name: &str, args: &[Value]) -> anyhow::Result<()>;
}

/// Runs after an operation returned successfully.
///
/// Used as `Arc<dyn AfterHook>`. Any `Fn(&str, &[Value]) -> anyhow::Result<()>`
/// closure implements this trait.
pub trait AfterHook: Send + Sync {
    /// Observe the operation name and its results.
    ///
    /// # Errors
    ///
    /// Returning an error fails the call; the results are discarded.
    fn after(&self, name: &str, results: &[Value]) -> anyhow::Result<()>;
}

impl<F> BeforeHook for F
where
    F: Fn(&str, &[Value]) -> anyhow::Result<()> + Send + Sync,
{
    fn before(&self, name: &str, args: &[Value]) -> anyhow::Result<()> {
        self(name, args)
    }
}

impl<F> AfterHook for F
where
    F: Fn(&str, &[Value]) -> anyhow::Result<()> + Send + Sync,
{
    fn after(&self, name: &str, results: &[Value]) -> anyhow::Result<()> {
        self(name, results)
    }
}

/// Hook that emits one `debug` event per call stage with the value types.
///
/// Installed on both chains to get a type-level trace of the traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceHook;

impl TraceHook {
    fn type_names(values: &[Value]) -> Vec<&'static str> {
        values.iter().map(Value::type_name).collect()
    }
}

impl BeforeHook for TraceHook {
    fn before(&self, name: &str, args: &[Value]) -> anyhow::Result<()> {
        tracing::debug!(operation = name, args = ?Self::type_names(args), "dispatching");
        Ok(())
    }
}

impl AfterHook for TraceHook {
    fn after(&self, name: &str, results: &[Value]) -> anyhow::Result<()> {
        tracing::debug!(operation = name, results = ?Self::type_names(results), "dispatched");
        Ok(())
    }
}
