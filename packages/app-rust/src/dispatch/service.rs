//! Tower adapter: exposes a shared [`Dispatcher`] as `tower::Service<Call>`.

use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use appwire_core::{DispatchError, Value};
use tower::Service;

use super::dispatcher::Dispatcher;

/// A request for one dispatched call.
#[derive(Debug)]
pub struct Call {
    pub name: String,
    pub args: Vec<Value>,
}

impl Call {
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// `tower::Service` wrapper around a shared dispatcher.
///
/// Always ready. The call runs synchronously inside `Service::call`; the
/// returned future is already resolved.
#[derive(Debug, Clone)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl Service<Call> for DispatchService {
    type Response = Vec<Value>;
    type Error = DispatchError;
    type Future = Ready<Result<Vec<Value>, DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Call) -> Self::Future {
        ready(self.dispatcher.call(&req.name, req.args))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
