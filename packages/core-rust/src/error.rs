//! Error taxonomy for registration and dispatch.
//!
//! None of these conditions are transient. The dispatcher returns them to the
//! caller unchanged and never retries.

use std::fmt;

/// Which hook chain a failing hook belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Before,
    After,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Mismatch between the supplied arguments and an operation's parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("expected {expected} argument(s), got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("argument {position} expected `{expected}`, got `{actual}`")]
    Type {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors raised while registering or dispatching operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("operation name must not be empty")]
    InvalidName,
    #[error("operation `{name}` already registered")]
    DuplicateRegistration { name: String },
    #[error("no such operation: `{name}`")]
    UnknownOperation { name: String },
    #[error("signature mismatch calling `{name}`: {source}")]
    SignatureMismatch {
        name: String,
        #[source]
        source: SignatureError,
    },
    #[error("operation `{name}` failed: {source}")]
    Operation {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{stage} hook failed for `{name}`: {source}")]
    Hook {
        name: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Name of the operation the error refers to, if any.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        match self {
            Self::InvalidName => None,
            Self::DuplicateRegistration { name }
            | Self::UnknownOperation { name }
            | Self::SignatureMismatch { name, .. }
            | Self::Operation { name, .. }
            | Self::Hook { name, .. } => Some(name),
        }
    }
}

/// Failure produced by an [`Operation`](crate::Operation) before the
/// dispatcher attaches the operation name.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl InvokeError {
    /// Attaches the operation name, producing the caller-facing error.
    #[must_use]
    pub fn for_operation(self, name: &str) -> DispatchError {
        let name = name.to_string();
        match self {
            Self::Signature(source) => DispatchError::SignatureMismatch { name, source },
            Self::Failed(source) => DispatchError::Operation { name, source },
        }
    }
}
