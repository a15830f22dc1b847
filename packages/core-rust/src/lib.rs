//! `appwire` core: type-erased values, typed operation adapters, and dispatch errors.

pub mod error;
pub mod handler;
pub mod value;

pub use error::{DispatchError, HookStage, InvokeError, SignatureError};
pub use handler::{Handler, IntoResults, Operation, RawOperation, TypedOperation};
pub use value::Value;

