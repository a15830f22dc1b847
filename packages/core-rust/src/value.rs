//! Type-erased values passed to and returned from dispatched operations.
//!
//! A [`Value`] owns a single boxed value of any `'static + Send + Sync` type and
//! remembers the concrete type name so that signature mismatches can report
//! what was actually supplied.

use std::any::{self, Any};
use std::fmt;

/// An owned, type-erased argument or result value.
///
/// Only the operation that consumes a `Value` knows its concrete type; the
/// dispatcher moves values around without inspecting them.
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`, erasing its type.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// Name of the concrete type held, as reported by `std::any::type_name`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the held value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the held value as a `T`, if that is its type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Takes the held value out as a `T`.
    ///
    /// # Errors
    ///
    /// Returns the untouched `Value` if it does not hold a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Self { inner, type_name }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.type_name).finish()
    }
}

/// Builds a `Vec<Value>` from a list of expressions, erasing each one.
///
/// ```
/// use appwire_core::{values, Value};
///
/// let args: Vec<Value> = values![2_i32, "three".to_string()];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($value)),+]
    };
}
