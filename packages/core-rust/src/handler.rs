//! Typed adapters between plain Rust functions and the type-erased
//! [`Operation`] interface.
//!
//! A function `Fn(A1, ..., An) -> R` becomes an operation by way of
//! [`Handler`]: arguments are downcast positionally and the return value is
//! split into result values by [`IntoResults`]. No reflection is involved; the
//! adapter for each arity is generated at compile time.

use std::any::{self, Any};
use std::marker::PhantomData;

use crate::error::{InvokeError, SignatureError};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A callable unit of work with a uniform, type-erased signature.
///
/// Used as `Arc<dyn Operation>` inside the dispatcher registry.
pub trait Operation: Send + Sync {
    /// Invoke the operation, consuming the argument list.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Signature`] if the arguments do not fit the
    /// operation's parameters, or [`InvokeError::Failed`] if the operation
    /// itself reports a failure.
    fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError>;
}

/// Raw operation built from a closure over the erased argument list.
pub struct RawOperation<F>(F);

impl<F> RawOperation<F>
where
    F: Fn(Vec<Value>) -> Result<Vec<Value>, InvokeError> + Send + Sync,
{
    #[must_use]
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Operation for RawOperation<F>
where
    F: Fn(Vec<Value>) -> Result<Vec<Value>, InvokeError> + Send + Sync,
{
    fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        (self.0)(args)
    }
}

// ---------------------------------------------------------------------------
// IntoResults
// ---------------------------------------------------------------------------

/// Conversion of a function's return value into an ordered result list.
///
/// - `()` yields no results.
/// - Tuples yield one value per element, in order.
/// - `Result<T, E>` yields `T`'s results or fails the call with `E`.
/// - Scalars, `String`, `Vec<T>`, `Option<T>`, `Box<T>` and [`Value`]
///   yield a single value.
///
/// Other types can be returned as a 1-tuple, e.g. `(my_struct,)`.
pub trait IntoResults {
    /// Split `self` into result values.
    ///
    /// # Errors
    ///
    /// Returns an error if `self` represents a failed operation.
    fn into_results(self) -> anyhow::Result<Vec<Value>>;
}

impl IntoResults for () {
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

impl IntoResults for Value {
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        Ok(vec![self])
    }
}

impl<T, E> IntoResults for Result<T, E>
where
    T: IntoResults,
    E: Into<anyhow::Error>,
{
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        match self {
            Ok(value) => value.into_results(),
            Err(err) => Err(err.into()),
        }
    }
}

macro_rules! single_result {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResults for $ty {
                fn into_results(self) -> anyhow::Result<Vec<Value>> {
                    Ok(vec![Value::new(self)])
                }
            }
        )*
    };
}

single_result!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

impl<T: Any + Send + Sync> IntoResults for Vec<T> {
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        Ok(vec![Value::new(self)])
    }
}

impl<T: Any + Send + Sync> IntoResults for Option<T> {
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        Ok(vec![Value::new(self)])
    }
}

impl<T: Any + Send + Sync> IntoResults for Box<T> {
    fn into_results(self) -> anyhow::Result<Vec<Value>> {
        Ok(vec![Value::new(self)])
    }
}

macro_rules! tuple_results {
    ($($ty:ident),+) => {
        impl<$($ty: Any + Send + Sync),+> IntoResults for ($($ty,)+) {
            #[allow(non_snake_case)]
            fn into_results(self) -> anyhow::Result<Vec<Value>> {
                let ($($ty,)+) = self;
                Ok(vec![$(Value::new($ty)),+])
            }
        }
    };
}

tuple_results!(A);
tuple_results!(A, B);
tuple_results!(A, B, C);
tuple_results!(A, B, C, D);
tuple_results!(A, B, C, D, E);
tuple_results!(A, B, C, D, E, F);

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// A typed function that can be adapted into an [`Operation`].
///
/// `Marker` is the parameter tuple; it only exists to keep the per-arity
/// implementations from overlapping and is inferred at the call site.
pub trait Handler<Marker>: Send + Sync + 'static {
    /// Downcast `args`, call the function, and box its results.
    ///
    /// # Errors
    ///
    /// See [`Operation::invoke`].
    fn call_erased(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError>;
}

/// Takes the next argument out of `args` as an `A`.
fn take_arg<A: Any>(
    args: &mut std::vec::IntoIter<Value>,
    position: usize,
    expected: usize,
) -> Result<A, SignatureError> {
    let value = args.next().ok_or(SignatureError::Arity {
        expected,
        actual: position,
    })?;
    value.downcast::<A>().map_err(|value| SignatureError::Type {
        position,
        expected: any::type_name::<A>(),
        actual: value.type_name(),
    })
}

fn check_arity(args: &[Value], expected: usize) -> Result<(), SignatureError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(SignatureError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

macro_rules! impl_handler {
    ($count:expr; $($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Handler<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoResults,
            $($arg: Any + Send + Sync,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn call_erased(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
                check_arity(&args, $count)?;
                let mut iter = args.into_iter();
                let mut position = 0usize;
                $(
                    let $arg = take_arg::<$arg>(&mut iter, position, $count)?;
                    position += 1;
                )*
                Ok((self)($($arg),*).into_results()?)
            }
        }
    };
}

impl_handler!(0;);
impl_handler!(1; A1);
impl_handler!(2; A1, A2);
impl_handler!(3; A1, A2, A3);
impl_handler!(4; A1, A2, A3, A4);
impl_handler!(5; A1, A2, A3, A4, A5);
impl_handler!(6; A1, A2, A3, A4, A5, A6);
impl_handler!(7; A1, A2, A3, A4, A5, A6, A7);
impl_handler!(8; A1, A2, A3, A4, A5, A6, A7, A8);

/// A [`Handler`] boxed as an [`Operation`].
pub struct TypedOperation<H, Marker> {
    handler: H,
    _marker: PhantomData<fn() -> Marker>,
}

impl<H, Marker> TypedOperation<H, Marker>
where
    H: Handler<Marker>,
{
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<H, Marker> Operation for TypedOperation<H, Marker>
where
    H: Handler<Marker>,
{
    fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        self.handler.call_erased(args)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::values;

    fn op<H: Handler<M>, M>(handler: H) -> TypedOperation<H, M> {
        TypedOperation::new(handler)
    }

    #[test]
    fn two_argument_handler_adds() {
        let add = op(|a: i32, b: i32| a + b);
        let results = add.invoke(values![2_i32, 3_i32]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].downcast_ref::<i32>(), Some(&5));
    }

    #[test]
    fn unit_return_yields_no_results() {
        let noop = op(|| ());
        assert!(noop.invoke(values![]).unwrap().is_empty());
    }

    #[test]
    fn tuple_return_preserves_order() {
        let split = op(|s: String| (s.len(), s.to_uppercase()));
        let results = split.invoke(values!["abc".to_string()]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].downcast_ref::<usize>(), Some(&3));
        assert_eq!(results[1].downcast_ref::<String>().unwrap(), "ABC");
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let add = op(|a: i32, b: i32| a + b);
        let err = add.invoke(values![2_i32]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Signature(SignatureError::Arity { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn type_mismatch_names_position_and_types() {
        let add = op(|a: i32, b: i32| a + b);
        let err = add.invoke(values![2_i32, 3_i64]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Signature(SignatureError::Type {
                position: 1,
                expected: "i32",
                actual: "i64",
            })
        ));
    }

    #[test]
    fn err_return_becomes_failure() {
        let parse = op(|s: String| s.parse::<u32>());
        let ok = parse.invoke(values!["42".to_string()]).unwrap();
        assert_eq!(ok[0].downcast_ref::<u32>(), Some(&42));

        let err = parse.invoke(values!["nope".to_string()]).unwrap_err();
        assert!(matches!(err, InvokeError::Failed(_)));
    }

    #[test]
    fn raw_operation_sees_erased_arguments() {
        let count = RawOperation::new(|args: Vec<Value>| Ok(values![args.len()]));
        let results = count.invoke(values![1_u8, 'c', "s"]).unwrap();
        assert_eq!(results[0].downcast_ref::<usize>(), Some(&3));
    }

    #[test]
    fn eight_arguments_are_supported() {
        #[allow(clippy::many_single_char_names)]
        let sum = op(
            |a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8| {
                u32::from(a + b + c + d + e + f + g + h)
            },
        );
        let results = sum
            .invoke(values![1_u8, 2_u8, 3_u8, 4_u8, 5_u8, 6_u8, 7_u8, 8_u8])
            .unwrap();
        assert_eq!(results[0].downcast_ref::<u32>(), Some(&36));
    }

    proptest! {
        #[test]
        fn results_come_back_unchanged(x in any::<i64>(), y in ".*") {
            let pair = op(|x: i64, y: String| (x, y));
            let results = pair.invoke(values![x, y.clone()]).unwrap();
            prop_assert_eq!(results.len(), 2);
            prop_assert_eq!(results[0].downcast_ref::<i64>(), Some(&x));
            prop_assert_eq!(results[1].downcast_ref::<String>(), Some(&y));
        }
    }
}
