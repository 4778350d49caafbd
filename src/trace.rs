//! Call tracing for wrapped functions.
//!
//! [`traced`] wraps a callable so that every call prints an arguments line
//! before invocation and a result line after it; a panicking call prints an
//! exception line instead and the panic continues unwinding. The wrapped
//! call's return value is passed through untouched. When output is disabled
//! the prints are skipped but the callable still runs.
//!
//! Arguments are passed as a tuple (`()` for zero arguments, `(a,)` for
//! one) so a single `call` method covers every supported arity.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use crate::state;

/// A callable invokable with its arguments packed in a tuple.
pub trait TupleFn<Args> {
    type Output;

    fn apply(&self, args: Args) -> Self::Output;
}

macro_rules! impl_tuple_fn {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Out, $($ty),*> TupleFn<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Out,
        {
            type Output = Out;

            fn apply(&self, ($($arg,)*): ($($ty,)*)) -> Out {
                (self)($($arg),*)
            }
        }
    };
}

impl_tuple_fn!();
impl_tuple_fn!(A a);
impl_tuple_fn!(A a, B b);
impl_tuple_fn!(A a, B b, C c);
impl_tuple_fn!(A a, B b, C c, D d);

/// A callable wrapped with call-in/result-out tracing.
pub struct Traced<F> {
    name: &'static str,
    func: F,
    enabled: Option<bool>,
}

/// Wraps `func` under `name` for tracing.
///
/// # Examples
///
/// ```rust
/// let double = peek::traced("double", |n: i32| n * 2);
/// assert_eq!(double.call((21,)), 42);
/// ```
pub fn traced<F>(name: &'static str, func: F) -> Traced<F> {
    Traced {
        name,
        func,
        enabled: None,
    }
}

impl<F> Traced<F> {
    /// Forces this wrapper on or off, overriding the ambient state.
    pub fn enabled(mut self, on: bool) -> Self {
        self.enabled = Some(on);
        self
    }

    /// Invokes the wrapped callable with `args`, tracing the call.
    ///
    /// The result line is printed on normal return. When the callable
    /// panics, an exception line is printed instead and the panic resumes
    /// unwinding with its original payload.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: TupleFn<Args>,
        Args: fmt::Debug,
        F::Output: fmt::Debug,
    {
        let on = self.enabled.unwrap_or_else(|| state::current().enabled);
        if !on {
            return self.func.apply(args);
        }

        state::with_sink(|sink| {
            sink.emit(&format!("{} called with args: {:?}", self.name, args))
        });
        match catch_unwind(AssertUnwindSafe(|| self.func.apply(args))) {
            Ok(result) => {
                state::with_sink(|sink| {
                    sink.emit(&format!("{}, result: {:?}", self.name, result))
                });
                result
            }
            Err(payload) => {
                state::with_sink(|sink| {
                    sink.emit(&format!(
                        "{}, exception: {}",
                        self.name,
                        panic_message(&*payload)
                    ))
                });
                resume_unwind(payload)
            }
        }
    }
}

/// Best-effort text of a panic payload; `panic!` produces one of the two
/// string types, anything else is opaque.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}
