use std::fmt::{self, Display};

use crate::error::WrongVariantError;
use crate::http::PageFailure;

/// Result of a fallible operation that never panics or throws across the API
/// boundary.
///
/// Exactly one of three variants is present:
///
/// * `Success` holds the payload.
/// * `FailureValue` holds a structured, expected negative result (for example
///   an HTTP status code). It is ordinary data, not an error object.
/// * `FailureException` holds the captured cause of an unexpected fault such
///   as an I/O error or a protocol violation.
///
/// The enum is closed: code matching on it has to name every variant, so a new
/// variant cannot be introduced without revisiting each match site.
///
/// ```rust
/// use rfetch::outcome::Outcome;
///
/// let outcome: Outcome<&str, u16, std::io::Error> = Outcome::failure_value(404);
///
/// match outcome {
///     Outcome::Success(page) => println!("{}", page),
///     Outcome::FailureValue(fv) => println!("{}", fv.value()),
///     Outcome::FailureException(fe) => println!("{}", fe.cause()),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, V = PageFailure, E = anyhow::Error> {
    Success(T),
    FailureValue(FailureValue<V>),
    FailureException(FailureException<E>),
}

/// Outcome produced by fetching a page: the body on success, a `PageFailure`
/// for reported failures and the transport fault otherwise.
pub type PageOutcome = Outcome<String, PageFailure, anyhow::Error>;

/// Payload of `Outcome::FailureValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FailureValue<V>(V);

impl<V> FailureValue<V> {
    pub fn new(value: V) -> Self {
        Self(value)
    }

    /// Structured failure indicator.
    pub fn value(&self) -> &V {
        &self.0
    }

    pub fn into_value(self) -> V {
        self.0
    }
}

/// Payload of `Outcome::FailureException`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureException<E>(E);

impl<E> FailureException<E> {
    pub fn new(cause: E) -> Self {
        Self(cause)
    }

    /// Captured fault.
    pub fn cause(&self) -> &E {
        &self.0
    }

    pub fn into_cause(self) -> E {
        self.0
    }
}

/// Failure half of an `Outcome`, returned by `Outcome::into_result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<V, E> {
    Value(V),
    Exception(E),
}

/// Names an `Outcome` variant without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Success,
    FailureValue,
    FailureException,
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Variant::Success => "Success",
            Variant::FailureValue => "FailureValue",
            Variant::FailureException => "FailureException",
        })
    }
}

impl<T, V, E> Outcome<T, V, E> {
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub fn failure_value(value: V) -> Self {
        Self::FailureValue(FailureValue::new(value))
    }

    pub fn failure_exception(cause: E) -> Self {
        Self::FailureException(FailureException::new(cause))
    }

    /// Returns true iff this is the `Success` variant. The payload is not
    /// inspected.
    pub fn eval(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure_value(&self) -> bool {
        matches!(self, Outcome::FailureValue(_))
    }

    pub fn is_failure_exception(&self) -> bool {
        matches!(self, Outcome::FailureException(_))
    }

    pub fn variant(&self) -> Variant {
        match self {
            Outcome::Success(_) => Variant::Success,
            Outcome::FailureValue(_) => Variant::FailureValue,
            Outcome::FailureException(_) => Variant::FailureException,
        }
    }

    /// Extracts the success payload.
    ///
    /// Calling it on a failure is not a panic: a `WrongVariantError` naming the
    /// variant that was actually found is returned instead, and the failure
    /// payload is dropped. Match on the outcome first to keep it.
    pub fn unwrap(self) -> Result<T, WrongVariantError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::FailureValue(_) => Err(WrongVariantError::new(Variant::FailureValue)),
            Outcome::FailureException(_) => {
                Err(WrongVariantError::new(Variant::FailureException))
            }
        }
    }

    pub fn success_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::FailureValue(_) | Outcome::FailureException(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&V> {
        match self {
            Outcome::FailureValue(fv) => Some(fv.value()),
            Outcome::Success(_) | Outcome::FailureException(_) => None,
        }
    }

    pub fn cause(&self) -> Option<&E> {
        match self {
            Outcome::FailureException(fe) => Some(fe.cause()),
            Outcome::Success(_) | Outcome::FailureValue(_) => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T, &V, &E> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::FailureValue(fv) => Outcome::failure_value(fv.value()),
            Outcome::FailureException(fe) => Outcome::failure_exception(fe.cause()),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U, V, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::FailureValue(fv) => Outcome::FailureValue(fv),
            Outcome::FailureException(fe) => Outcome::FailureException(fe),
        }
    }

    pub fn map_value<W, F>(self, f: F) -> Outcome<T, W, E>
    where
        F: FnOnce(V) -> W,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::FailureValue(fv) => Outcome::failure_value(f(fv.into_value())),
            Outcome::FailureException(fe) => Outcome::FailureException(fe),
        }
    }

    pub fn map_cause<G, F>(self, f: F) -> Outcome<T, V, G>
    where
        F: FnOnce(E) -> G,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::FailureValue(fv) => Outcome::FailureValue(fv),
            Outcome::FailureException(fe) => Outcome::failure_exception(f(fe.into_cause())),
        }
    }

    /// Chains another fallible step onto a success. Failures pass through
    /// untouched.
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, V, E>
    where
        F: FnOnce(T) -> Outcome<U, V, E>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::FailureValue(fv) => Outcome::FailureValue(fv),
            Outcome::FailureException(fe) => Outcome::FailureException(fe),
        }
    }

    pub fn into_result(self) -> Result<T, Failure<V, E>> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::FailureValue(fv) => Err(Failure::Value(fv.into_value())),
            Outcome::FailureException(fe) => Err(Failure::Exception(fe.into_cause())),
        }
    }
}

/// `Ok` becomes `Success` and `Err` is treated as a fault.
impl<T, V, E> From<Result<T, E>> for Outcome<T, V, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(cause) => Outcome::failure_exception(cause),
        }
    }
}
