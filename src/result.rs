//! The value-or-error type carried by every [`Promise`](crate::Promise),
//! plus helpers for working with batches of outcomes.
use crate::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error-free result.
pub fn ok<T>(value: T) -> Result<T> {
    Ok(value)
}

/// An error-bearing result.
pub fn err<T>(err: impl Into<Error>) -> Result<T> {
    Err(err.into())
}

/// Builds a result from a value and an optional error; the error wins.
pub fn from_parts<T>(value: T, err: Option<Error>) -> Result<T> {
    match err {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// Runs `f` and converts its error into [`Error`].
pub fn from_fn<T, E: Into<Error>>(f: impl FnOnce() -> std::result::Result<T, E>) -> Result<T> {
    f().map_err(Into::into)
}

/// Keeps the ok values in order and hands every error to `on_error`.
pub fn unwrap_all<T>(results: impl IntoIterator<Item = Result<T>>, mut on_error: impl FnMut(Error)) -> Vec<T> {
    let mut values = vec![];
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(err) => on_error(err),
        }
    }
    values
}

/// Splits outcomes into ok values and errors, each in input order.
pub fn fan_out<T>(results: impl IntoIterator<Item = Result<T>>) -> (Vec<T>, Vec<Error>) {
    let mut errors = vec![];
    let values = unwrap_all(results, |err| errors.push(err));
    (values, errors)
}

/// All values if every outcome is ok, otherwise the first error.
pub fn combine<T>(results: impl IntoIterator<Item = Result<T>>) -> Result<Vec<T>> {
    results.into_iter().collect()
}

/// Accessors mirroring a plain value/error pair.
pub trait ResultExt<T> {
    /// The value, or `T::default()` when this is an error.
    fn value(self) -> T
    where
        T: Default;

    fn error(&self) -> Option<&Error>;

    /// The value and error as a pair; the value is `T::default()` on error.
    fn get(self) -> (T, Option<Error>)
    where
        T: Default;

    fn or_fallback(self, fallback: T) -> T;

    /// Like [`or_fallback`](Self::or_fallback), computing the fallback only
    /// when needed.
    fn or_fallback_with<F: FnOnce() -> T>(self, fallback: F) -> T;

    /// The error text, empty when ok.
    fn message(&self) -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn value(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_default()
    }

    fn error(&self) -> Option<&Error> {
        self.as_ref().err()
    }

    fn get(self) -> (T, Option<Error>)
    where
        T: Default,
    {
        match self {
            Ok(value) => (value, None),
            Err(err) => (T::default(), Some(err)),
        }
    }

    fn or_fallback(self, fallback: T) -> T {
        self.unwrap_or(fallback)
    }

    fn or_fallback_with<F: FnOnce() -> T>(self, fallback: F) -> T {
        self.unwrap_or_else(|_| fallback())
    }

    fn message(&self) -> String {
        self.as_ref().err().map(ToString::to_string).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
use super::*;
use proptest::prelude::*;

#[test]
fn test_ok_and_err() {
    let good = ok(4);
    assert!(good.is_ok());
    assert!(good.error().is_none());
    assert_eq!(good.message(), "");
    assert_eq!(good.value(), 4);

    let bad = err::<i32>("bad");
    assert!(bad.is_err());
    assert_eq!(bad.message(), "bad");
    assert_eq!(bad.value(), 0);
}

#[test]
fn test_get() {
    let (value, error) = ok("x".to_owned()).get();
    assert_eq!(value, "x");
    assert!(error.is_none());

    let (value, error) = err::<String>("boom").get();
    assert_eq!(value, "");
    assert_eq!(error.map(|e| e.to_string()).as_deref(), Some("boom"));
}

#[test]
fn test_fallbacks() {
    assert_eq!(ok(1).or_fallback(9), 1);
    assert_eq!(err::<i32>("e").or_fallback(9), 9);
    assert_eq!(ok(1).or_fallback_with(|| unreachable!()), 1);
    assert_eq!(err::<i32>("e").or_fallback_with(|| 7), 7);
}

#[test]
fn test_from_parts() {
    assert_eq!(from_parts(1, None).unwrap(), 1);
    assert!(from_parts(1, Some(Error::Timeout)).unwrap_err().is_timeout());
}

#[test]
fn test_from_fn() {
    assert_eq!(from_fn(|| Ok::<_, Error>(2)).unwrap(), 2);
    let failed = from_fn(|| -> std::result::Result<(), _> { Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")) });
    assert!(matches!(failed, Err(Error::Source(_))));
    assert_eq!(failed.message(), "gone");
    assert!(from_fn(|| Err::<(), _>(Error::Timeout)).unwrap_err().is_timeout());
}

#[test]
fn test_unwrap_all_reports_errors() {
    let mut seen = vec![];
    let values = unwrap_all(vec![ok(1), err("a"), ok(3), err("b")], |e| seen.push(e.to_string()));
    assert_eq!(values, vec![1, 3]);
    assert_eq!(seen, vec!["a", "b"]);
}

#[test]
fn test_combine_stops_at_first_error() {
    assert_eq!(combine(vec![ok(1), ok(2)]).unwrap(), vec![1, 2]);
    let combined = combine(vec![ok(1), err("first"), err("second")]);
    assert_eq!(combined.unwrap_err().to_string(), "first");
}

fn outcome() -> impl Strategy<Value = Result<i32>> {
    prop_oneof![
        any::<i32>().prop_map(Ok::<i32, Error>),
        "[a-z]{1,8}".prop_map(|m: String| Err::<i32, Error>(Error::msg(m))),
    ]
}

proptest! {
    #[test]
    fn fan_out_partitions_outcomes(outcomes in prop::collection::vec(outcome(), 0..32)) {
        let expected_values: Vec<i32> = outcomes.iter().filter_map(|o| o.as_ref().ok().copied()).collect();
        let expected_errors: Vec<String> = outcomes.iter().filter_map(|o| o.as_ref().err().map(|e| e.to_string())).collect();

        let (values, errors) = fan_out(outcomes);
        prop_assert_eq!(values, expected_values);
        prop_assert_eq!(errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(), expected_errors);
    }

    #[test]
    fn combine_is_ok_iff_no_errors(outcomes in prop::collection::vec(outcome(), 0..32)) {
        let all_ok = outcomes.iter().all(|o| o.is_ok());
        let len = outcomes.len();
        match combine(outcomes) {
            Ok(values) => {
                prop_assert!(all_ok);
                prop_assert_eq!(values.len(), len);
            }
            Err(_) => prop_assert!(!all_ok),
        }
    }
}
}
