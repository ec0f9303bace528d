//! Observable state of a fetch pipeline.

use serde::Serialize;

/// Snapshot of a pipeline's state as seen by observers.
///
/// Invariant: a populated `error` implies `is_loading` is false, and the
/// snapshot always reflects exactly one request's outcome, never an
/// interleaving of two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    /// The last committed result, or the type's empty default.
    pub data: T,
    /// A request for the current key is in flight.
    pub is_loading: bool,
    /// User-facing message of the last committed failure.
    pub error: Option<String>,
}

impl<T: Default> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            is_loading: false,
            error: None,
        }
    }
}

impl<T: Default> FetchState<T> {
    /// State at request start: empty data, loading, no error.
    pub fn loading() -> Self {
        Self {
            data: T::default(),
            is_loading: true,
            error: None,
        }
    }

    /// Committed success.
    pub fn success(data: T) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }

    /// Committed failure with a user-facing message.
    pub fn failed(message: String) -> Self {
        Self {
            data: T::default(),
            is_loading: false,
            error: Some(message),
        }
    }
}
