//! Tri-state of an asynchronously fetched value.

use crate::ports::errors::FetchError;

/// State of a remote fetch as seen by readers.
///
/// `Idle` (not started yet) and `Loading` are distinct for bookkeeping, but
/// every consumer must treat them the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remote<T> {
    Idle,
    Loading,
    Failed(FetchFailure),
    Ready(T),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Remote::Idle
    }
}

impl<T> Remote<T> {
    /// Not started or in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Remote::Idle | Remote::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Remote::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Remote::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Remote<U> {
        match self {
            Remote::Idle => Remote::Idle,
            Remote::Loading => Remote::Loading,
            Remote::Failed(failure) => Remote::Failed(failure),
            Remote::Ready(value) => Remote::Ready(f(value)),
        }
    }
}

/// Display-ready description of a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&FetchError> for FetchFailure {
    fn from(err: &FetchError) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_and_loading_are_both_pending() {
        assert!(Remote::<()>::Idle.is_pending());
        assert!(Remote::<()>::Loading.is_pending());
        assert!(!Remote::Ready(()).is_pending());
    }

    #[test]
    fn test_failure_from_fetch_error_keeps_message() {
        let failure = FetchFailure::from(&FetchError::Transport("connection reset".into()));
        assert!(failure.message.contains("connection reset"));
    }

    #[test]
    fn test_map_preserves_failure() {
        let remote: Remote<i32> = Remote::Failed(FetchFailure::new("boom"));
        assert_eq!(remote.map(|v| v + 1), Remote::Failed(FetchFailure::new("boom")));
    }
}
