//! Client-side query cache cell.
//!
//! One cell per cached remote value (the current user's profile, the current
//! user's preferences). A cell exposes the tri-state [`Remote`] snapshot read
//! by the navigation guard, applies the global fixed retry count to fetches,
//! and hosts optimistic writes.
//!
//! Data already present stays `Ready` during a background refetch; only a
//! first load shows as `Loading`.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rv_core::optimistic::OptimisticUpdate;
use rv_core::ports::FetchError;
use rv_core::{FetchFailure, Remote};
use tracing::{debug, warn};

/// Cache behaviour shared by every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Extra attempts after a failed fetch.
    pub retry: u32,
    /// Age after which `Ready` data is refetched by `get_or_fetch`.
    pub stale_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retry: rv_core::config::DEFAULT_FETCH_RETRY,
            stale_time: Duration::from_secs(rv_core::config::DEFAULT_STALE_TIME_SECS),
        }
    }
}

struct CellState<T> {
    remote: Remote<T>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by `reset`; results of fetches started under an older
    /// generation are dropped.
    generation: u64,
}

pub struct QueryCell<T> {
    name: &'static str,
    options: QueryOptions,
    state: Mutex<CellState<T>>,
}

impl<T: Clone> QueryCell<T> {
    pub fn new(name: &'static str, options: QueryOptions) -> Self {
        Self {
            name,
            options,
            state: Mutex::new(CellState {
                remote: Remote::Idle,
                fetched_at: None,
                invalidated: false,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Remote<T> {
        self.lock().remote.clone()
    }

    /// `Ready`, not invalidated and younger than the stale time.
    pub fn is_fresh(&self) -> bool {
        let state = self.lock();
        matches!(state.remote, Remote::Ready(_))
            && !state.invalidated
            && state
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.options.stale_time)
    }

    /// Run `loader` with the configured retry count and store the outcome.
    pub async fn fetch<F, Fut>(&self, loader: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let generation = {
            let mut state = self.lock();
            if !matches!(state.remote, Remote::Ready(_)) {
                state.remote = Remote::Loading;
            }
            state.generation
        };

        let mut attempt = 0;
        let result = loop {
            match loader().await {
                Ok(value) => break Ok(value),
                Err(err) if attempt < self.options.retry => {
                    attempt += 1;
                    warn!(query = self.name, attempt, error = %err, "fetch failed, retrying");
                }
                Err(err) => break Err(err),
            }
        };

        let mut state = self.lock();
        if state.generation != generation {
            debug!(query = self.name, "dropping result of superseded fetch");
            return result;
        }
        match &result {
            Ok(value) => {
                state.remote = Remote::Ready(value.clone());
                state.fetched_at = Some(Instant::now());
                state.invalidated = false;
            }
            Err(err) => {
                warn!(query = self.name, error = %err, "fetch failed");
                state.remote = Remote::Failed(FetchFailure::from(err));
            }
        }
        result
    }

    /// Cached value when fresh, otherwise a fetch.
    pub async fn get_or_fetch<F, Fut>(&self, loader: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if self.is_fresh() {
            if let Remote::Ready(value) = self.snapshot() {
                return Ok(value);
            }
        }
        self.fetch(loader).await
    }

    /// Replace the cached value with server truth.
    pub fn set_data(&self, value: T) {
        let mut state = self.lock();
        state.remote = Remote::Ready(value);
        state.fetched_at = Some(Instant::now());
        state.invalidated = false;
    }

    /// Mark the value stale; the next `get_or_fetch` goes to the backend.
    pub fn invalidate(&self) {
        self.lock().invalidated = true;
    }

    /// Forget everything and drop in-flight results.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.remote = Remote::Idle;
        state.fetched_at = None;
        state.invalidated = false;
        state.generation += 1;
    }

    /// Optimistic write.
    ///
    /// When data is cached, `project` computes the local value shown while
    /// `remote` runs. A failure restores the previous value; a success
    /// replaces it with the server's answer. Without cached data the cell
    /// is only updated on success.
    pub async fn mutate_optimistic<E, Fut>(
        &self,
        project: impl FnOnce(&T) -> T,
        remote: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let (pending, generation) = {
            let mut state = self.lock();
            let projected = match &state.remote {
                Remote::Ready(current) => Some(project(current)),
                _ => None,
            };
            let pending = projected
                .map(|value| OptimisticUpdate::apply(&mut state.remote, Remote::Ready(value)));
            (pending, state.generation)
        };

        let result = remote.await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(query = self.name, "dropping result of superseded mutation");
            return result;
        }
        match (&result, pending) {
            (Ok(server), Some(update)) => {
                update.commit(&mut state.remote, Remote::Ready(server.clone()));
                state.fetched_at = Some(Instant::now());
                state.invalidated = false;
            }
            (Ok(server), None) => {
                state.remote = Remote::Ready(server.clone());
                state.fetched_at = Some(Instant::now());
                state.invalidated = false;
            }
            (Err(_), Some(update)) => {
                debug!(query = self.name, "rolling back optimistic update");
                update.rollback(&mut state.remote);
            }
            (Err(_), None) => {}
        }
        result
    }
}
