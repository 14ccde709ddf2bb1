//! Snapshot bookkeeping for optimistic writes.
//!
//! The sequence is: apply the projected value locally, remember what was
//! there before, call the backend, then either restore the snapshot (failure)
//! or replace it with what the server returned (success). The async part
//! lives with the cache that owns the value; this type only guarantees the
//! snapshot is consumed exactly once.

/// Pending optimistic change over a value of type `T`.
#[must_use = "an optimistic update must be committed or rolled back"]
#[derive(Debug)]
pub struct OptimisticUpdate<T> {
    previous: T,
}

impl<T> OptimisticUpdate<T> {
    /// Replace `current` with `projected` and keep the old value.
    pub fn apply(current: &mut T, projected: T) -> Self {
        let previous = std::mem::replace(current, projected);
        Self { previous }
    }

    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Restore the value held before `apply`.
    pub fn rollback(self, current: &mut T) {
        *current = self.previous;
    }

    /// Accept the server's version, discarding both snapshot and projection.
    pub fn commit(self, current: &mut T, server: T) {
        *current = server;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_rollback_restores_previous() {
        let mut value = Some("male");
        let update = OptimisticUpdate::apply(&mut value, Some("female"));

        assert_eq!(value, Some("female"));
        assert_eq!(update.previous(), &Some("male"));

        update.rollback(&mut value);
        assert_eq!(value, Some("male"));
    }

    #[test]
    fn test_commit_replaces_projection_with_server_value() {
        let mut value = vec![1];
        let update = OptimisticUpdate::apply(&mut value, vec![1, 2]);

        update.commit(&mut value, vec![1, 2, 3]);
        assert_eq!(value, vec![1, 2, 3]);
    }
}
