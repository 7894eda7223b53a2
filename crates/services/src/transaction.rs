//! Optimistic update with rollback.
//!
//! The recurring pattern for external-service mutations (bookmarks, tags):
//! apply the change locally first, attempt the remote commit, and restore the
//! pre-transaction snapshot if the commit fails.

/// Apply `mutate` to `target`, then await `commit`; on commit failure the
/// pre-mutation clone of `target` is restored and the error returned.
///
/// `commit` must be constructed before calling (it cannot observe the local
/// mutation), which keeps the remote request describing the intended state
/// rather than reading it back.
///
/// # Errors
///
/// Propagates the commit error after rolling back.
pub async fn with_rollback<T, E, Fut>(
    target: &mut T,
    mutate: impl FnOnce(&mut T),
    commit: Fut,
) -> Result<(), E>
where
    T: Clone,
    Fut: Future<Output = Result<(), E>>,
{
    let before = target.clone();
    mutate(target);
    match commit.await {
        Ok(()) => Ok(()),
        Err(err) => {
            *target = before;
            Err(err)
        }
    }
}
