// src/pipeline/pool.rs

use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::Result;

/// Run `work` over every item with at most `limit` futures in flight.
///
/// A permit is taken *before* each task is spawned, so no more than `limit`
/// tasks exist at once. Tasks never cancel each other: the call resolves
/// once every task has settled, with results in input order.
///
/// The only error is a worker panicking.
pub async fn run_bounded<T, R, F, Fut>(items: Vec<T>, limit: usize, work: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let work = Arc::new(work);
    let mut set = JoinSet::new();

    for (idx, item) in items.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| anyhow!("worker pool semaphore closed: {e}"))?;
        let work = Arc::clone(&work);
        set.spawn(async move {
            let out = work(item).await;
            drop(permit);
            (idx, out)
        });
    }

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (idx, out) = joined.map_err(|e| anyhow!("worker task failed: {e}"))?;
        slots[idx] = Some(out);
    }

    debug!(tasks = total, limit, "worker pool drained");
    Ok(slots.into_iter().flatten().collect())
}
