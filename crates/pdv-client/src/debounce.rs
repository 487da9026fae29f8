//! # Debouncer
//!
//! Delays work until input has been quiet for a while.
//!
//! ```text
//! keystroke  a      r      r           o                 z
//! generation 1      2      3           4                 5
//!            │      │      │           │                 │
//!            └─sleep┴─sleep┴──sleep────┴──sleep──────────┴──sleep──► lookup("arroz")
//!              (gen 1..4 wake up to a newer generation and do nothing)
//! ```
//!
//! The generation counter is the only state shared across tasks.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts a new generation, superseding every earlier one.
    pub fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Supersedes anything currently waiting.
    pub fn cancel(&self) {
        self.bump();
    }

    /// Sleeps for the delay, then runs `work` if `generation` is still the
    /// latest. Returns `None` when superseded.
    pub async fn run_after<F, Fut, T>(&self, generation: u64, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        tokio::time::sleep(self.delay).await;

        if !self.is_latest(generation) {
            trace!(generation, "Debounced work superseded");
            return None;
        }

        Some(work().await)
    }

    /// [`Debouncer::bump`] followed by [`Debouncer::run_after`].
    pub async fn run<F, Fut, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.bump();
        self.run_after(generation, work).await
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(Duration::from_millis(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for term in ["a", "ar", "arr"] {
            let debouncer = debouncer.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                debouncer
                    .run(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        term
                    })
                    .await
            }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results, vec![None, None, Some("arr")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_input_runs_each_time() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        assert_eq!(debouncer.run(|| async { 1 }).await, Some(1));
        assert_eq!(debouncer.run(|| async { 2 }).await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_supersedes_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let generation = debouncer.bump();

        let waiting = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.run_after(generation, || async { "late" }).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.cancel();

        assert_eq!(waiting.await.unwrap(), None);
    }
}
