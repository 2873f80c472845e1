//! Bounded-concurrency fan-out (§4.3).
//!
//! A pure helper reused by both the Planner (dispatching to Explorer sub-agents) and
//! the Explorer (dispatching to Toolbelt calls): run N calls under a fixed concurrency
//! cap K, preserving input order in the result, and isolating per-call failures inside
//! the result rather than propagating them.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Runs `f(index, call)` for every `call` in `calls`, at most `cap` concurrently, and
/// returns results in the same order as the input (§4.3, §5 ordering guarantees).
///
/// `f` itself is responsible for turning any internal failure into an `R` value (e.g.
/// an `"Error: ..."` string) — this function never short-circuits on a single
/// call's outcome and never returns an error.
pub async fn dispatch<T, R, F, Fut>(calls: Vec<T>, cap: usize, f: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(usize, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let cap = cap.max(1);
    let semaphore = Arc::new(Semaphore::new(cap));
    let f = Arc::new(f);

    let handles: Vec<_> = calls
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let semaphore = Arc::clone(&semaphore);
            let f = Arc::clone(&f);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("dispatch semaphore is never closed");
                f(i, call).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(r) => results.push(r),
            Err(join_err) => {
                // A panicking worker must not silently vanish from the result slice;
                // the caller decides how to represent it, so we resume the panic only
                // if it wasn't a cancellation. A cancelled task cannot happen here
                // since we never abort these handles ourselves.
                std::panic::resume_unwind(join_err.into_panic());
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_order() {
        let calls: Vec<i32> = (0..20).collect();
        let results = dispatch(calls, 4, |i, call| async move {
            tokio::time::sleep(Duration::from_millis((20 - i) as u64 % 5)).await;
            call * 10
        })
        .await;
        let expected: Vec<i32> = (0..20).map(|i| i * 10).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn respects_concurrency_cap() {
        let inflight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));
        let calls: Vec<()> = std::iter::repeat(()).take(30).collect();

        let inflight_cloned = Arc::clone(&inflight);
        let max_cloned = Arc::clone(&max_observed);
        let results = dispatch(calls, 3, move |_i, _call| {
            let inflight = Arc::clone(&inflight_cloned);
            let max_observed = Arc::clone(&max_cloned);
            async move {
                let now = inflight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inflight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(results.len(), 30);
        assert!(max_observed.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn isolates_per_call_failures_as_values() {
        let calls = vec!["ok", "bad", "ok"];
        let results = dispatch(calls, 2, |_i, call| async move {
            if call == "bad" {
                "Error: simulated failure".to_string()
            } else {
                "fine".to_string()
            }
        })
        .await;
        assert_eq!(results, vec!["fine", "Error: simulated failure", "fine"]);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let results: Vec<i32> = dispatch(Vec::<i32>::new(), 4, |_i, call| async move { call }).await;
        assert!(results.is_empty());
    }
}
