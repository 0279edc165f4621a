//! Bounded fan-out over independent fallible operations.
//!
//! Batch uploads and batch deletes share one shape: apply an async operation
//! to each of N independent items, isolate failures, bound the number of
//! in-flight requests, and collect a per-item outcome. One item's failure
//! never aborts its siblings; failures are logged and carried in the returned
//! [`BatchOutcome`] list. Completion order is unspecified.

use futures::stream::{self, StreamExt};

use crate::error::Result;

/// Default cap on in-flight operations for batch calls.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Outcome of one item in a batch operation.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// Caller-supplied label identifying the item (file name, record id, ...).
    pub label: String,
    /// The item's own result; errors here were already logged.
    pub result: Result<T>,
}

impl<T> BatchOutcome<T> {
    /// Whether this item succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Count the successes in a batch result.
pub fn succeeded<T>(outcomes: &[BatchOutcome<T>]) -> usize {
    outcomes.iter().filter(|o| o.is_ok()).count()
}

/// Count the failures in a batch result.
pub fn failed<T>(outcomes: &[BatchOutcome<T>]) -> usize {
    outcomes.len() - succeeded(outcomes)
}

/// Run `op` over every labelled item with at most `concurrency` in flight.
///
/// Items are pulled lazily, so no request starts until a slot is free. A
/// `concurrency` of zero is treated as one. Outcomes are collected in
/// completion order, which is unspecified.
pub async fn for_each_bounded<I, It, T, F, Fut>(
    items: I,
    concurrency: usize,
    op: F,
) -> Vec<BatchOutcome<T>>
where
    I: IntoIterator<Item = (String, It)>,
    F: Fn(It) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let concurrency = concurrency.max(1);
    stream::iter(items.into_iter().map(|(label, item)| {
        let fut = op(item);
        async move {
            let result = fut.await;
            if let Err(e) = &result {
                log::warn!("batch item '{label}' failed: {e}");
            }
            BatchOutcome { label, result }
        }
    }))
    .buffer_unordered(concurrency)
    .collect()
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::BrocadeError;

    #[tokio::test]
    async fn test_one_failure_does_not_abort_siblings() {
        let items = (0..5).map(|i| (format!("item-{i}"), i));
        let outcomes = for_each_bounded(items, 2, |i| async move {
            if i == 3 {
                Err(BrocadeError::invalid_operation("engineered failure"))
            } else {
                Ok(i * 10)
            }
        })
        .await;

        assert_eq!(outcomes.len(), 5);
        assert_eq!(succeeded(&outcomes), 4);
        assert_eq!(failed(&outcomes), 1);

        let failure = outcomes.iter().find(|o| !o.is_ok()).unwrap();
        assert_eq!(failure.label, "item-3");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let items = (0..20).map(|i| (i.to_string(), ()));
        let cap = 4;
        let outcomes = for_each_bounded(items, cap, |()| {
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert_eq!(outcomes.len(), 20);
        assert!(high_water.load(Ordering::SeqCst) <= cap);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_treated_as_one() {
        let items = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let outcomes = for_each_bounded(items, 0, |i| async move { Ok(i) }).await;
        assert_eq!(succeeded(&outcomes), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_yields_no_outcomes() {
        let items: Vec<(String, ())> = Vec::new();
        let outcomes = for_each_bounded(items, 8, |()| async move { Ok(()) }).await;
        assert!(outcomes.is_empty());
    }
}
