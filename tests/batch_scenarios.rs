use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use brocade::batch::{self, BatchOutcome};
use brocade::error::BrocadeError;

#[tokio::test]
async fn batch_isolates_one_engineered_failure() {
    let items = (0..10).map(|i| (format!("img-{i:02}.jpeg"), i));

    let outcomes: Vec<BatchOutcome<u64>> = batch::for_each_bounded(items, 4, |i| async move {
        if i == 7 {
            Err(BrocadeError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "unreadable file",
            )))
        } else {
            Ok(i * 100)
        }
    })
    .await;

    assert_eq!(outcomes.len(), 10);
    assert_eq!(batch::succeeded(&outcomes), 9);
    assert_eq!(batch::failed(&outcomes), 1);

    let failure = outcomes.iter().find(|o| !o.is_ok()).unwrap();
    assert_eq!(failure.label, "img-07.jpeg");

    // The engineered failure did not swallow any sibling's value.
    let mut values: Vec<u64> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().copied())
        .collect();
    values.sort_unstable();
    let expected: Vec<u64> = (0..10).filter(|i| *i != 7).map(|i| i * 100).collect();
    assert_eq!(values, expected);
}

#[tokio::test]
async fn batch_never_exceeds_its_capacity() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let high_water = Arc::new(AtomicUsize::new(0));
    let cap = 3;

    let items = (0..30).map(|i| (i.to_string(), ()));
    let outcomes = batch::for_each_bounded(items, cap, |()| {
        let in_flight = Arc::clone(&in_flight);
        let high_water = Arc::clone(&high_water);
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            high_water.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .await;

    assert_eq!(outcomes.len(), 30);
    assert_eq!(batch::failed(&outcomes), 0);
    assert!(high_water.load(Ordering::SeqCst) <= cap);
}

#[tokio::test]
async fn all_failures_still_report_every_item() {
    let items = (0..4).map(|i| (format!("item-{i}"), ()));
    let outcomes: Vec<BatchOutcome<()>> = batch::for_each_bounded(items, 2, |()| async move {
        Err(BrocadeError::invalid_operation("server rejected it"))
    })
    .await;

    assert_eq!(outcomes.len(), 4);
    assert_eq!(batch::succeeded(&outcomes), 0);
    for outcome in &outcomes {
        assert!(outcome.result.is_err());
    }
}
