//! End-to-end load / refresh / notify cycles through the public API.

use async_trait::async_trait;
use omcs_loader::prelude::*;
use omcs_loader::ProviderError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct RemoteSeed(Vec<&'static str>);

#[async_trait]
impl SeedProvider<&'static str> for RemoteSeed {
    async fn fetch(
        &self,
        _cancel: CancellationToken,
    ) -> Result<Vec<&'static str>, ProviderError> {
        Ok(self.0.clone())
    }
}

struct ScriptedUpdates(Vec<ChangeRecord<&'static str>>);

#[async_trait]
impl UpdateProvider<&'static str> for ScriptedUpdates {
    async fn fetch_updates(
        &self,
        _current: Vec<&'static str>,
        _cancel: CancellationToken,
    ) -> Result<Vec<ChangeRecord<&'static str>>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Update provider that never resolves, for cancellation tests.
struct StalledUpdates;

#[async_trait]
impl UpdateProvider<&'static str> for StalledUpdates {
    async fn fetch_updates(
        &self,
        _current: Vec<&'static str>,
        cancel: CancellationToken,
    ) -> Result<Vec<ChangeRecord<&'static str>>, ProviderError> {
        cancel.cancelled().await;
        Err("stalled".into())
    }
}

#[tokio::test]
async fn fetch_cycle_applies_diff_and_notifies_once() {
    // Store starts [A, B, C]; the fetched diff removes B and adds D.
    let loader = ThreadSafeLoader::new(
        Loader::builder()
            .strategy(StorageStrategy::List)
            .initial_items(vec!["A", "B", "C"])
            .update_provider(Arc::new(ScriptedUpdates(vec![
                ChangeRecord::removed("B"),
                ChangeRecord::added("D"),
            ])))
            .build(),
    );
    let mut events = loader.subscribe();

    loader.refresh().await.unwrap();

    // D is appended; the rest keeps its order.
    assert_eq!(loader.items(), vec!["A", "C", "D"]);

    let batch = events.try_recv().unwrap();
    assert_eq!(
        batch,
        vec![ChangeRecord::removed("B"), ChangeRecord::added("D")]
    );
    assert!(events.try_recv().is_err(), "exactly one batch per cycle");
}

#[tokio::test]
async fn load_then_refresh_lifecycle() {
    let loader = ThreadSafeLoader::new(
        Loader::builder()
            .seed_provider(Arc::new(RemoteSeed(vec!["A", "B"])))
            .update_provider(Arc::new(ScriptedUpdates(vec![
                ChangeRecord::unchanged("A"),
                ChangeRecord::updated("B"),
            ])))
            .build(),
    );
    let mut events = loader.subscribe();

    assert_eq!(loader.state(), LoaderState::Uninitialized);
    assert_eq!(loader.load().await.unwrap(), 2);
    assert_eq!(loader.state(), LoaderState::Ready);

    let initial = events.try_recv().unwrap();
    assert!(initial.iter().all(|r| r.kind == ChangeKind::Added));

    let batch = loader.refresh().await.unwrap();
    assert_eq!(batch, vec![ChangeRecord::updated("B")]);
    assert_eq!(events.try_recv().unwrap(), batch);
    assert_eq!(loader.state(), LoaderState::Ready);
}

#[tokio::test]
async fn replace_all_notification_matches_set_difference() {
    let loader = ThreadSafeLoader::new(
        Loader::builder().initial_items(vec!["A", "B", "C"]).build(),
    );
    let mut events = loader.subscribe();

    loader.replace_all(vec!["B", "C", "D"]).unwrap();

    let batch = events.try_recv().unwrap();
    let of_kind = |kind: ChangeKind| -> Vec<&'static str> {
        batch
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.item)
            .collect()
    };

    assert_eq!(of_kind(ChangeKind::Added), vec!["D"]);
    assert_eq!(of_kind(ChangeKind::Removed), vec!["A"]);
    // Conservative updater: every matched pair is Updated, never Unchanged.
    assert_eq!(of_kind(ChangeKind::Updated), vec!["B", "C"]);
    assert_eq!(of_kind(ChangeKind::Unchanged), Vec::<&'static str>::new());
}

#[tokio::test]
async fn queue_strategy_replace_one_preserves_order() {
    let loader = ThreadSafeLoader::new(
        Loader::builder()
            .strategy(StorageStrategy::Queue)
            .initial_items(vec!["A", "B"])
            .build(),
    );

    loader.replace_one(&"B", "B2").unwrap();
    assert_eq!(loader.items(), vec!["A", "B2"]);
}

#[tokio::test]
async fn cancellation_aborts_in_flight_refresh() {
    let cancel = CancellationToken::new();
    let loader = Arc::new(ThreadSafeLoader::new(
        Loader::builder()
            .initial_items(vec!["A"])
            .update_provider(Arc::new(StalledUpdates))
            .cancellation(cancel.clone())
            .build(),
    ));
    let mut events = loader.subscribe();

    let refreshing = tokio::spawn({
        let loader = loader.clone();
        async move { loader.refresh().await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let result = refreshing.await.unwrap();
    assert!(matches!(result, Err(LoaderError::Cancelled)));
    assert_eq!(loader.state(), LoaderState::Cancelled);
    assert_eq!(loader.items(), vec!["A"], "committed state is not rolled back");
    assert!(events.try_recv().is_err(), "no notification after cancellation");

    // No further cycle starts once cancelled.
    assert!(matches!(loader.refresh().await, Err(LoaderError::Cancelled)));
}

#[tokio::test]
async fn poll_driver_runs_cycles_until_cancelled() {
    struct CountingUpdates(AtomicUsize);

    #[async_trait]
    impl UpdateProvider<usize> for CountingUpdates {
        async fn fetch_updates(
            &self,
            _current: Vec<usize>,
            _cancel: CancellationToken,
        ) -> Result<Vec<ChangeRecord<usize>>, ProviderError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ChangeRecord::added(n)])
        }
    }

    let loader = Arc::new(ThreadSafeLoader::new(
        Loader::builder()
            .initial_items(Vec::new())
            .update_provider(Arc::new(CountingUpdates(AtomicUsize::new(0))))
            .build(),
    ));
    let mut events = loader.subscribe();

    let driver = PollDriver::spawn(
        loader.clone(),
        PollConfig {
            interval_ms: 10,
            immediate: true,
        },
    );

    // Two appended batches, in lock-release order.
    let first = events.recv().await.unwrap();
    let second = events.recv().await.unwrap();
    assert_eq!(first, vec![ChangeRecord::added(0)]);
    assert_eq!(second, vec![ChangeRecord::added(1)]);

    loader.cancel();
    driver.join().await;

    let drained = loader.items();
    assert_eq!(drained[..2].to_vec(), vec![0, 1]);
}
