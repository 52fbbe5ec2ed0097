//! Mirror simulation: a randomized fake remote source feeding a
//! ThreadSafeLoader through the poll driver.

use async_trait::async_trait;
use omcs_diff::{ChangeKind, ChangeRecord};
use omcs_loader::{
    Loader, PollConfigBuilder, PollDriver, ProviderError, SeedProvider, ThreadSafeLoader,
    UpdateProvider,
};
use omcs_store::StorageStrategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A mirrored market quote. Equality is identity by symbol; the price is the
/// mutable payload that updates carry.
#[derive(Clone, Debug)]
pub struct Quote {
    pub symbol: u64,
    pub price: u64,
}

impl PartialEq for Quote {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

/// Simulated remote source: serves a seeded dataset once, then random churn
/// (adds, price updates, removals) on every poll.
pub struct ChurnSource {
    rng: Mutex<StdRng>,
    next_symbol: AtomicU64,
    seed_size: usize,
}

impl ChurnSource {
    pub fn new(seed_size: usize) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            next_symbol: AtomicU64::new(0),
            seed_size,
        }
    }

    fn fresh_quote(&self, price: u64) -> Quote {
        Quote {
            symbol: self.next_symbol.fetch_add(1, Ordering::SeqCst),
            price,
        }
    }
}

#[async_trait]
impl SeedProvider<Quote> for ChurnSource {
    async fn fetch(&self, _cancel: CancellationToken) -> Result<Vec<Quote>, ProviderError> {
        let prices: Vec<u64> = {
            let mut rng = self.rng.lock().unwrap();
            (0..self.seed_size).map(|_| rng.gen_range(100..10_000)).collect()
        };
        Ok(prices.into_iter().map(|price| self.fresh_quote(price)).collect())
    }
}

#[async_trait]
impl UpdateProvider<Quote> for ChurnSource {
    async fn fetch_updates(
        &self,
        current: Vec<Quote>,
        _cancel: CancellationToken,
    ) -> Result<Vec<ChangeRecord<Quote>>, ProviderError> {
        let (mut records, new_prices) = {
            let mut rng = self.rng.lock().unwrap();
            let records: Vec<ChangeRecord<Quote>> = current
                .iter()
                .map(|quote| match rng.gen_range(0..10) {
                    0 => ChangeRecord::removed(quote.clone()),
                    1..=3 => ChangeRecord::updated(Quote {
                        symbol: quote.symbol,
                        price: rng.gen_range(100..10_000),
                    }),
                    _ => ChangeRecord::unchanged(quote.clone()),
                })
                .collect();
            let additions = rng.gen_range(0..3);
            let new_prices: Vec<u64> =
                (0..additions).map(|_| rng.gen_range(100..10_000)).collect();
            (records, new_prices)
        };
        for price in new_prices {
            records.push(ChangeRecord::added(self.fresh_quote(price)));
        }
        Ok(records)
    }
}

/// Counters collected while the simulation runs.
#[derive(Clone, Debug, Default)]
pub struct SimulationStats {
    pub batches: usize,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub final_len: usize,
}

impl SimulationStats {
    pub fn print(&self, label: &str) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║  Mirror Simulation: {:<39}║", label);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Notification batches:      {:>30} ║", self.batches);
        println!("║  Added records:             {:>30} ║", self.added);
        println!("║  Updated records:           {:>30} ║", self.updated);
        println!("║  Removed records:           {:>30} ║", self.removed);
        println!("║  Final mirror size:         {:>30} ║", self.final_len);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

/// Run one mirror simulation: initial load, then polled churn for
/// `duration_ms`, with a subscriber tallying every batch.
pub async fn run_simulation(
    strategy: StorageStrategy,
    seed_size: usize,
    duration_ms: u64,
) -> SimulationStats {
    let source = Arc::new(ChurnSource::new(seed_size));

    let loader = Arc::new(ThreadSafeLoader::new(
        Loader::builder()
            .strategy(strategy)
            .seed_provider(source.clone())
            .update_provider(source)
            .build(),
    ));

    let mut events = loader.subscribe();
    let consumer = tokio::spawn(async move {
        let mut stats = SimulationStats::default();
        while let Ok(batch) = events.recv().await {
            stats.batches += 1;
            for record in &batch {
                match record.kind {
                    ChangeKind::Added => stats.added += 1,
                    ChangeKind::Updated => stats.updated += 1,
                    ChangeKind::Removed => stats.removed += 1,
                    ChangeKind::Unchanged => {}
                }
            }
        }
        stats
    });

    let loaded = loader.load().await.expect("initial load");
    tracing::info!(items = loaded, "mirror seeded");

    let driver = PollDriver::spawn(
        loader.clone(),
        PollConfigBuilder::new().interval(25).immediate(true).build(),
    );

    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
    loader.cancel();
    driver.join().await;

    // Dropping the loader closes the broadcast channel and ends the consumer.
    let final_len = loader.len();
    drop(loader);
    let mut stats = consumer.await.expect("consumer task");
    stats.final_len = final_len;
    stats
}
