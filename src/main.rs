use omcs_store::StorageStrategy;
use simulation::run_simulation;
pub mod simulation;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async_main());
}

async fn async_main() {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║            LARIMAR MIRROR SIMULATIONS                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // List strategy: positional replacement is cheap.
    let stats = run_simulation(StorageStrategy::List, 20, 500).await;
    stats.print("list strategy");

    // Queue strategy: same observable behavior over a FIFO container.
    let stats = run_simulation(StorageStrategy::Queue, 20, 500).await;
    stats.print("queue strategy");

    println!("\n✓ All simulations completed successfully!");
}
