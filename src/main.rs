// addressable_pool demo
// Runs the prefab pool against the in-memory scene and asset catalog.
// Log level is taken from the first argument: trace, debug, info, warn, error.

use addressable_pool::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
use addressable_pool::{PoolConfiguration, PoolRegistry, SceneGraph};
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match std::env::args().nth(1).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("addressable_pool v{}", env!("CARGO_PKG_VERSION"));

    let assets = Arc::new(MemoryAssets::new());
    assets.insert("enemy", Prefab::new("Enemy"));
    let scene = Arc::new(MemoryScene::new());
    let registry = PoolRegistry::new(
        Arc::clone(&assets),
        Arc::clone(&scene),
        PoolConfiguration::default(),
    );

    let enemies = registry.get_pool_handle(&AssetRef::new("enemy"))?;
    enemies.ensure_capacity(3)?;
    info!("Pooled before load completes: {}", enemies.resolve()?.count());

    assets.complete_pending();
    info!("Pooled after load completes: {}", enemies.resolve()?.count());

    let level = scene.create_node("Level");
    let spawned = (0..3)
        .map(|_| enemies.get_object(Some(&level)))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Spawned {:?}, pooled: {}", spawned, enemies.resolve()?.count());

    for obj in spawned.into_iter().rev() {
        enemies.return_object(obj);
    }

    let reused = enemies.get_object(Some(&level))?;
    info!("Reused {:?}", reused);

    let pool = enemies.resolve()?;
    print!("{}", pool.export_metrics_prometheus("enemies", None));

    registry.teardown();
    info!("Released {} load(s)", assets.release_count());
    Ok(())
}
