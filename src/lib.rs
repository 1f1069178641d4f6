//! # addressable_pool
//!
//! Object pool for scene objects instantiated from asynchronously loaded
//! addressable prefabs.
//!
//! ## Features
//!
//! - Registry mapping each prefab identity to the pools serving it
//! - Lazily resolving pool handles, usable before any pool exists
//! - LIFO reuse with reparenting and activation toggling
//! - Capacity pre-warming that waits for the prefab load to finish
//! - Blocking and async object retrieval while the prefab is loading
//! - Tokio-backed asset loading with reference-counted release
//! - Metrics with Prometheus export
//!
//! Engines plug in through two traits: [`AssetProvider`] resolves and loads
//! prefabs, [`SceneGraph`] instantiates and moves objects. The [`memory`]
//! module implements both without an engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use addressable_pool::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
//! use addressable_pool::{PoolConfiguration, PoolRegistry};
//! use std::sync::Arc;
//!
//! let assets = Arc::new(MemoryAssets::new().with_auto_complete(true));
//! assets.insert("bullet", Prefab::new("Bullet"));
//! let registry = PoolRegistry::new(
//!     assets,
//!     Arc::new(MemoryScene::new()),
//!     PoolConfiguration::default(),
//! );
//!
//! let bullets = registry.get_pool_handle(&AssetRef::new("bullet")).unwrap();
//! bullets.ensure_capacity(10).unwrap();
//!
//! let bullet = bullets.get_object(None).unwrap();
//! bullets.return_object(bullet);
//! ```

mod asset;
mod config;
mod errors;
mod handle;
mod load;
mod loader;
mod member;
mod metrics;
mod pool;
mod registry;
mod scene;

pub mod memory;

pub use asset::AssetProvider;
pub use config::{DeferredCapacity, PoolConfiguration, DEFAULT_CONTAINER_NAME};
pub use errors::{LoadError, PoolError, PoolResult};
pub use handle::PoolHandle;
pub use load::{LoadCompleter, LoadHandle};
pub use loader::{AssetSource, TokioAssetLoader};
pub use member::PoolMember;
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{PoolState, PrefabPool};
pub use registry::PoolRegistry;
pub use scene::{ComponentLookup, SceneGraph};
