//! Prefab pool implementation

use crate::asset::AssetProvider;
use crate::config::{DeferredCapacity, PoolConfiguration};
use crate::errors::{PoolError, PoolResult};
use crate::load::LoadHandle;
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};
use crate::scene::{ComponentLookup, SceneGraph};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Pools registered under one prefab identity, primary first.
pub(crate) type PoolSlot<A, S> = RwLock<Vec<Arc<PrefabPool<A, S>>>>;
pub(crate) type PoolList<A, S> = Arc<PoolSlot<A, S>>;

type TopUpFn<T> = Arc<dyn Fn(&T, usize) + Send + Sync>;

/// Load state of a pool's prefab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// No load is associated with the pool (it was destroyed)
    Uninitialized,

    /// The prefab is still loading
    Loading,

    /// The prefab is loaded and objects can be instantiated immediately
    Ready,

    /// The prefab load failed
    Failed,
}

/// Pool of deactivated scene objects instantiated from a single prefab.
///
/// Pools are created through a [`PoolRegistry`](crate::PoolRegistry), either
/// explicitly or lazily by a [`PoolHandle`](crate::PoolHandle). The free list
/// is LIFO: the most recently returned object is the next one handed out.
pub struct PrefabPool<A: AssetProvider, S: SceneGraph> {
    reference: A::Reference,
    key: A::Key,
    assets: Arc<A>,
    scene: Arc<S>,
    container: S::Node,
    config: PoolConfiguration,
    free: Arc<Mutex<Vec<S::Object>>>,
    handle: Mutex<LoadHandle<A::Asset>>,
    pending_capacity: Arc<Mutex<Option<usize>>>,
    destroyed: Arc<AtomicBool>,
    metrics: Arc<MetricsTracker>,
    pools: Weak<PoolSlot<A, S>>,
}

impl<A, S> PrefabPool<A, S>
where
    A: AssetProvider,
    S: SceneGraph<Template = A::Asset>,
{
    /// Create the container node and start loading the prefab.
    ///
    /// The caller registers the pool in `pools`.
    pub(crate) fn initialize(
        assets: Arc<A>,
        scene: Arc<S>,
        reference: A::Reference,
        key: A::Key,
        config: PoolConfiguration,
        pools: Weak<PoolSlot<A, S>>,
    ) -> Self {
        let container = scene.create_node(&config.container_name);
        if config.persist_across_scenes {
            scene.persist_across_scenes(&container);
        }

        let handle = assets.load_asset_async(&reference);
        info!("Created prefab pool for {:?} (loaded: {})", key, handle.is_done());

        Self {
            reference,
            key,
            assets,
            scene,
            container,
            config,
            free: Arc::new(Mutex::new(Vec::new())),
            handle: Mutex::new(handle),
            pending_capacity: Arc::new(Mutex::new(None)),
            destroyed: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(MetricsTracker::new()),
            pools,
        }
    }

    /// Pre-instantiate the configured initial capacity
    pub(crate) fn warm_up(&self) {
        let capacity = self.config.initial_capacity;
        if capacity == 0 {
            return;
        }

        if let Err(e) = self.ensure_capacity(capacity) {
            warn!("Could not warm up pool for {:?}: {}", self.key, e);
        }
    }

    /// Guarantee at least `capacity` pooled objects.
    ///
    /// If the prefab is still loading, the top-up happens when the load
    /// completes. See [`DeferredCapacity`] for how repeated requests made
    /// while loading are combined.
    pub fn ensure_capacity(&self, capacity: usize) -> PoolResult<()> {
        let handle = self.load_handle()?;

        match handle.result() {
            Some(Ok(template)) => {
                self.top_up(&template, capacity);
                Ok(())
            }
            Some(Err(e)) => Err(e.into()),
            None => {
                self.defer_capacity(&handle, capacity);
                Ok(())
            }
        }
    }

    fn defer_capacity(&self, handle: &LoadHandle<A::Asset>, capacity: usize) {
        let key = self.key.clone();
        let top_up = self.make_top_up_fn();

        match self.config.deferred_capacity {
            DeferredCapacity::PerRequest => {
                self.metrics.record_deferred();
                handle.on_completed(move |result| match result {
                    Ok(template) => top_up(template, capacity),
                    Err(e) => warn!("Deferred top-up for {:?} skipped: {}", key, e),
                });
            }
            DeferredCapacity::TopUpToMax => {
                let schedule = {
                    let mut pending = self.pending_capacity.lock();
                    let first = pending.is_none();
                    *pending = Some(pending.map_or(capacity, |c| c.max(capacity)));
                    first
                };

                if !schedule {
                    return;
                }

                self.metrics.record_deferred();
                let pending = Arc::clone(&self.pending_capacity);
                handle.on_completed(move |result| {
                    let Some(capacity) = pending.lock().take() else {
                        return;
                    };
                    match result {
                        Ok(template) => top_up(template, capacity),
                        Err(e) => warn!("Deferred top-up for {:?} skipped: {}", key, e),
                    }
                });
            }
        }

        debug!("Deferred top-up to {} for {:?} until load completes", capacity, self.key);
    }

    fn top_up(&self, template: &A::Asset, capacity: usize) {
        (self.make_top_up_fn())(template, capacity);
    }

    fn make_top_up_fn(&self) -> TopUpFn<A::Asset> {
        let scene = Arc::clone(&self.scene);
        let free = Arc::clone(&self.free);
        let metrics = Arc::clone(&self.metrics);
        let destroyed = Arc::clone(&self.destroyed);
        let container = self.container.clone();

        Arc::new(move |template: &A::Asset, capacity: usize| {
            let mut free = free.lock();
            if destroyed.load(Ordering::Acquire) {
                return;
            }

            while free.len() < capacity {
                let obj = scene.instantiate(template, Some(&container));
                scene.set_active(&obj, false);
                free.push(obj);
                metrics.record_instantiated(false);
            }
        })
    }

    /// Get an object parented under `parent`.
    ///
    /// Reuses the most recently returned object if there is one. Otherwise
    /// instantiates a new object, blocking until the prefab has loaded.
    pub fn get_object(&self, parent: Option<&S::Node>) -> PoolResult<S::Object> {
        if let Some(obj) = self.take_pooled(parent)? {
            return Ok(obj);
        }

        let handle = self.load_handle()?;
        let template = match handle.result() {
            Some(result) => result?,
            None => {
                debug!("Waiting for prefab {:?} to finish loading", self.key);
                handle.wait_for_completion()?
            }
        };

        Ok(self.instantiate(&template, parent))
    }

    /// Get an object and look up its `C` component
    pub fn get_object_as<C>(&self, parent: Option<&S::Node>) -> PoolResult<Option<C>>
    where
        S: ComponentLookup<C>,
    {
        let obj = self.get_object(parent)?;
        Ok(self.scene.component(&obj))
    }

    /// Get an object, awaiting the prefab load instead of blocking.
    ///
    /// The wait is bounded by the configured operation timeout.
    pub async fn get_object_async(&self, parent: Option<&S::Node>) -> PoolResult<S::Object> {
        if let Some(obj) = self.take_pooled(parent)? {
            return Ok(obj);
        }

        let handle = self.load_handle()?;
        let template = match self.config.operation_timeout {
            Some(timeout) => tokio::time::timeout(timeout, handle.completion())
                .await
                .map_err(|_| PoolError::Timeout(timeout))??,
            None => handle.completion().await?,
        };

        Ok(self.instantiate(&template, parent))
    }

    fn take_pooled(&self, parent: Option<&S::Node>) -> PoolResult<Option<S::Object>> {
        self.check_alive()?;

        let Some(obj) = self.free.lock().pop() else {
            return Ok(None);
        };

        self.scene.set_parent(&obj, parent);
        self.scene.set_active(&obj, true);
        self.metrics.record_retrieved();
        Ok(Some(obj))
    }

    fn instantiate(&self, template: &A::Asset, parent: Option<&S::Node>) -> S::Object {
        let obj = self.scene.instantiate(template, parent);
        self.scene.set_active(&obj, true);
        self.metrics.record_instantiated(true);
        obj
    }

    /// Deactivate `obj` and push it onto the free list.
    ///
    /// The object is not checked against the pool it came from. Objects
    /// returned to a destroyed or full pool are destroyed.
    pub fn return_object(&self, obj: S::Object) {
        let mut free = self.free.lock();
        let reason = if self.is_destroyed() {
            "destroyed"
        } else if self.config.max_pool_size.is_some_and(|max| free.len() >= max) {
            "full"
        } else {
            self.scene.set_active(&obj, false);
            self.scene.set_parent(&obj, Some(&self.container));
            free.push(obj);
            drop(free);
            self.metrics.record_returned();
            return;
        };
        drop(free);

        debug!("Pool for {:?} is {}, destroying returned object", self.key, reason);
        self.discard(&obj);
    }

    fn discard(&self, obj: &S::Object) {
        self.scene.destroy(obj);
        self.metrics.record_destroyed(1);
    }

    /// Destroy every pooled object. Checked out objects are unaffected.
    pub fn clear(&self) {
        let objects = std::mem::take(&mut *self.free.lock());
        for obj in &objects {
            self.scene.destroy(obj);
        }
        self.metrics.record_destroyed(objects.len());
    }

    /// Unregister the pool, destroy its pooled objects and container, and
    /// release the prefab load. Does nothing if already destroyed.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.unregister();
        self.clear();
        self.scene.destroy_node(&self.container);
        self.release_handle();
        info!("Destroyed prefab pool for {:?}", self.key);
    }

    fn unregister(&self) {
        if let Some(pools) = self.pools.upgrade() {
            pools.write().retain(|pool| !std::ptr::eq(Arc::as_ptr(pool), self));
        }
    }
}

impl<A: AssetProvider, S: SceneGraph> PrefabPool<A, S> {
    /// Number of pooled objects
    pub fn count(&self) -> usize {
        self.free.lock().len()
    }

    pub fn key(&self) -> &A::Key {
        &self.key
    }

    pub fn reference(&self) -> &A::Reference {
        &self.reference
    }

    /// Node pooled objects are parented under
    pub fn container(&self) -> &S::Node {
        &self.container
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> PoolState {
        let handle = self.handle.lock();
        if !handle.is_valid() {
            return PoolState::Uninitialized;
        }

        match handle.result() {
            None => PoolState::Loading,
            Some(Ok(_)) => PoolState::Ready,
            Some(Err(_)) => PoolState::Failed,
        }
    }

    /// Whether the pool's free list holds `obj`
    pub fn contains(&self, obj: &S::Object) -> bool {
        self.free.lock().contains(obj)
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        self.metrics.get_metrics(self.count())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }

    fn check_alive(&self) -> PoolResult<()> {
        if self.is_destroyed() {
            return Err(PoolError::PoolDestroyed);
        }
        Ok(())
    }

    fn load_handle(&self) -> PoolResult<LoadHandle<A::Asset>> {
        self.check_alive()?;
        let handle = self.handle.lock().clone();
        if !handle.is_valid() {
            return Err(PoolError::PoolDestroyed);
        }
        Ok(handle)
    }

    fn release_handle(&self) {
        let handle = std::mem::take(&mut *self.handle.lock());
        if handle.is_valid() {
            self.assets.release(&self.reference, handle);
        }
    }
}

impl<A: AssetProvider, S: SceneGraph> Drop for PrefabPool<A, S> {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            self.release_handle();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{DeferredCapacity, PoolConfiguration};
    use crate::errors::{LoadError, PoolError};
    use crate::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
    use crate::pool::PoolState;
    use crate::registry::PoolRegistry;
    use crate::scene::SceneGraph;

    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    type Fixture = (Arc<MemoryAssets>, Arc<MemoryScene>, PoolRegistry<MemoryAssets, MemoryScene>);

    fn setup(auto_complete: bool) -> Fixture {
        setup_with(auto_complete, PoolConfiguration::default())
    }

    fn setup_with(auto_complete: bool, config: PoolConfiguration) -> Fixture {
        let assets = Arc::new(MemoryAssets::new().with_auto_complete(auto_complete));
        assets.insert("bullet", Prefab::new("Bullet").with_component(25u32));
        let scene = Arc::new(MemoryScene::new());
        let registry = PoolRegistry::new(Arc::clone(&assets), Arc::clone(&scene), config);
        (assets, scene, registry)
    }

    #[test]
    fn test_ensure_capacity_on_ready_pool() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        assert_eq!(pool.state(), PoolState::Ready);

        pool.ensure_capacity(4).unwrap();
        assert_eq!(pool.count(), 4);
        assert_eq!(scene.instantiated_count(), 4);

        pool.ensure_capacity(2).unwrap();
        assert_eq!(pool.count(), 4);
        assert_eq!(scene.instantiated_count(), 4);

        pool.ensure_capacity(6).unwrap();
        assert_eq!(pool.count(), 6);
        assert_eq!(scene.instantiated_count(), 6);
    }

    #[test]
    fn test_pooled_objects_are_inactive_under_container() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        pool.ensure_capacity(3).unwrap();

        for obj in scene.children(pool.container()) {
            assert!(pool.contains(&obj));
            assert!(!scene.is_active(&obj));
        }
        assert_eq!(scene.children(pool.container()).len(), 3);
    }

    #[test]
    fn test_deferred_capacity_waits_for_load() {
        let (assets, _scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        assert_eq!(pool.state(), PoolState::Loading);

        pool.ensure_capacity(3).unwrap();
        assert_eq!(pool.count(), 0);

        assert_eq!(assets.complete_pending(), 1);
        assert_eq!(pool.state(), PoolState::Ready);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn test_top_up_to_max_coalesces_requests() {
        let (assets, _scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        pool.ensure_capacity(2).unwrap();
        pool.ensure_capacity(5).unwrap();
        pool.ensure_capacity(3).unwrap();
        assets.complete_pending();

        assert_eq!(pool.count(), 5);
        assert_eq!(pool.get_metrics().deferred_top_ups, 1);
    }

    #[test]
    fn test_per_request_schedules_each_top_up() {
        let config =
            PoolConfiguration::new().with_deferred_capacity(DeferredCapacity::PerRequest);
        let (assets, _scene, registry) = setup_with(false, config);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        pool.ensure_capacity(2).unwrap();
        pool.ensure_capacity(5).unwrap();
        pool.ensure_capacity(3).unwrap();
        assets.complete_pending();

        assert_eq!(pool.count(), 5);
        assert_eq!(pool.get_metrics().deferred_top_ups, 3);
    }

    #[test]
    fn test_lifo_reuse() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        let parent = scene.create_node("Level");

        let first = pool.get_object(None).unwrap();
        let second = pool.get_object(None).unwrap();
        pool.return_object(first);
        pool.return_object(second);

        let obj = pool.get_object(Some(&parent)).unwrap();
        assert_eq!(obj, second);
        assert!(scene.is_active(&obj));
        assert_eq!(scene.parent(&obj), Some(parent));
        assert!(!pool.contains(&obj));
    }

    #[test]
    fn test_return_deactivates_and_reparents() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let obj = pool.get_object(None).unwrap();
        assert!(scene.is_active(&obj));
        assert_eq!(scene.parent(&obj), None);

        pool.return_object(obj);
        assert!(!scene.is_active(&obj));
        assert_eq!(scene.parent(&obj), Some(*pool.container()));
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn test_get_object_blocks_until_load_completes() {
        let (assets, scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let loader = {
            let assets = Arc::clone(&assets);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                assets.complete_pending();
            })
        };

        let obj = pool.get_object(None).unwrap();
        assert!(scene.is_active(&obj));
        assert_eq!(scene.prefab_name(&obj).as_deref(), Some("Bullet"));
        loader.join().unwrap();
    }

    #[test]
    fn test_get_object_on_loading_pool_same_thread() {
        let (assets, scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        pool.ensure_capacity(2).unwrap();
        assert_eq!(pool.state(), PoolState::Loading);

        let obj = pool.get_object(None).unwrap();
        assert!(scene.is_active(&obj));
        assert_eq!(pool.state(), PoolState::Ready);
        assert_eq!(assets.pending_count(), 0);

        // The deferred top-up runs when the waiting thread finishes the load
        assert_eq!(pool.count(), 2);
        assert_eq!(scene.instantiated_count(), 3);
    }

    #[test]
    fn test_get_object_as_component() {
        let (_assets, _scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let damage: Option<u32> = pool.get_object_as(None).unwrap();
        assert_eq!(damage, Some(25));

        let missing: Option<String> = pool.get_object_as(None).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_clear_destroys_only_pooled_objects() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        pool.ensure_capacity(3).unwrap();
        let checked_out = pool.get_object(None).unwrap();

        pool.clear();
        assert_eq!(pool.count(), 0);
        assert!(scene.is_alive(&checked_out));
        assert_eq!(scene.object_count(), 1);

        let fresh = pool.get_object(None).unwrap();
        assert_ne!(fresh, checked_out);
        assert_eq!(pool.get_metrics().total_instantiated, 4);
    }

    #[test]
    fn test_max_pool_size_destroys_overflow() {
        let config = PoolConfiguration::new().with_max_pool_size(1);
        let (_assets, scene, registry) = setup_with(true, config);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let a = pool.get_object(None).unwrap();
        let b = pool.get_object(None).unwrap();
        pool.return_object(a);
        pool.return_object(b);

        assert_eq!(pool.count(), 1);
        assert!(scene.is_alive(&a));
        assert!(!scene.is_alive(&b));
    }

    #[test]
    fn test_max_pool_size_does_not_cap_ensure_capacity() {
        let config = PoolConfiguration::new().with_max_pool_size(2);
        let (_assets, scene, registry) = setup_with(true, config);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        pool.ensure_capacity(5).unwrap();
        assert_eq!(pool.count(), 5);

        let obj = pool.get_object(None).unwrap();
        assert_eq!(pool.count(), 4);
        pool.return_object(obj);
        assert_eq!(pool.count(), 4);
        assert!(!scene.is_alive(&obj));
    }

    #[test]
    fn test_concurrent_returns_respect_max_pool_size() {
        let config = PoolConfiguration::new().with_max_pool_size(3);
        let (_assets, scene, registry) = setup_with(true, config);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let objects: Vec<_> = (0..8).map(|_| pool.get_object(None).unwrap()).collect();
        let barrier = Arc::new(Barrier::new(objects.len()));
        let returners: Vec<_> = objects
            .into_iter()
            .map(|obj| {
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    pool.return_object(obj);
                })
            })
            .collect();
        for returner in returners {
            returner.join().unwrap();
        }

        assert_eq!(pool.count(), 3);
        assert_eq!(scene.object_count(), 3);
    }

    #[test]
    fn test_returns_racing_destroy_are_destroyed() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let objects: Vec<_> = (0..8).map(|_| pool.get_object(None).unwrap()).collect();
        let barrier = Arc::new(Barrier::new(objects.len() + 1));
        let returners: Vec<_> = objects
            .into_iter()
            .map(|obj| {
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    pool.return_object(obj);
                })
            })
            .collect();

        barrier.wait();
        pool.destroy();
        for returner in returners {
            returner.join().unwrap();
        }

        assert_eq!(pool.count(), 0);
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_failed_load() {
        let (assets, _scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("missing")).unwrap();
        pool.ensure_capacity(2).unwrap();

        assets.complete_pending();
        assert_eq!(pool.state(), PoolState::Failed);
        assert_eq!(pool.count(), 0);
        assert!(matches!(
            pool.get_object(None),
            Err(PoolError::LoadFailed(LoadError::NotFound(_)))
        ));
        assert!(matches!(pool.ensure_capacity(1), Err(PoolError::LoadFailed(_))));
    }

    #[test]
    fn test_destroy() {
        let (assets, scene, registry) = setup(true);
        let reference = AssetRef::new("bullet");
        let pool = registry.create_pool(&reference).unwrap();
        pool.ensure_capacity(2).unwrap();
        let checked_out = pool.get_object(None).unwrap();

        pool.destroy();
        assert!(pool.is_destroyed());
        assert_eq!(pool.state(), PoolState::Uninitialized);
        assert!(registry.pools(&reference).unwrap().is_empty());
        assert!(!scene.node_exists(pool.container()));
        assert_eq!(assets.release_count(), 1);
        assert!(scene.is_alive(&checked_out));

        assert!(matches!(pool.get_object(None), Err(PoolError::PoolDestroyed)));
        pool.return_object(checked_out);
        assert!(!scene.is_alive(&checked_out));

        pool.destroy();
        assert_eq!(assets.release_count(), 1);
    }

    #[test]
    fn test_deferred_top_up_after_destroy_is_ignored() {
        let (assets, scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        pool.ensure_capacity(3).unwrap();

        pool.destroy();
        assets.complete_pending();
        assert_eq!(pool.count(), 0);
        assert_eq!(scene.instantiated_count(), 0);
    }

    #[test]
    fn test_container_is_persistent() {
        let (_assets, scene, registry) = setup(true);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();
        assert!(scene.is_persistent(pool.container()));
        assert_eq!(
            scene.node_name(pool.container()).as_deref(),
            Some("Addressable Object Pool")
        );
    }

    #[tokio::test]
    async fn test_async_get_waits_for_load() {
        let (assets, scene, registry) = setup(false);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let loader = Arc::clone(&assets);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            loader.complete_pending();
        });

        let obj = pool.get_object_async(None).await.unwrap();
        assert!(scene.is_active(&obj));
    }

    #[tokio::test]
    async fn test_async_get_times_out() {
        let config = PoolConfiguration::new().with_timeout(Duration::from_millis(20));
        let (_assets, _scene, registry) = setup_with(false, config);
        let pool = registry.create_pool(&AssetRef::new("bullet")).unwrap();

        let result = pool.get_object_async(None).await;
        assert!(matches!(result, Err(PoolError::Timeout(_))));
    }
}
