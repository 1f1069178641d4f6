//! Registry of live pools keyed by prefab identity

use crate::asset::AssetProvider;
use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::handle::PoolHandle;
use crate::pool::{PoolList, PrefabPool};
use crate::scene::SceneGraph;

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Maps each prefab identity to the pools currently serving it.
///
/// The registry is cheap to clone; clones share the same pools. The first
/// pool registered for an identity is its primary and is what handles
/// resolve to.
///
/// # Examples
///
/// ```
/// use addressable_pool::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
/// use addressable_pool::{PoolConfiguration, PoolRegistry};
/// use std::sync::Arc;
///
/// let assets = Arc::new(MemoryAssets::new().with_auto_complete(true));
/// assets.insert("crate", Prefab::new("Crate"));
/// let registry = PoolRegistry::new(
///     assets,
///     Arc::new(MemoryScene::new()),
///     PoolConfiguration::default(),
/// );
///
/// let handle = registry.get_pool_handle(&AssetRef::new("crate")).unwrap();
/// let obj = handle.get_object(None).unwrap();
/// handle.return_object(obj);
/// assert_eq!(handle.pool().unwrap().count(), 1);
///
/// assert!(registry.get_pool_handle(&AssetRef::unset()).is_err());
/// ```
pub struct PoolRegistry<A: AssetProvider, S: SceneGraph> {
    inner: Arc<RegistryInner<A, S>>,
}

struct RegistryInner<A: AssetProvider, S: SceneGraph> {
    assets: Arc<A>,
    scene: Arc<S>,
    config: PoolConfiguration,
    pools: DashMap<A::Key, PoolList<A, S>>,
}

impl<A: AssetProvider, S: SceneGraph> Clone for PoolRegistry<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> PoolRegistry<A, S>
where
    A: AssetProvider,
    S: SceneGraph<Template = A::Asset>,
{
    /// Create an empty registry. `config` applies to every pool created
    /// without an explicit configuration.
    pub fn new(assets: Arc<A>, scene: Arc<S>, config: PoolConfiguration) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                assets,
                scene,
                config,
                pools: DashMap::new(),
            }),
        }
    }

    pub fn assets(&self) -> &Arc<A> {
        &self.inner.assets
    }

    pub fn scene(&self) -> &Arc<S> {
        &self.inner.scene
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.inner.config
    }

    /// Resolve `reference` to its prefab identity
    pub fn runtime_key(&self, reference: &A::Reference) -> PoolResult<A::Key> {
        match self.inner.assets.runtime_key(reference) {
            Some(key) => Ok(key),
            None => {
                error!("Prefab runtime key is not valid: {:?}", reference);
                Err(PoolError::InvalidPrefab(format!("{:?}", reference)))
            }
        }
    }

    /// Pool list for `key`, inserting an empty one if needed
    pub(crate) fn resolve(&self, key: &A::Key) -> PoolList<A, S> {
        let entry = self.inner.pools.entry(key.clone()).or_default();
        Arc::clone(&entry)
    }

    /// Get a handle to the pool serving `reference`.
    ///
    /// No pool is created until the handle is first used.
    pub fn get_pool_handle(&self, reference: &A::Reference) -> PoolResult<PoolHandle<A, S>> {
        let key = self.runtime_key(reference)?;
        let pools = self.resolve(&key);
        Ok(PoolHandle::new(self.clone(), reference.clone(), key, pools))
    }

    /// Create and register a new pool for `reference`
    pub fn create_pool(&self, reference: &A::Reference) -> PoolResult<Arc<PrefabPool<A, S>>> {
        self.create_pool_with_config(reference, self.inner.config.clone())
    }

    /// Create a pool that pre-instantiates `initial_capacity` objects once
    /// its prefab has loaded
    pub fn create_pool_with_capacity(
        &self,
        reference: &A::Reference,
        initial_capacity: usize,
    ) -> PoolResult<Arc<PrefabPool<A, S>>> {
        let config = self.inner.config.clone().with_initial_capacity(initial_capacity);
        self.create_pool_with_config(reference, config)
    }

    pub fn create_pool_with_config(
        &self,
        reference: &A::Reference,
        config: PoolConfiguration,
    ) -> PoolResult<Arc<PrefabPool<A, S>>> {
        let key = self.runtime_key(reference)?;
        let pools = self.resolve(&key);

        let pool = {
            let mut list = pools.write();
            self.spawn_pool(&mut list, &pools, reference, key, config)
        };

        pool.warm_up();
        Ok(pool)
    }

    /// Build a pool and append it to `list`, the locked contents of `pools`
    pub(crate) fn spawn_pool(
        &self,
        list: &mut Vec<Arc<PrefabPool<A, S>>>,
        pools: &PoolList<A, S>,
        reference: &A::Reference,
        key: A::Key,
        config: PoolConfiguration,
    ) -> Arc<PrefabPool<A, S>> {
        let pool = Arc::new(PrefabPool::initialize(
            Arc::clone(&self.inner.assets),
            Arc::clone(&self.inner.scene),
            reference.clone(),
            key,
            config,
            Arc::downgrade(pools),
        ));

        list.push(Arc::clone(&pool));
        debug!("Registered pool #{} for {:?}", list.len(), pool.key());
        pool
    }

    /// Every live pool for `reference`, primary first
    pub fn pools(&self, reference: &A::Reference) -> PoolResult<Vec<Arc<PrefabPool<A, S>>>> {
        let key = self.runtime_key(reference)?;
        Ok(self.resolve(&key).read().clone())
    }

    /// The pool handles for `reference` resolve to, if one exists
    pub fn primary_pool(
        &self,
        reference: &A::Reference,
    ) -> PoolResult<Option<Arc<PrefabPool<A, S>>>> {
        let key = self.runtime_key(reference)?;
        Ok(self.resolve(&key).read().first().cloned())
    }

    /// Number of live pools across all identities
    pub fn pool_count(&self) -> usize {
        self.inner.pools.iter().map(|entry| entry.value().read().len()).sum()
    }

    /// Number of identities with an entry, including empty ones
    pub fn identity_count(&self) -> usize {
        self.inner.pools.len()
    }

    /// Destroy every registered pool.
    ///
    /// Identity entries are kept, so existing handles stay usable and lazily
    /// create fresh pools.
    pub fn teardown(&self) {
        let lists: Vec<PoolList<A, S>> = self
            .inner
            .pools
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for list in lists {
            let pools = list.read().clone();
            for pool in pools {
                pool.destroy();
            }
        }
    }
}
