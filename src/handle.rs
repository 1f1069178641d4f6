//! Lazily resolving pool handles

use crate::asset::AssetProvider;
use crate::errors::PoolResult;
use crate::member::PoolMember;
use crate::pool::{PoolList, PrefabPool};
use crate::registry::PoolRegistry;
use crate::scene::{ComponentLookup, SceneGraph};

use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reference to "the pool serving this prefab".
///
/// A handle can be obtained before any pool exists for its prefab. The first
/// call that needs a pool creates one; after that every handle for the same
/// identity resolves to that same primary pool.
pub struct PoolHandle<A: AssetProvider, S: SceneGraph> {
    registry: PoolRegistry<A, S>,
    reference: A::Reference,
    key: A::Key,
    pools: PoolList<A, S>,
}

impl<A: AssetProvider, S: SceneGraph> Clone for PoolHandle<A, S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            reference: self.reference.clone(),
            key: self.key.clone(),
            pools: Arc::clone(&self.pools),
        }
    }
}

impl<A: AssetProvider, S: SceneGraph> fmt::Debug for PoolHandle<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHandle")
            .field("reference", &self.reference)
            .field("pools", &self.pools.read().len())
            .finish()
    }
}

impl<A, S> PoolHandle<A, S>
where
    A: AssetProvider,
    S: SceneGraph<Template = A::Asset>,
{
    pub(crate) fn new(
        registry: PoolRegistry<A, S>,
        reference: A::Reference,
        key: A::Key,
        pools: PoolList<A, S>,
    ) -> Self {
        Self {
            registry,
            reference,
            key,
            pools,
        }
    }

    pub fn reference(&self) -> &A::Reference {
        &self.reference
    }

    pub fn key(&self) -> &A::Key {
        &self.key
    }

    /// The primary pool, without creating one
    pub fn pool(&self) -> Option<Arc<PrefabPool<A, S>>> {
        self.pools.read().first().cloned()
    }

    /// The primary pool, created and registered if none exists
    pub fn resolve(&self) -> PoolResult<Arc<PrefabPool<A, S>>> {
        if let Some(pool) = self.pool() {
            return Ok(pool);
        }

        self.registry.runtime_key(&self.reference)?;

        let pool = {
            let mut list = self.pools.write();
            if let Some(pool) = list.first() {
                return Ok(Arc::clone(pool));
            }

            debug!("No pool for {:?}, creating one", self.key);
            self.registry.spawn_pool(
                &mut list,
                &self.pools,
                &self.reference,
                self.key.clone(),
                self.registry.config().clone(),
            )
        };

        pool.warm_up();
        Ok(pool)
    }

    pub fn ensure_capacity(&self, capacity: usize) -> PoolResult<()> {
        self.resolve()?.ensure_capacity(capacity)
    }

    pub fn get_object(&self, parent: Option<&S::Node>) -> PoolResult<S::Object> {
        self.resolve()?.get_object(parent)
    }

    pub fn get_object_as<C>(&self, parent: Option<&S::Node>) -> PoolResult<Option<C>>
    where
        S: ComponentLookup<C>,
    {
        self.resolve()?.get_object_as(parent)
    }

    pub async fn get_object_async(&self, parent: Option<&S::Node>) -> PoolResult<S::Object> {
        let pool = self.resolve()?;
        pool.get_object_async(parent).await
    }

    /// Get an object wrapped in a [`PoolMember`] that can return itself
    pub fn get_member(&self, parent: Option<&S::Node>) -> PoolResult<PoolMember<A, S>> {
        let object = self.get_object(parent)?;
        Ok(PoolMember::new(self.clone(), object))
    }

    /// Return `obj` to the primary pool, or destroy it if there is none
    pub fn return_object(&self, obj: S::Object) {
        match self.pool() {
            Some(pool) => pool.return_object(obj),
            None => {
                debug!("No pool for {:?}, destroying returned object", self.key);
                self.registry.scene().destroy(&obj);
            }
        }
    }

    /// Whether the handle's prefab reference still resolves
    pub fn is_valid(&self) -> bool {
        self.registry.assets().runtime_key_is_valid(&self.reference)
    }
}
