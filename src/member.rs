//! Pool membership for individual objects

use crate::asset::AssetProvider;
use crate::errors::PoolResult;
use crate::handle::PoolHandle;
use crate::registry::PoolRegistry;
use crate::scene::SceneGraph;

/// An object paired with the handle of the pool it belongs to, so it can send
/// itself back without the caller knowing which pool that is.
///
/// # Examples
///
/// ```
/// use addressable_pool::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
/// use addressable_pool::{PoolConfiguration, PoolRegistry};
/// use std::sync::Arc;
///
/// let assets = Arc::new(MemoryAssets::new().with_auto_complete(true));
/// assets.insert("spark", Prefab::new("Spark"));
/// let scene = Arc::new(MemoryScene::new());
/// let registry = PoolRegistry::new(assets, Arc::clone(&scene), PoolConfiguration::default());
///
/// let handle = registry.get_pool_handle(&AssetRef::new("spark")).unwrap();
/// let member = handle.get_member(None).unwrap();
/// member.return_object();
///
/// assert!(!scene.is_active(member.object()));
/// assert_eq!(handle.pool().unwrap().count(), 1);
/// ```
pub struct PoolMember<A: AssetProvider, S: SceneGraph> {
    handle: PoolHandle<A, S>,
    object: S::Object,
}

impl<A, S> PoolMember<A, S>
where
    A: AssetProvider,
    S: SceneGraph<Template = A::Asset>,
{
    pub(crate) fn new(handle: PoolHandle<A, S>, object: S::Object) -> Self {
        Self { handle, object }
    }

    /// Attach pool membership for `reference` to an existing object
    pub fn attach(
        registry: &PoolRegistry<A, S>,
        reference: &A::Reference,
        object: S::Object,
    ) -> PoolResult<Self> {
        let handle = registry.get_pool_handle(reference)?;
        Ok(Self::new(handle, object))
    }

    pub fn handle(&self) -> &PoolHandle<A, S> {
        &self.handle
    }

    pub fn object(&self) -> &S::Object {
        &self.object
    }

    /// Send the object back to its pool, or destroy it if the pool is gone
    pub fn return_object(&self) {
        self.handle.return_object(self.object.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfiguration;
    use crate::errors::PoolError;
    use crate::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};

    use std::sync::Arc;

    #[test]
    fn test_attach_and_return() {
        let assets = Arc::new(MemoryAssets::new().with_auto_complete(true));
        assets.insert("leaf", Prefab::new("Leaf"));
        let scene = Arc::new(MemoryScene::new());
        let registry = PoolRegistry::new(assets, Arc::clone(&scene), PoolConfiguration::default());
        let reference = AssetRef::new("leaf");

        let pool = registry.create_pool(&reference).unwrap();
        let obj = pool.get_object(None).unwrap();

        let member = PoolMember::attach(&registry, &reference, obj).unwrap();
        member.return_object();
        assert!(pool.contains(member.object()));

        let err = PoolMember::attach(&registry, &AssetRef::unset(), obj);
        assert!(matches!(err, Err(PoolError::InvalidPrefab(_))));
    }
}
