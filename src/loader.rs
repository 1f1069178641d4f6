//! Asset loading on a tokio runtime

use crate::asset::AssetProvider;
use crate::errors::LoadError;
use crate::load::LoadHandle;

use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// An asynchronous source of prefab assets.
#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    type Reference: Clone + Debug + Send + Sync + 'static;
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Asset: Clone + Send + Sync + 'static;

    fn runtime_key(&self, reference: &Self::Reference) -> Option<Self::Key>;

    async fn load(&self, key: &Self::Key) -> Result<Self::Asset, LoadError>;

    /// Called once the last handle for `key` has been released
    fn unload(&self, _key: &Self::Key) {}
}

/// [`AssetProvider`] that runs each load as a task on a tokio runtime.
///
/// Loads are reference counted per key: `unload` runs on the source when the
/// last handle for a key is released.
///
/// # Examples
///
/// ```
/// use addressable_pool::{AssetProvider, AssetSource, LoadError, TokioAssetLoader};
/// use async_trait::async_trait;
///
/// struct Names;
///
/// #[async_trait]
/// impl AssetSource for Names {
///     type Reference = &'static str;
///     type Key = &'static str;
///     type Asset = String;
///
///     fn runtime_key(&self, reference: &&'static str) -> Option<&'static str> {
///         Some(*reference)
///     }
///
///     async fn load(&self, key: &&'static str) -> Result<String, LoadError> {
///         Ok(key.to_uppercase())
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let loader = TokioAssetLoader::new(Names, tokio::runtime::Handle::current());
/// let handle = loader.load_asset_async(&"orc");
/// assert_eq!(handle.completion().await, Ok("ORC".to_string()));
/// # }
/// ```
pub struct TokioAssetLoader<L: AssetSource> {
    source: Arc<L>,
    runtime: Handle,
    live: DashMap<L::Key, usize>,
}

impl<L: AssetSource> TokioAssetLoader<L> {
    pub fn new(source: L, runtime: Handle) -> Self {
        Self {
            source: Arc::new(source),
            runtime,
            live: DashMap::new(),
        }
    }

    pub fn source(&self) -> &Arc<L> {
        &self.source
    }

    /// Number of unreleased handles for `key`
    pub fn live_count(&self, key: &L::Key) -> usize {
        self.live.get(key).map_or(0, |count| *count)
    }
}

impl<L: AssetSource> AssetProvider for TokioAssetLoader<L> {
    type Reference = L::Reference;
    type Key = L::Key;
    type Asset = L::Asset;

    fn runtime_key(&self, reference: &L::Reference) -> Option<L::Key> {
        self.source.runtime_key(reference)
    }

    fn load_asset_async(&self, reference: &L::Reference) -> LoadHandle<L::Asset> {
        let Some(key) = self.source.runtime_key(reference) else {
            return LoadHandle::failed(LoadError::NotFound(format!("{:?}", reference)));
        };

        *self.live.entry(key.clone()).or_insert(0) += 1;

        let (handle, completer) = LoadHandle::pending();
        let source = Arc::clone(&self.source);
        self.runtime.spawn(async move {
            let result = source.load(&key).await;
            if let Err(e) = &result {
                warn!("Loading {:?} failed: {}", key, e);
            }
            completer.complete(result);
        });

        handle
    }

    fn release(&self, reference: &L::Reference, handle: LoadHandle<L::Asset>) {
        drop(handle);

        let Some(key) = self.source.runtime_key(reference) else {
            return;
        };

        let last = match self.live.get_mut(&key) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => false,
        };

        if last {
            self.live.remove_if(&key, |_, count| *count == 0);
            debug!("Unloading {:?}", key);
            self.source.unload(&key);
        }
    }
}
