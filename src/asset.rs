//! Asset reference resolution and loading

use crate::load::LoadHandle;

use std::fmt::Debug;
use std::hash::Hash;

/// Resolves asset references to runtime keys and loads the assets behind them.
///
/// Implementations are the bridge to the engine's addressable asset system.
pub trait AssetProvider: Send + Sync + 'static {
    /// Serializable, indirect pointer to a prefab
    type Reference: Clone + Debug + Send + Sync + 'static;

    /// Resolved identity of a reference, used as the registry key
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// The loaded prefab template
    type Asset: Clone + Send + Sync + 'static;

    /// Resolve `reference` to its runtime key. `None` for unset or invalid
    /// references.
    fn runtime_key(&self, reference: &Self::Reference) -> Option<Self::Key>;

    fn runtime_key_is_valid(&self, reference: &Self::Reference) -> bool {
        self.runtime_key(reference).is_some()
    }

    /// Begin loading the asset behind `reference`
    fn load_asset_async(&self, reference: &Self::Reference) -> LoadHandle<Self::Asset>;

    /// Release a handle obtained from [`load_asset_async`](Self::load_asset_async)
    fn release(&self, reference: &Self::Reference, handle: LoadHandle<Self::Asset>);
}
