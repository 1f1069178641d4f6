//! Headless in-memory scene graph and asset catalog
//!
//! [`MemoryScene`] tracks objects and nodes in maps instead of a real scene.
//! [`MemoryAssets`] serves prefabs from a catalog and either completes loads
//! immediately or holds them until [`MemoryAssets::complete_pending`] is
//! called, which makes the loading state easy to drive from tests and tools.

use crate::asset::AssetProvider;
use crate::errors::LoadError;
use crate::load::{LoadCompleter, LoadHandle};
use crate::scene::{ComponentLookup, SceneGraph};

use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// A prefab template: a name and the components every instance carries
pub struct Prefab {
    name: String,
    components: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Prefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn with_component<C: Any + Send + Sync>(mut self, component: C) -> Self {
        self.components.push(Arc::new(component));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab")
            .field("name", &self.name)
            .field("components", &self.components.len())
            .finish()
    }
}

struct ObjectRecord {
    prefab: Arc<Prefab>,
    parent: Option<NodeId>,
    active: bool,
}

struct NodeRecord {
    name: String,
    persistent: bool,
}

/// Scene graph kept entirely in memory
#[derive(Default)]
pub struct MemoryScene {
    objects: DashMap<ObjectId, ObjectRecord>,
    nodes: DashMap<NodeId, NodeRecord>,
    next_id: AtomicU64,
    instantiated: AtomicUsize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn is_alive(&self, object: &ObjectId) -> bool {
        self.objects.contains_key(object)
    }

    /// False for destroyed objects
    pub fn is_active(&self, object: &ObjectId) -> bool {
        self.objects.get(object).is_some_and(|o| o.active)
    }

    pub fn parent(&self, object: &ObjectId) -> Option<NodeId> {
        self.objects.get(object)?.parent
    }

    pub fn prefab_name(&self, object: &ObjectId) -> Option<String> {
        Some(self.objects.get(object)?.prefab.name.clone())
    }

    /// Live objects parented under `node`
    pub fn children(&self, node: &NodeId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|entry| entry.parent == Some(*node))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects ever instantiated
    pub fn instantiated_count(&self) -> usize {
        self.instantiated.load(Ordering::Relaxed)
    }

    pub fn node_exists(&self, node: &NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node_name(&self, node: &NodeId) -> Option<String> {
        Some(self.nodes.get(node)?.name.clone())
    }

    pub fn is_persistent(&self, node: &NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.persistent)
    }

    /// Destroy every node not marked persistent, with its children
    pub fn unload_scene(&self) {
        let transient: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|entry| !entry.persistent)
            .map(|entry| *entry.key())
            .collect();

        for node in &transient {
            self.destroy_node(node);
        }
    }
}

impl SceneGraph for MemoryScene {
    type Template = Arc<Prefab>;
    type Object = ObjectId;
    type Node = NodeId;

    fn create_node(&self, name: &str) -> NodeId {
        let id = NodeId(self.next_id());
        self.nodes.insert(
            id,
            NodeRecord {
                name: name.to_string(),
                persistent: false,
            },
        );
        id
    }

    fn destroy_node(&self, node: &NodeId) {
        self.nodes.remove(node);
        self.objects.retain(|_, o| o.parent != Some(*node));
    }

    fn persist_across_scenes(&self, node: &NodeId) {
        if let Some(mut record) = self.nodes.get_mut(node) {
            record.persistent = true;
        }
    }

    fn instantiate(&self, template: &Arc<Prefab>, parent: Option<&NodeId>) -> ObjectId {
        let id = ObjectId(self.next_id());
        self.objects.insert(
            id,
            ObjectRecord {
                prefab: Arc::clone(template),
                parent: parent.copied(),
                active: true,
            },
        );
        self.instantiated.fetch_add(1, Ordering::Relaxed);
        id
    }

    fn set_parent(&self, object: &ObjectId, parent: Option<&NodeId>) {
        if let Some(mut record) = self.objects.get_mut(object) {
            record.parent = parent.copied();
        }
    }

    fn set_active(&self, object: &ObjectId, active: bool) {
        if let Some(mut record) = self.objects.get_mut(object) {
            record.active = active;
        }
    }

    fn destroy(&self, object: &ObjectId) {
        self.objects.remove(object);
    }
}

impl<C: Clone + Send + Sync + 'static> ComponentLookup<C> for MemoryScene {
    fn component(&self, object: &ObjectId) -> Option<C> {
        let record = self.objects.get(object)?;
        record
            .prefab
            .components
            .iter()
            .find_map(|c| c.downcast_ref::<C>())
            .cloned()
    }
}

/// Reference to a catalog entry. Unset or empty references are invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AssetRef {
    guid: Option<String>,
}

impl AssetRef {
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
        }
    }

    pub fn unset() -> Self {
        Self::default()
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

/// A load held until it is completed, failed or forced
struct HeldLoad {
    id: u64,
    guid: String,
    completer: LoadCompleter<Arc<Prefab>>,
}

fn lookup(
    catalog: &DashMap<String, Arc<Prefab>>,
    guid: &str,
) -> Result<Arc<Prefab>, LoadError> {
    catalog
        .get(guid)
        .map(|prefab| Arc::clone(&prefab))
        .ok_or_else(|| LoadError::NotFound(guid.to_string()))
}

/// Asset catalog kept entirely in memory.
///
/// Held loads can also be finished by whoever waits on them:
/// [`LoadHandle::wait_for_completion`] completes that one load from the
/// catalog on the waiting thread.
#[derive(Default)]
pub struct MemoryAssets {
    catalog: Arc<DashMap<String, Arc<Prefab>>>,
    auto_complete: AtomicBool,
    pending: Arc<Mutex<Vec<HeldLoad>>>,
    next_load: AtomicU64,
    loads: AtomicUsize,
    releases: AtomicUsize,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete loads as soon as they start instead of holding them
    pub fn with_auto_complete(self, enabled: bool) -> Self {
        self.set_auto_complete(enabled);
        self
    }

    pub fn set_auto_complete(&self, enabled: bool) {
        self.auto_complete.store(enabled, Ordering::Relaxed);
    }

    pub fn insert(&self, guid: impl Into<String>, prefab: Prefab) {
        self.catalog.insert(guid.into(), Arc::new(prefab));
    }

    /// Complete every held load from the catalog. Returns how many completed.
    pub fn complete_pending(&self) -> usize {
        let pending = std::mem::take(&mut *self.pending.lock());
        let count = pending.len();
        for load in pending {
            load.completer.complete(lookup(&self.catalog, &load.guid));
        }
        count
    }

    /// Fail every held load with `error`. Returns how many failed.
    pub fn fail_pending(&self, error: LoadError) -> usize {
        let pending = std::mem::take(&mut *self.pending.lock());
        let count = pending.len();
        for load in pending {
            load.completer.complete(Err(error.clone()));
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    fn hold(&self, guid: String) -> LoadHandle<Arc<Prefab>> {
        let id = self.next_load.fetch_add(1, Ordering::Relaxed);
        let catalog = Arc::clone(&self.catalog);
        let held = Arc::downgrade(&self.pending);

        let (handle, completer) = LoadHandle::pending_with(move || {
            let Some(held) = held.upgrade() else {
                return;
            };
            let load = {
                let mut loads = held.lock();
                loads
                    .iter()
                    .position(|load| load.id == id)
                    .map(|index| loads.remove(index))
            };
            if let Some(load) = load {
                load.completer.complete(lookup(&catalog, &load.guid));
            }
        });

        self.pending.lock().push(HeldLoad {
            id,
            guid,
            completer,
        });
        handle
    }
}

impl AssetProvider for MemoryAssets {
    type Reference = AssetRef;
    type Key = String;
    type Asset = Arc<Prefab>;

    fn runtime_key(&self, reference: &AssetRef) -> Option<String> {
        reference
            .guid()
            .filter(|guid| !guid.is_empty())
            .map(str::to_string)
    }

    fn load_asset_async(&self, reference: &AssetRef) -> LoadHandle<Arc<Prefab>> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        let Some(guid) = self.runtime_key(reference) else {
            return LoadHandle::failed(LoadError::NotFound(format!("{:?}", reference)));
        };

        if self.auto_complete.load(Ordering::Relaxed) {
            return match lookup(&self.catalog, &guid) {
                Ok(prefab) => LoadHandle::ready(prefab),
                Err(e) => LoadHandle::failed(e),
            };
        }

        self.hold(guid)
    }

    fn release(&self, _reference: &AssetRef, handle: LoadHandle<Arc<Prefab>>) {
        drop(handle);
        self.releases.fetch_add(1, Ordering::Relaxed);
    }
}
