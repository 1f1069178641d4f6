//! Scene graph collaborator

use std::fmt::Debug;

/// Instantiates, parents, toggles and destroys scene objects.
///
/// The pool never looks inside objects; it only moves them between its own
/// container node and the parents its callers ask for.
pub trait SceneGraph: Send + Sync + 'static {
    /// Template objects are instantiated from
    type Template: Clone + Send + Sync + 'static;

    /// Opaque handle to an instantiated object
    type Object: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// A node objects can be parented under
    type Node: Clone + Debug + Send + Sync + 'static;

    fn create_node(&self, name: &str) -> Self::Node;

    /// Destroy `node` together with anything still parented under it
    fn destroy_node(&self, node: &Self::Node);

    /// Keep `node` alive across scene transitions
    fn persist_across_scenes(&self, node: &Self::Node);

    fn instantiate(&self, template: &Self::Template, parent: Option<&Self::Node>) -> Self::Object;

    fn set_parent(&self, object: &Self::Object, parent: Option<&Self::Node>);

    fn set_active(&self, object: &Self::Object, active: bool);

    fn destroy(&self, object: &Self::Object);
}

/// Looks up a component of type `C` attached to a scene object.
pub trait ComponentLookup<C>: SceneGraph {
    fn component(&self, object: &Self::Object) -> Option<C>;
}
