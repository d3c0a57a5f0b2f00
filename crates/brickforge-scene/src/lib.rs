#![warn(missing_docs)]

//! Scene graph output of the brickforge compiler.
//!
//! A [`SceneGraph`] owns an arena of compiled [`SceneNode`]s. Nodes hold
//! tessellated geometry in two pools (plain and winding-certified) plus a
//! list of child [`Instance`]s; identical references share one node through
//! the [`ModelCache`]. The graph is immutable once a build completes and is
//! discarded wholesale on rebuild.

mod cache;
mod node;

pub use cache::{CacheKey, ModelCache};
pub use node::{
    ConditionalShape, GeometryMark, GeometrySet, Instance, InstanceColor, LineShape, QuadShape,
    SceneNode, ShapeColor, TextureRegion, TriangleShape,
};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key identifying a scene node. Key equality is node identity.
    pub struct NodeKey;
}

/// A compiled scene: node arena plus the root node.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    unregistered: u32,
}

impl SceneGraph {
    /// A new graph with an empty root node of the given name.
    pub fn new(root_name: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(root_name, false));
        Self {
            nodes,
            root,
            unregistered: 0,
        }
    }

    /// Key of the root node.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &SceneNode {
        &self.nodes[self.root]
    }

    /// Replace the root node's contents.
    pub fn set_root_node(&mut self, node: SceneNode) {
        self.nodes[self.root] = node;
    }

    /// Insert a node into the arena.
    pub fn insert(&mut self, node: SceneNode) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Borrow a node.
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Borrow a node mutably.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Number of nodes in the arena (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Count of nodes that were generated but deliberately not registered
    /// for sharing (uniquely-colored overlay builds). Diagnostic only.
    pub fn unregistered_count(&self) -> u32 {
        self.unregistered
    }

    /// Bump the unregistered-node diagnostic.
    pub fn note_unregistered(&mut self) {
        self.unregistered += 1;
    }
}
