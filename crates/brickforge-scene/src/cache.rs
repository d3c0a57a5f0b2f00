//! The scene-model cache: deduplicates compiled nodes by composite key.

use std::collections::{HashMap, HashSet};

use crate::NodeKey;

/// Composite identity under which compiled nodes may be shared.
///
/// Two references share one node only when every field matches. The
/// uniqueness token is `None` for ordinary instancing; overlay-colored
/// builds get a fresh token so externally-colored geometry never aliases
/// intrinsically-colored geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Bare source model name, case-folded.
    pub name: String,
    /// Whether the active color was in the transparent class.
    pub transparent: bool,
    /// Uniqueness token; `Some` nodes are never shared.
    pub token: Option<u32>,
    /// Whether the node was built winding-certified.
    pub bfc: bool,
    /// Whether the node was built with inverted winding.
    pub inverted: bool,
}

impl CacheKey {
    /// A shareable key.
    pub fn shared(name: &str, transparent: bool, bfc: bool, inverted: bool) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            transparent,
            token: None,
            bfc,
            inverted,
        }
    }

    /// A uniquely-tokened key that will never hit.
    pub fn unique(name: &str, token: u32, bfc: bool, inverted: bool) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            transparent: false,
            token: Some(token),
            bfc,
            inverted,
        }
    }
}

/// Cache of compiled nodes for the lifetime of one scene graph.
///
/// No eviction: the cache is discarded wholesale with its graph. Keys being
/// compiled are tracked so re-entrant references (cycles in the document)
/// can be detected instead of recursing unbounded.
#[derive(Debug, Default)]
pub struct ModelCache {
    registered: HashMap<CacheKey, NodeKey>,
    in_progress: HashSet<CacheKey>,
}

impl ModelCache {
    /// A new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered node for `key`, if any.
    pub fn lookup(&self, key: &CacheKey) -> Option<NodeKey> {
        self.registered.get(key).copied()
    }

    /// Mark `key` as being compiled. Returns `false` if it already is,
    /// which means the document reference graph has a cycle.
    pub fn begin(&mut self, key: &CacheKey) -> bool {
        self.in_progress.insert(key.clone())
    }

    /// Clear the in-progress mark for `key`.
    pub fn finish(&mut self, key: &CacheKey) {
        self.in_progress.remove(key);
    }

    /// Register a compiled node, making it shareable under `key`.
    pub fn register(&mut self, key: CacheKey, node: NodeKey) {
        self.registered.insert(key, node);
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SceneGraph;

    #[test]
    fn test_shared_keys_equal() {
        let a = CacheKey::shared("Part.DAT", false, true, false);
        let b = CacheKey::shared("part.dat", false, true, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unique_keys_never_collide() {
        let a = CacheKey::unique("part.dat", 0, true, false);
        let b = CacheKey::unique("part.dat", 1, true, false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_bfc_and_inversion_partition() {
        let base = CacheKey::shared("part.dat", false, true, false);
        assert_ne!(base, CacheKey::shared("part.dat", false, false, false));
        assert_ne!(base, CacheKey::shared("part.dat", false, true, true));
        assert_ne!(base, CacheKey::shared("part.dat", true, true, false));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut graph = SceneGraph::new("root");
        let node = graph.insert(crate::SceneNode::new("part.dat", true));
        let mut cache = ModelCache::new();
        let key = CacheKey::shared("part.dat", false, true, false);
        assert!(cache.lookup(&key).is_none());
        cache.register(key.clone(), node);
        assert_eq!(cache.lookup(&key), Some(node));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cycle_detection() {
        let mut cache = ModelCache::new();
        let key = CacheKey::shared("a.dat", false, true, false);
        assert!(cache.begin(&key));
        assert!(!cache.begin(&key));
        cache.finish(&key);
        assert!(cache.begin(&key));
    }
}
