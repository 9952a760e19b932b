//! Tree nodes mirroring the plaintext directory hierarchy.

use std::collections::HashMap;

use crate::entry::CacheEntry;

/// One cached directory and its cached subdirectories.
///
/// `children == None` marks a node that was never expanded into a directory.
/// `Some` with an empty map is a directory known to have no cached children.
/// Nodes are always fully built before being linked into a parent.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// IV and ciphertext segment of this directory.
    pub entry: CacheEntry,
    /// Child directories keyed by plaintext segment name.
    pub children: Option<HashMap<String, TreeNode>>,
}

impl TreeNode {
    /// A node that has never been expanded.
    pub fn leaf(entry: CacheEntry) -> Self {
        Self {
            entry,
            children: None,
        }
    }

    /// A directory node with an empty (but present) child map.
    pub fn directory(entry: CacheEntry) -> Self {
        Self {
            entry,
            children: Some(HashMap::new()),
        }
    }

    /// Look up a direct child by plaintext segment.
    #[inline]
    pub fn child(&self, segment: &str) -> Option<&TreeNode> {
        self.children.as_ref()?.get(segment)
    }

    /// Follow `segments` from this node. Every segment must resolve.
    pub fn descend<'a, I>(&self, segments: I) -> Option<&TreeNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Mutable variant of [`TreeNode::descend`].
    pub fn descend_mut<'a, I>(&mut self, segments: I) -> Option<&mut TreeNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for segment in segments {
            node = node.children.as_mut()?.get_mut(segment)?;
        }
        Some(node)
    }

    /// Follow `segments` and join the ciphertext segments of every visited
    /// node (this node excluded) with `/`.
    ///
    /// Returns the terminal node together with its full ciphertext path.
    pub fn resolve<'a, I>(&self, segments: I) -> Option<(&TreeNode, String)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        let mut cipher_path = String::new();
        for segment in segments {
            node = node.child(segment)?;
            if !cipher_path.is_empty() {
                cipher_path.push('/');
            }
            cipher_path.push_str(&node.entry.cipher_segment);
        }
        Some((node, cipher_path))
    }

    /// Attach `child` under `segment`, returning whatever node it replaced.
    ///
    /// Expands this node into a directory if it was a leaf.
    pub fn insert_child(
        &mut self,
        segment: impl Into<String>,
        child: TreeNode,
    ) -> Option<TreeNode> {
        self.children
            .get_or_insert_with(HashMap::new)
            .insert(segment.into(), child)
    }

    /// Detach the child at `segment` together with its subtree.
    pub fn remove_child(&mut self, segment: &str) -> Option<TreeNode> {
        self.children.as_mut()?.remove(segment)
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = &node.children {
                stack.extend(children.values());
            }
        }
        count
    }

    /// Number of nodes below this one.
    pub fn descendant_len(&self) -> usize {
        self.subtree_len() - 1
    }

    /// Pick an arbitrary leaf below this node that is not on the `protected`
    /// path, returning its segments relative to this node.
    ///
    /// `protected` lists the segments of a path starting at this node; no
    /// node on that path is returned, but nodes hanging below its end are.
    /// The choice follows map iteration order and is deliberately unordered.
    pub fn evictable_leaf(&self, protected: &[&str]) -> Option<Vec<String>> {
        let children = self.children.as_ref()?;
        let guarded = protected.first().copied();

        if let Some((name, child)) = children
            .iter()
            .find(|(name, _)| Some(name.as_str()) != guarded)
        {
            let mut path = vec![name.clone()];
            child.any_leaf(&mut path);
            return Some(path);
        }

        // Only the protected child is left; look further down its path.
        let name = guarded?;
        let mut path = children.get(name)?.evictable_leaf(&protected[1..])?;
        path.insert(0, name.to_string());
        Some(path)
    }

    /// Walk down arbitrary children until reaching a node with none,
    /// appending each segment to `path`.
    fn any_leaf(&self, path: &mut Vec<String>) {
        let mut node = self;
        while let Some((name, child)) = node.children.as_ref().and_then(|c| c.iter().next()) {
            path.push(name.clone());
            node = child;
        }
    }
}
