//! Element path tree: the parent/child structure of measured elements.
//!
//! Backed by a `petgraph` stable graph with edges from parent to child and
//! a path → index lookup. Children come back in insertion (document) order.

use crate::path::ElementPath;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ElementPathTree {
    graph: StableDiGraph<ElementPath, ()>,
    /// The empty path; parent of the storyboard.
    root: NodeIndex,
    index: HashMap<ElementPath, NodeIndex>,
}

impl Default for ElementPathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementPathTree {
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(ElementPath::empty());
        let mut index = HashMap::new();
        index.insert(ElementPath::empty(), root);
        Self { graph, root, index }
    }

    /// Build from paths in document order. Missing ancestors are created.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a ElementPath>) -> Self {
        let mut tree = Self::new();
        for path in paths {
            tree.ensure(path);
        }
        tree
    }

    fn ensure(&mut self, path: &ElementPath) -> NodeIndex {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let parent = self.ensure(&path.parent());
        let idx = self.graph.add_node(path.clone());
        self.graph.add_edge(parent, idx, ());
        self.index.insert(path.clone(), idx);
        idx
    }

    pub fn contains(&self, path: &ElementPath) -> bool {
        !path.is_empty() && self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.index.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn child_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Children of `path` in document order. The empty path yields the roots.
    pub fn children(&self, path: &ElementPath) -> Vec<&ElementPath> {
        match self.index.get(path) {
            Some(&idx) => self
                .child_indices(idx)
                .into_iter()
                .map(|c| &self.graph[c])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn parent(&self, path: &ElementPath) -> Option<&ElementPath> {
        let idx = *self.index.get(path)?;
        let parent = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()?;
        (parent != self.root).then(|| &self.graph[parent])
    }

    /// Every path under `path` (excluded), depth-first in document order.
    pub fn descendants(&self, path: &ElementPath) -> Vec<&ElementPath> {
        let mut out = Vec::new();
        if let Some(&idx) = self.index.get(path) {
            self.walk(idx, &mut out);
        }
        out
    }

    /// Every path in the tree, depth-first in document order.
    pub fn depth_first(&self) -> Vec<&ElementPath> {
        let mut out = Vec::new();
        self.walk(self.root, &mut out);
        out
    }

    fn walk<'a>(&'a self, idx: NodeIndex, out: &mut Vec<&'a ElementPath>) {
        for child in self.child_indices(idx) {
            out.push(&self.graph[child]);
            self.walk(child, out);
        }
    }
}

impl PartialEq for ElementPathTree {
    fn eq(&self, other: &Self) -> bool {
        let mine = self.depth_first();
        mine == other.depth_first()
            && mine
                .iter()
                .all(|p| self.children(p) == other.children(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::path;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_missing_ancestors() {
        let paths = [path("sb/scene:root/a"), path("sb/scene:root/b")];
        let tree = ElementPathTree::from_paths(paths.iter());
        assert!(tree.contains(&path("sb")));
        assert!(tree.contains(&path("sb/scene")));
        assert_eq!(tree.parent(&path("sb/scene:root")), Some(&path("sb/scene")));
        assert_eq!(tree.parent(&path("sb")), None);
        assert_eq!(
            tree.children(&path("sb/scene:root")),
            vec![&path("sb/scene:root/a"), &path("sb/scene:root/b")]
        );
    }

    #[test]
    fn depth_first_follows_document_order() {
        let paths = [
            path("sb/scene:root"),
            path("sb/scene:root/b"),
            path("sb/scene:root/a"),
            path("sb/scene:root/b/inner"),
        ];
        let tree = ElementPathTree::from_paths(paths.iter());
        let order: Vec<String> = tree.depth_first().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            order,
            vec![
                "sb",
                "sb/scene",
                "sb/scene:root",
                "sb/scene:root/b",
                "sb/scene:root/b/inner",
                "sb/scene:root/a",
            ]
        );
        assert_eq!(tree.descendants(&path("sb/scene:root")).len(), 3);
    }

    #[test]
    fn equality_ignores_construction_history() {
        let a = ElementPathTree::from_paths([path("sb/x"), path("sb/y")].iter());
        let b = ElementPathTree::from_paths([path("sb"), path("sb/x"), path("sb/y")].iter());
        assert_eq!(a, b);
        let c = ElementPathTree::from_paths([path("sb/y"), path("sb/x")].iter());
        assert!(a != c);
    }
}
