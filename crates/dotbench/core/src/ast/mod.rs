// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Synthetic syntax trees
//!
//! Every tree owns its nodes in a flat arena. Children and the parent
//! back-reference are `NodeId` handles into that arena, so a tree has a
//! single owner and can be traversed from many threads at once.

pub mod generator;

pub use generator::{TreeGenerator, expected_node_count};

use std::fmt;

/// Kind of a synthetic syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    FunctionDecl,
    VarDecl,
    CallExpr,
    BinaryExpr,
    Identifier,
}

impl NodeKind {
    /// All kinds, in declaration order
    pub const ALL: [NodeKind; 5] = [NodeKind::FunctionDecl, NodeKind::VarDecl, NodeKind::CallExpr, NodeKind::BinaryExpr, NodeKind::Identifier];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FunctionDecl => "FunctionDecl",
            Self::VarDecl => "VarDecl",
            Self::CallExpr => "CallExpr",
            Self::BinaryExpr => "BinaryExpr",
            Self::Identifier => "Identifier",
        };
        f.write_str(name)
    }
}

/// Handle to a node inside its owning [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of a synthetic syntax tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub name: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TreeNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Non-owning back-reference, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed syntax tree
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl Ast {
    /// Creates a tree holding only a root node
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        let root = TreeNode {
            kind,
            name: name.into(),
            children: Vec::new(),
            parent: None,
        };
        Self { nodes: vec![root], root: NodeId(0) }
    }

    /// Appends a child under `parent` and wires its back-reference
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, name: impl Into<String>) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            kind,
            name: name.into(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Total number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distance from the root, following parent handles
    pub fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Pre-order traversal from the root
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { ast: self, stack: vec![self.root] }
    }

    /// Node count per kind, indexed in [`NodeKind::ALL`] order
    pub fn kind_histogram(&self) -> [usize; 5] {
        let mut histogram = [0usize; 5];
        for node in &self.nodes {
            histogram[node.kind.index()] += 1;
        }
        histogram
    }
}

/// Iterator over `(NodeId, &TreeNode)` in pre-order
pub struct Preorder<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.ast.node(id);
        // Reverse so the first child is visited first
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Ast {
        let mut ast = Ast::new(NodeKind::FunctionDecl, "main");
        let root = ast.root();
        let decl = ast.add_child(root, NodeKind::VarDecl, "x");
        ast.add_child(decl, NodeKind::Identifier, "x_ref");
        ast.add_child(root, NodeKind::CallExpr, "print");
        ast
    }

    #[test]
    fn test_parent_links_point_back() {
        let ast = sample_tree();
        let root = ast.root();
        assert_eq!(ast.parent(root), None);
        for &child in ast.children(root) {
            assert_eq!(ast.parent(child), Some(root));
        }
    }

    #[test]
    fn test_preorder_visits_every_node_once() {
        let ast = sample_tree();
        let names: Vec<&str> = ast.preorder().map(|(_, node)| node.name.as_str()).collect();
        assert_eq!(names, vec!["main", "x", "x_ref", "print"]);
        assert_eq!(ast.preorder().count(), ast.len());
    }

    #[test]
    fn test_depth_and_histogram() {
        let ast = sample_tree();
        let leaf = ast.preorder().find(|(_, node)| node.name == "x_ref").map(|(id, _)| id).unwrap();
        assert_eq!(ast.depth_of(leaf), 2);
        assert!(ast.node(leaf).is_leaf());
        assert_eq!(ast.kind_histogram(), [1, 1, 1, 0, 1]);
    }
}
