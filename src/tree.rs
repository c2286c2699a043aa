//! The parsed document tree.
//!
//! A [`Tree`] is an index arena: every [`Node`] lives in one `Vec`, and nodes
//! refer to each other by [`NodeId`]. Children are stored as an ordered list of
//! ids; the parent is an optional id that is only ever used to recover the
//! source location of a node for diagnostics.
//!
//! ```text
//! File "posts.mdesk"
//! ├── @post hello
//! │   ├── title
//! │   │   └── "Hello"
//! │   └── file
//! │       └── "hello.md"
//! └── template
//!     ├── """<h1>"""
//!     ├── title
//!     └── """</h1>"""
//! ```
//!
//! Trees are built once with a [`TreeBuilder`] (normally by
//! [`crate::parser`]) and are read-only afterwards: `Tree` hands out shared
//! references only.

use crate::diagnostic::SourceLoc;
use std::ops::Index;

/// Stable handle to a node inside one [`Tree`].
///
/// Ids are only meaningful for the tree that produced them; indexing a tree
/// with a foreign id panics or returns an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a parsed file; its `string` is the file name.
    File,
    Main,
    /// An `@name` attached to a node. Tag arguments are its children.
    Tag,
    /// Stand-in for input the parser could not make sense of.
    ErrorMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
    Backtick,
}

/// Lexical class of a node's label. This is what the template evaluator
/// dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Identifier,
    Numeric,
    StringLiteral { quote: QuoteStyle, triple: bool },
    Symbol,
    /// No label at all: a bare `{ ... }` set, the file root, or an error marker.
    Unlabeled,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub class: TokenClass,
    /// Label text. String literals are stored without their quotes.
    pub string: String,
    /// Byte offset of the label in the source text.
    pub offset: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tags: Vec<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn tags(&self) -> &[NodeId] {
        &self.tags
    }
}

/// Label data for a node about to be added with [`TreeBuilder`].
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub class: TokenClass,
    pub string: String,
    pub offset: usize,
}

impl NodeSpec {
    pub fn unlabeled(offset: usize) -> Self {
        Self {
            kind: NodeKind::Main,
            class: TokenClass::Unlabeled,
            string: String::new(),
            offset,
        }
    }
}

#[cfg(test)]
impl NodeSpec {
    pub fn identifier(name: &str, offset: usize) -> Self {
        Self {
            kind: NodeKind::Main,
            class: TokenClass::Identifier,
            string: name.to_string(),
            offset,
        }
    }

    pub fn string_literal(text: &str, offset: usize) -> Self {
        Self {
            kind: NodeKind::Main,
            class: TokenClass::StringLiteral {
                quote: QuoteStyle::Double,
                triple: false,
            },
            string: text.to_string(),
            offset,
        }
    }
}

/// Read-only document tree. See the module docs.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    source: String,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn string(&self, id: NodeId) -> &str {
        &self[id].string
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self[id].children.iter().copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self[id].children.first().copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// Source location of a node, for diagnostics.
    ///
    /// The file name comes from the nearest enclosing [`NodeKind::File`] node,
    /// reached through parent links.
    pub fn code_loc(&self, id: NodeId) -> SourceLoc {
        let file = self
            .ancestors(id)
            .find(|&n| self[n].kind == NodeKind::File)
            .map_or("", |n| self[n].string.as_str());
        SourceLoc::from_offset(file, &self.source, self[id].offset)
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Appends nodes to a tree under construction.
///
/// Nodes are never removed, so every id handed out stays valid in the
/// finished [`Tree`].
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    source: String,
}

impl TreeBuilder {
    /// Start a tree whose root is a [`NodeKind::File`] node named `file`.
    pub fn new(file: &str, source: &str) -> Self {
        let root = Node {
            kind: NodeKind::File,
            class: TokenClass::Unlabeled,
            string: file.to_string(),
            offset: 0,
            parent: None,
            children: Vec::new(),
            tags: Vec::new(),
        };
        Self {
            nodes: vec![root],
            source: source.to_string(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn alloc(&mut self, spec: NodeSpec, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: spec.kind,
            class: spec.class,
            string: spec.string,
            offset: spec.offset,
            parent: Some(parent),
            children: Vec::new(),
            tags: Vec::new(),
        });
        id
    }

    /// Add `spec` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.alloc(spec, parent);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attach a tag named `name` to `node`. Arguments go in as the tag's
    /// children via [`TreeBuilder::push_child`].
    pub fn push_tag(&mut self, node: NodeId, name: &str, offset: usize) -> NodeId {
        let spec = NodeSpec {
            kind: NodeKind::Tag,
            class: TokenClass::Identifier,
            string: name.to_string(),
            offset,
        };
        let id = self.alloc(spec, node);
        self.nodes[node.0].tags.push(id);
        id
    }

    /// Fill in the label of a node created before its label was known (a
    /// node's tags come first in the source).
    pub fn set_label(&mut self, node: NodeId, spec: NodeSpec) {
        let target = &mut self.nodes[node.0];
        target.kind = spec.kind;
        target.class = spec.class;
        target.string = spec.string;
        target.offset = spec.offset;
    }

    pub fn finish(self) -> Tree {
        Tree {
            nodes: self.nodes,
            source: self.source,
        }
    }
}
