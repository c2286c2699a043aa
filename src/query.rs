//! Named-field lookups over the document tree.
//!
//! A field can be written two ways, and both read the same:
//!
//! ```text
//! title: "Hello"      // named child wrapping its value  → "Hello"
//! "Hello"             // the child itself is the value   → "Hello"
//! ```
//!
//! [`value_of`] resolves either shape to the node holding the value;
//! [`string_of`] goes one step further to its text. Lookups are exact-match
//! and first-match-wins: a later field with the same name is invisible.

use crate::tree::{NodeId, Tree};

/// First immediate child of `parent` labelled `name`.
pub fn child_named(tree: &Tree, parent: NodeId, name: &str) -> Option<NodeId> {
    tree.children(parent).find(|&c| tree.string(c) == name)
}

/// The value slot of field `name` on `parent`.
///
/// Returns the named child's first child if it has children, otherwise the
/// named child itself. `None` when there is no such field.
pub fn value_of(tree: &Tree, parent: NodeId, name: &str) -> Option<NodeId> {
    let field = child_named(tree, parent, name)?;
    Some(tree.first_child(field).unwrap_or(field))
}

/// Text of [`value_of`], or `""` when the field is absent.
pub fn string_of<'t>(tree: &'t Tree, parent: NodeId, name: &str) -> &'t str {
    value_of(tree, parent, name).map_or("", |n| tree.string(n))
}

/// True if `node` carries a tag named `tag`. Tag arguments are ignored.
pub fn has_tag(tree: &Tree, node: NodeId, tag: &str) -> bool {
    tree[node].tags().iter().any(|&t| tree.string(t) == tag)
}

/// Every child of `parent` that carries `tag`, in document order.
pub fn tagged_children<'t>(
    tree: &'t Tree,
    parent: NodeId,
    tag: &'t str,
) -> impl Iterator<Item = NodeId> + 't {
    tree.children(parent).filter(move |&c| has_tag(tree, c, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeSpec, TreeBuilder};

    /// root
    /// ├── title ── "Wrapped"
    /// ├── bare
    /// ├── subtitle ── ""
    /// ├── dup ── "first"
    /// └── dup ── "second"
    fn fixture() -> Tree {
        let mut b = TreeBuilder::new("q.mdesk", "");
        let root = b.root();
        let title = b.push_child(root, NodeSpec::identifier("title", 0));
        b.push_child(title, NodeSpec::string_literal("Wrapped", 0));
        b.push_child(root, NodeSpec::identifier("bare", 0));
        let subtitle = b.push_child(root, NodeSpec::identifier("subtitle", 0));
        b.push_child(subtitle, NodeSpec::string_literal("", 0));
        let d1 = b.push_child(root, NodeSpec::identifier("dup", 0));
        b.push_child(d1, NodeSpec::string_literal("first", 0));
        let d2 = b.push_child(root, NodeSpec::identifier("dup", 0));
        b.push_child(d2, NodeSpec::string_literal("second", 0));
        b.finish()
    }

    #[test]
    fn value_of_unwraps_value_slot() {
        let tree = fixture();
        let v = value_of(&tree, tree.root(), "title").unwrap();
        assert_eq!(tree.string(v), "Wrapped");
    }

    #[test]
    fn value_of_bare_child_is_the_child() {
        let tree = fixture();
        let bare = child_named(&tree, tree.root(), "bare").unwrap();
        assert_eq!(value_of(&tree, tree.root(), "bare"), Some(bare));
        assert_eq!(string_of(&tree, tree.root(), "bare"), "bare");
    }

    #[test]
    fn missing_field_is_none_and_empty() {
        let tree = fixture();
        assert_eq!(value_of(&tree, tree.root(), "description"), None);
        assert_eq!(string_of(&tree, tree.root(), "description"), "");
    }

    #[test]
    fn empty_value_yields_empty_string() {
        let tree = fixture();
        assert!(value_of(&tree, tree.root(), "subtitle").is_some());
        assert_eq!(string_of(&tree, tree.root(), "subtitle"), "");
    }

    #[test]
    fn first_duplicate_wins() {
        let tree = fixture();
        assert_eq!(string_of(&tree, tree.root(), "dup"), "first");
    }

    #[test]
    fn match_is_exact() {
        let tree = fixture();
        assert_eq!(child_named(&tree, tree.root(), "Title"), None);
        assert_eq!(child_named(&tree, tree.root(), "titl"), None);
    }

    #[test]
    fn tags_match_by_exact_name() {
        let mut b = TreeBuilder::new("q.mdesk", "");
        let root = b.root();
        let a = b.push_child(root, NodeSpec::identifier("a", 0));
        let tag = b.push_tag(a, "post", 0);
        b.push_child(tag, NodeSpec::string_literal("arg", 0));
        let plain = b.push_child(root, NodeSpec::identifier("b", 0));
        let c = b.push_child(root, NodeSpec::identifier("c", 0));
        b.push_tag(c, "post", 0);
        let tree = b.finish();

        assert!(has_tag(&tree, a, "post"));
        assert!(!has_tag(&tree, plain, "post"));
        assert!(!has_tag(&tree, a, "Post"));

        let posts: Vec<_> = tagged_children(&tree, tree.root(), "post").collect();
        assert_eq!(posts, vec![a, c]);
    }
}
