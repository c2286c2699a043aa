//! Template evaluation.
//!
//! A template is just the ordered children of the document's `template` node:
//! string literals are copied through, identifiers are replaced by the value
//! bound to that name. There are exactly four names:
//!
//! | Name          | Value                                   |
//! |---------------|-----------------------------------------|
//! | `title`       | the post's `title` field                |
//! | `description` | the post's `description` field          |
//! | `content`     | the post's Markdown, rendered to HTML   |
//! | `date`        | the post's `date` field                 |
//!
//! An identifier outside that set contributes nothing and produces one
//! error diagnostic pointing at it. The rest of the template still renders.
//! Every other node class (numbers, symbols, nested sets) is skipped.
//!
//! Evaluation is a single pass, pure in `(template, bindings)`.

use crate::diagnostic::Diagnostic;
use crate::tree::{NodeId, TokenClass, Tree};

/// Names a template may refer to.
pub const BINDING_NAMES: [&str; 4] = ["title", "description", "content", "date"];

/// Values for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub content: &'a str,
    pub date: &'a str,
}

impl<'a> Bindings<'a> {
    /// Value bound to `name`, if `name` is one of [`BINDING_NAMES`].
    pub fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "title" => Some(self.title),
            "description" => Some(self.description),
            "content" => Some(self.content),
            "date" => Some(self.date),
            _ => None,
        }
    }
}

/// Result of evaluating a template: output chunks in document order plus any
/// unknown-variable diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation<'a> {
    pub chunks: Vec<&'a str>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation<'_> {
    /// Concatenate the chunks, no separators.
    pub fn render(&self) -> String {
        self.chunks.concat()
    }
}

fn unknown_variable(tree: &Tree, id: NodeId) -> Diagnostic {
    Diagnostic::error(
        tree.code_loc(id),
        format!("unknown variable `{}`", tree.string(id)),
    )
}

/// Evaluate the children of `template` against `bindings`.
pub fn evaluate<'a>(tree: &'a Tree, template: NodeId, bindings: &Bindings<'a>) -> Evaluation<'a> {
    let mut eval = Evaluation::default();
    for child in tree.children(template) {
        let node = &tree[child];
        match node.class {
            TokenClass::StringLiteral { .. } => eval.chunks.push(&node.string),
            TokenClass::Identifier => match bindings.lookup(&node.string) {
                Some(value) => eval.chunks.push(value),
                None => eval.diagnostics.push(unknown_variable(tree, child)),
            },
            TokenClass::Numeric | TokenClass::Symbol | TokenClass::Unlabeled => {}
        }
    }
    eval
}

/// Identifiers in `template` that no binding can satisfy, as diagnostics.
///
/// Same checks as [`evaluate`] without needing a post, for validating a
/// template up front.
pub fn unbound_identifiers(tree: &Tree, template: NodeId) -> Vec<Diagnostic> {
    tree.children(template)
        .filter(|&c| tree[c].class == TokenClass::Identifier)
        .filter(|&c| !BINDING_NAMES.contains(&tree.string(c)))
        .map(|c| unknown_variable(tree, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::parser::parse;
    use crate::query::child_named;

    fn template_of(src: &str) -> (Tree, NodeId) {
        let doc = parse("t.mdesk", src);
        assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
        let tree = doc.tree;
        let template = child_named(&tree, tree.root(), "template").unwrap();
        (tree, template)
    }

    fn bindings() -> Bindings<'static> {
        Bindings {
            title: "Hello",
            description: "A post",
            content: "<h1>Hi</h1>\n",
            date: "2024-01-01",
        }
    }

    #[test]
    fn literals_and_bindings_interleave() {
        let (tree, t) = template_of(
            "template: { \"<h1>\" title \"</h1><p>\" content \"</p>\" date }",
        );
        let b = bindings();
        let eval = evaluate(&tree, t, &b);
        assert!(eval.diagnostics.is_empty());
        assert_eq!(eval.render(), "<h1>Hello</h1><p><h1>Hi</h1>\n</p>2024-01-01");
    }

    #[test]
    fn literal_only_template_ignores_bindings() {
        let (tree, t) = template_of("template: { \"a\" 'b' \"\"\"c\nd\"\"\" }");
        let with = evaluate(&tree, t, &bindings());
        let without = evaluate(&tree, t, &Bindings::default());
        assert_eq!(with.render(), "abc\nd");
        assert_eq!(with.render(), without.render());
    }

    #[test]
    fn evaluation_is_repeatable() {
        let (tree, t) = template_of("template: { \"[\" title \"]\" description }");
        let b = bindings();
        let first = evaluate(&tree, t, &b);
        let second = evaluate(&tree, t, &b);
        assert_eq!(first, second);
        assert_eq!(first.render().as_bytes(), second.render().as_bytes());
    }

    #[test]
    fn unknown_identifier_contributes_nothing() {
        let (tree, t) = template_of("template:\n{\n  \"<p>\" author \"</p>\" title\n}");
        let eval = evaluate(&tree, t, &bindings());
        assert_eq!(eval.render(), "<p></p>Hello");
        assert_eq!(eval.diagnostics.len(), 1);

        let d = &eval.diagnostics[0];
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "unknown variable `author`");
        assert_eq!((d.loc.file.as_str(), d.loc.line, d.loc.column), ("t.mdesk", 3, 9));
    }

    #[test]
    fn each_unknown_identifier_reported_once_per_occurrence() {
        let (tree, t) = template_of("template: { x \"-\" x y }");
        let eval = evaluate(&tree, t, &bindings());
        assert_eq!(eval.render(), "-");
        let messages: Vec<&str> = eval.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unknown variable `x`", "unknown variable `x`", "unknown variable `y`"]
        );
    }

    #[test]
    fn binding_names_are_case_sensitive() {
        let (tree, t) = template_of("template: { Title }");
        let eval = evaluate(&tree, t, &bindings());
        assert_eq!(eval.render(), "");
        assert_eq!(eval.diagnostics.len(), 1);
    }

    #[test]
    fn other_node_classes_are_ignored() {
        let (tree, t) = template_of("template: { \"a\" 42 + { title } \"b\" }");
        let eval = evaluate(&tree, t, &bindings());
        assert_eq!(eval.render(), "ab");
        assert!(eval.diagnostics.is_empty());
    }

    #[test]
    fn empty_template_renders_empty() {
        let (tree, t) = template_of("template: {}");
        let eval = evaluate(&tree, t, &bindings());
        assert!(eval.chunks.is_empty());
        assert_eq!(eval.render(), "");
    }

    #[test]
    fn empty_bindings_substitute_empty_strings() {
        let (tree, t) = template_of("template: { \"<\" description \">\" }");
        let eval = evaluate(&tree, t, &Bindings::default());
        assert_eq!(eval.render(), "<>");
        assert!(eval.diagnostics.is_empty());
    }

    #[test]
    fn lookup_covers_exactly_the_binding_names() {
        let b = bindings();
        for name in BINDING_NAMES {
            assert!(b.lookup(name).is_some(), "{name} should be bound");
        }
        assert_eq!(b.lookup("author"), None);
        assert_eq!(b.lookup("content"), Some("<h1>Hi</h1>\n"));
    }

    #[test]
    fn unbound_identifiers_matches_evaluate() {
        let (tree, t) = template_of("template: { title author \"x\" date footer }");
        let names: Vec<String> = unbound_identifiers(&tree, t)
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(names, vec!["unknown variable `author`", "unknown variable `footer`"]);
        assert_eq!(
            evaluate(&tree, t, &bindings()).diagnostics,
            unbound_identifiers(&tree, t)
        );
    }
}
