//! Parser for the configuration document.
//!
//! The document uses a small Metadesk-style syntax: every entry is a node
//! with an optional list of `@tags`, a label, and optionally a set of child
//! nodes after a colon.
//!
//! ```text
//! @post hello:
//! {
//!   title: "Hello",
//!   file: "posts/hello.md",
//!   date: "2024-01-01",
//! }
//!
//! template:
//! {
//!   """<h1>""" title """</h1>""" content
//! }
//! ```
//!
//! ## Sets
//!
//! - `label: { a b c }` (or `( )` / `[ ]`) is an explicit set. The opening
//!   bracket may sit on the line after the colon.
//! - `label: a b` is an implicit set that ends at a newline, a `,` or `;`, or
//!   the closing bracket of the enclosing set.
//! - `{ a b }` without a label is an unlabeled node.
//!
//! ## Errors
//!
//! Parsing never fails outright. Every problem becomes a [`Diagnostic`] and
//! the parser skips ahead, so a single run reports every mistake in the file.

use crate::diagnostic::{Diagnostic, Severity, SourceLoc, max_severity};
use crate::lexer::{Delimiter, Token, TokenKind, tokenize};
use crate::tree::{NodeId, NodeKind, NodeSpec, TokenClass, Tree, TreeBuilder};

/// A parsed document: the tree plus everything the parser had to say.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: Tree,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn max_severity(&self) -> Option<Severity> {
        max_severity(&self.diagnostics)
    }

    /// True when the document must not be used (any error or worse).
    pub fn is_fatal(&self) -> bool {
        self.max_severity().is_some_and(Severity::is_error)
    }
}

/// Parse `source`, naming it `file` in diagnostics.
///
/// A leading byte order mark is dropped before parsing, so line and column
/// numbers match what an editor shows.
pub fn parse(file: &str, source: &str) -> Document {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let (tokens, mut diagnostics) = tokenize(file, source);
    let mut parser = Parser {
        file,
        src: source,
        tokens,
        pos: 0,
        builder: TreeBuilder::new(file, source),
        open: Vec::new(),
        diagnostics: Vec::new(),
    };
    let root = parser.builder.root();
    parser.set_body(root, Terminator::Eof);

    diagnostics.append(&mut parser.diagnostics);
    diagnostics.sort_by_key(|d| (d.loc.line, d.loc.column));
    let tree = parser.builder.finish();
    tracing::trace!(file, nodes = tree.len(), diagnostics = diagnostics.len(), "parsed document");
    Document { tree, diagnostics }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Eof,
    Close { delimiters: Delimiter, open_offset: usize },
    Implicit,
}

struct Parser<'s> {
    file: &'s str,
    src: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
    /// Delimiters of the explicit sets currently open, innermost last.
    open: Vec<Delimiter>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof and `pos` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn report(&mut self, severity: Severity, offset: usize, message: impl Into<String>) {
        let loc = SourceLoc::from_offset(self.file, self.src, offset);
        self.diagnostics.push(Diagnostic::new(severity, loc, message));
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    /// Parse child nodes of `parent` until `term`.
    fn set_body(&mut self, parent: NodeId, term: Terminator) {
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Newline => {
                    if term == Terminator::Implicit {
                        return;
                    }
                    self.advance();
                }
                TokenKind::Eof => {
                    if let Terminator::Close {
                        delimiters,
                        open_offset,
                    } = term
                    {
                        self.report(
                            Severity::Error,
                            open_offset,
                            format!("missing `{}` to close this set", delimiters.closer()),
                        );
                    }
                    return;
                }
                TokenKind::Close(found) => match term {
                    Terminator::Implicit => return,
                    Terminator::Close { delimiters, .. } if found == delimiters => {
                        self.advance();
                        return;
                    }
                    Terminator::Close {
                        delimiters,
                        open_offset,
                    } if self.open.contains(&found) => {
                        // Belongs to an outer set; this one was never closed.
                        self.report(
                            Severity::Error,
                            open_offset,
                            format!("missing `{}` to close this set", delimiters.closer()),
                        );
                        return;
                    }
                    _ => {
                        self.report(
                            Severity::Error,
                            token.span.start,
                            format!("unbalanced `{}`", found.closer()),
                        );
                        self.advance();
                    }
                },
                TokenKind::Comma | TokenKind::Semicolon => {
                    if term == Terminator::Implicit {
                        return;
                    }
                    self.report(
                        Severity::Warning,
                        token.span.start,
                        format!("empty entry before `{}`", token.raw(self.src)),
                    );
                    self.advance();
                }
                _ => {
                    let node = self.node(parent, term);
                    if term == Terminator::Implicit {
                        continue;
                    }
                    // A separator right after a node ends that entry.
                    if node.is_some()
                        && matches!(self.peek_kind(), TokenKind::Comma | TokenKind::Semicolon)
                    {
                        self.advance();
                    }
                }
            }
        }
    }

    /// Parse one node (tags, label, children) into `parent`.
    fn node(&mut self, parent: NodeId, term: Terminator) -> Option<NodeId> {
        let first = self.peek().clone();
        let starts_node = first.is_label()
            || matches!(first.kind, TokenKind::At | TokenKind::Open(_));
        if !starts_node {
            let message = match first.kind {
                TokenKind::Colon => "expected a label before `:`".to_string(),
                TokenKind::BadCharacter => {
                    format!("unexpected character `{}`", first.raw(self.src).escape_default())
                }
                _ => format!("unexpected `{}`", first.raw(self.src).escape_default()),
            };
            self.report(Severity::Error, first.span.start, message);
            self.advance();
            return None;
        }

        let node = self
            .builder
            .push_child(parent, NodeSpec::unlabeled(first.span.start));
        let mut tagged = false;

        while self.peek_kind() == TokenKind::At {
            tagged = true;
            self.tag(node);
            if term != Terminator::Implicit {
                self.skip_newlines();
            }
        }

        let token = self.peek().clone();
        match token.kind {
            k if token.is_label() => {
                let class = match k {
                    TokenKind::Identifier => TokenClass::Identifier,
                    TokenKind::Numeric => TokenClass::Numeric,
                    TokenKind::StringLiteral { quote, triple } => {
                        TokenClass::StringLiteral { quote, triple }
                    }
                    _ => TokenClass::Symbol,
                };
                self.builder.set_label(
                    node,
                    NodeSpec {
                        kind: NodeKind::Main,
                        class,
                        string: token.text(self.src).to_string(),
                        offset: token.span.start,
                    },
                );
                self.advance();
                if self.peek_kind() == TokenKind::Colon {
                    self.advance();
                    self.children(node);
                }
            }
            TokenKind::Open(delimiters) => {
                self.advance();
                self.explicit_set(node, delimiters, token.span.start);
            }
            _ => {
                let message = if tagged {
                    "tag is not attached to a node"
                } else {
                    "expected a node"
                };
                self.report(Severity::Error, token.span.start, message);
                let mut marker = NodeSpec::unlabeled(token.span.start);
                marker.kind = NodeKind::ErrorMarker;
                self.builder.set_label(node, marker);
            }
        }
        Some(node)
    }

    /// `@name` or `@name(args)`.
    fn tag(&mut self, node: NodeId) {
        let at = self.advance();
        let name = self.peek().clone();
        if name.kind != TokenKind::Identifier || name.span.start != at.span.end {
            self.report(Severity::Error, at.span.start, "expected a tag name after `@`");
            return;
        }
        self.advance();
        let tag = self
            .builder
            .push_tag(node, name.text(self.src), at.span.start);

        let next = self.peek().clone();
        if let TokenKind::Open(delimiters) = next.kind {
            if next.span.start == name.span.end {
                self.advance();
                self.explicit_set(tag, delimiters, next.span.start);
            }
        }
    }

    /// Children after `label:`.
    fn children(&mut self, node: NodeId) {
        let mut look = self.pos;
        while self.tokens[look].kind == TokenKind::Newline {
            look += 1;
        }
        let ahead = self.tokens[look].clone();
        if let TokenKind::Open(delimiters) = ahead.kind {
            self.pos = look + 1;
            self.explicit_set(node, delimiters, ahead.span.start);
            return;
        }
        match self.peek_kind() {
            TokenKind::Newline
            | TokenKind::Eof
            | TokenKind::Close(_)
            | TokenKind::Comma
            | TokenKind::Semicolon => {}
            _ => self.set_body(node, Terminator::Implicit),
        }
    }

    fn explicit_set(&mut self, node: NodeId, delimiters: Delimiter, open_offset: usize) {
        self.open.push(delimiters);
        self.set_body(
            node,
            Terminator::Close {
                delimiters,
                open_offset,
            },
        );
        self.open.pop();
    }
}
