//! # deskpress
//!
//! A small static blog generator. One Metadesk document, `posts.mdesk`,
//! declares every post and the HTML template; each post's Markdown file is
//! rendered and substituted into the template, producing one page per post.
//!
//! ```text
//! posts.mdesk ──parse──▶ Tree ──@post──▶ PostRecord ──┐
//!                          │                          ├─▶ evaluate ─▶ public/<stem>.html
//!                          └──template──▶ NodeId      │
//! posts/*.md ───────────── markdown::to_html ─────────┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`lexer`] | Tokens of the Metadesk surface syntax |
//! | [`parser`] | Builds the document [`tree::Tree`] and collects diagnostics |
//! | [`tree`] | Arena of nodes addressed by [`tree::NodeId`] |
//! | [`query`] | Child-by-name, tag and value helpers over the tree |
//! | [`diagnostic`] | Severity, source location, compiler-style messages |
//! | [`post`] | `@post` entries as typed records, output naming |
//! | [`template`] | Evaluates the `template` node against one post |
//! | [`markdown`] | Markdown → HTML via `pulldown-cmark` |
//! | [`pipeline`] | `build`, `scan` and `check` over a site root |
//! | [`config`] | Optional `deskpress.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Diagnostics Are Values
//!
//! Nothing in the parser or evaluator fails early. Problems are collected as
//! [`diagnostic::Diagnostic`]s carrying a file, line and column, so a single
//! run reports every mistake in the document. Only the pipeline decides what
//! is fatal: any document diagnostic at error severity stops the build before
//! the first page is written.
//!
//! ## Arena Tree
//!
//! Nodes live in one `Vec` and refer to each other by index. Parent links,
//! child lists and tags are all `NodeId`s, so the tree is immutable after
//! parsing and can be borrowed freely while posts are rendered.
//!
//! ## Templates Without a Template Language
//!
//! The template is ordinary document syntax: string literals are copied
//! through and four identifiers (`title`, `description`, `content`, `date`)
//! are substituted. There are no loops, conditionals or escaping.

pub mod config;
pub mod diagnostic;
pub mod lexer;
pub mod markdown;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod post;
pub mod query;
pub mod template;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;
