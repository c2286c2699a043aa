//! Markdown to HTML.
//!
//! Thin adapter over `pulldown-cmark`. HTML comes out as a stream of chunks
//! pushed to a callback in emission order; [`to_html`] simply collects them.
//!
//! Besides the `tables` and `strikethrough` extensions, runs of whitespace in
//! ordinary text can be collapsed to a single space. Code blocks and inline
//! code are left alone.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Markdown extensions, as configured under `[markdown]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub collapse_whitespace: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            collapse_whitespace: true,
        }
    }
}

impl MarkdownOptions {
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }
}

/// Forwards every formatted piece straight to the callback.
struct ChunkSink<F>(F);

impl<F: FnMut(&str)> fmt::Write for ChunkSink<F> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.0)(s);
        Ok(())
    }
}

/// Fold each run of whitespace into one space. Borrows when nothing changes.
fn collapse_whitespace(text: CowStr<'_>) -> CowStr<'_> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.chars().any(|c| c.is_whitespace() && c != ' ');
    if !needs_work {
        return text;
    }
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    CowStr::from(out)
}

/// Render `source`, pushing HTML chunks to `sink` as they are produced.
pub fn render_chunks<F: FnMut(&str)>(source: &str, options: &MarkdownOptions, sink: F) {
    let collapse = options.collapse_whitespace;
    let mut in_code_block = false;
    let events = Parser::new_ext(source, options.parser_options()).map(move |event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            in_code_block = true;
            Event::Start(Tag::CodeBlock(kind))
        }
        Event::End(TagEnd::CodeBlock) => {
            in_code_block = false;
            Event::End(TagEnd::CodeBlock)
        }
        Event::Text(text) if collapse && !in_code_block => Event::Text(collapse_whitespace(text)),
        other => other,
    });
    html::write_html_fmt(ChunkSink(sink), events).ok();
}

/// Render `source` to one HTML string.
pub fn to_html(source: &str, options: &MarkdownOptions) -> String {
    let mut out = String::with_capacity(source.len() * 3 / 2);
    render_chunks(source, options, |chunk| out.push_str(chunk));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_renders_with_trailing_newline() {
        assert_eq!(to_html("# Hi", &MarkdownOptions::default()), "<h1>Hi</h1>\n");
    }

    #[test]
    fn chunks_concatenate_to_full_output() {
        let src = "# Title\n\nSome *emphasis* and `code`.\n\n- one\n- two\n";
        let mut chunks = Vec::new();
        render_chunks(src, &MarkdownOptions::default(), |c| chunks.push(c.to_string()));
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), to_html(src, &MarkdownOptions::default()));
    }

    #[test]
    fn tables_enabled_by_default() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n", &MarkdownOptions::default());
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn tables_can_be_disabled() {
        let options = MarkdownOptions {
            tables: false,
            ..MarkdownOptions::default()
        };
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n", &options);
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn strikethrough_enabled_by_default() {
        let html = to_html("~~gone~~", &MarkdownOptions::default());
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn whitespace_runs_collapse_in_text() {
        let html = to_html("a    b\t\tc", &MarkdownOptions::default());
        assert_eq!(html, "<p>a b c</p>\n");
    }

    #[test]
    fn whitespace_kept_when_collapse_disabled() {
        let options = MarkdownOptions {
            collapse_whitespace: false,
            ..MarkdownOptions::default()
        };
        let html = to_html("a    b", &options);
        assert_eq!(html, "<p>a    b</p>\n");
    }

    #[test]
    fn code_blocks_keep_their_spacing() {
        let html = to_html("```\nx    =  1\n```\n", &MarkdownOptions::default());
        assert!(html.contains("x    =  1"));
    }

    #[test]
    fn inline_code_keeps_its_spacing() {
        let html = to_html("`a    b`", &MarkdownOptions::default());
        assert!(html.contains("<code>a    b</code>"));
    }

    #[test]
    fn collapse_borrows_clean_text() {
        let text = CowStr::Borrowed("plain words");
        assert!(matches!(collapse_whitespace(text), CowStr::Borrowed(_)));
    }

    #[test]
    fn empty_source_is_empty_html() {
        assert_eq!(to_html("", &MarkdownOptions::default()), "");
    }
}
