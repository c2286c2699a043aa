//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Diagnostics
//!
//! One per line, compiler style:
//!
//! ```text
//! posts.mdesk:7:18: error: unknown variable `author`
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Hello, world → public/hello.html
//!     Source: posts/hello.md
//! 002 draft (no file, skipped)
//! 003 Tables → public/tables.html
//!     Source: posts/tables.md
//!
//! Wrote 2 pages, skipped 1
//! ```
//!
//! ## Scan
//!
//! ```text
//! Posts
//! 001 Hello, world
//!     Source: posts/hello.md
//!     Date: 2024-01-01
//!     Output: public/hello.html
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::diagnostic::{Diagnostic, Severity};
use crate::pipeline::{BuildReport, Manifest, PostReport, PostStatus};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Title if there is one, otherwise the entry label.
fn post_heading<'a>(name: &'a str, title: &'a str) -> &'a str {
    if title.is_empty() { name } else { title }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Build
// ============================================================================

fn post_lines(index: usize, post: &PostReport) -> Vec<String> {
    let heading = format!("{} {}", format_index(index), post_heading(&post.name, &post.title));
    let output = post
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    match post.status {
        PostStatus::Skipped => vec![format!("{heading} (no file, skipped)")],
        PostStatus::Written => vec![
            format!("{heading} → {output}"),
            format!("{}Source: {}", indent(1), post.file),
        ],
        PostStatus::WrittenWithoutSource => vec![
            format!("{heading} → {output}"),
            format!("{}Source: {} (unreadable, no content)", indent(1), post.file),
        ],
        PostStatus::WriteFailed => vec![
            format!("{heading} (failed)"),
            format!("{}Source: {}", indent(1), post.file),
            format!("{}Output: {output} (not written)", indent(1)),
        ],
    }
}

/// Format the per-post listing and the closing summary of a build.
///
/// Diagnostics are not included; they go to their own streams.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .posts
        .iter()
        .enumerate()
        .flat_map(|(i, post)| post_lines(i + 1, post))
        .collect();

    let written = report.written().count();
    let failed = report.failed().count();
    let skipped = report.posts.len() - written - failed;
    let mut summary = format!("Wrote {}", plural(written, "page"));
    if skipped > 0 {
        summary.push_str(&format!(", skipped {skipped}"));
    }
    if failed > 0 {
        summary.push_str(&format!(", {failed} failed"));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(summary);
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];
    if manifest.posts.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, post) in manifest.posts.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            post_heading(&post.name, &post.title)
        ));
        match &post.output {
            Some(output) => {
                lines.push(format!("{}Source: {}", indent(1), post.file));
                if !post.date.is_empty() {
                    lines.push(format!("{}Date: {}", indent(1), post.date));
                }
                lines.push(format!("{}Output: {}", indent(1), output.display()));
            }
            None => lines.push(format!("{}No file yet", indent(1))),
        }
    }
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Diagnostics followed by a verdict line.
pub fn format_check_output(diagnostics: &[Diagnostic]) -> Vec<String> {
    let mut lines = format_diagnostics(diagnostics);
    let errors = diagnostics.iter().filter(|d| d.severity.is_error()).count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    lines.push(match (errors, warnings) {
        (0, 0) => "==> Site is valid".to_string(),
        (0, w) => format!("==> Site is valid ({})", plural(w, "warning")),
        (e, w) => format!("==> {}, {}", plural(e, "error"), plural(w, "warning")),
    });
    lines
}

/// Print check output to stdout.
pub fn print_check_output(diagnostics: &[Diagnostic]) {
    for line in format_check_output(diagnostics) {
        println!("{}", line);
    }
}
