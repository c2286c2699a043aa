//! Shared test utilities for the deskpress test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = build(&SiteConfig::default(), tmp.path()).unwrap();
//!
//! let hello = find_post(&report, "hello");
//! assert_eq!(hello.status, PostStatus::Written);
//! assert!(read_output(tmp.path(), "hello.html").starts_with("<!DOCTYPE html>"));
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::pipeline::{BuildReport, PostReport};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures. `public/` is created empty.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    fs::create_dir_all(tmp.path().join("public")).unwrap();
    tmp
}

/// A throwaway site: `posts.mdesk` with `document`, the given Markdown
/// files (parent directories created), and an empty `public/`.
pub fn setup_site(document: &str, files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("posts.mdesk"), document).unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    fs::create_dir_all(tmp.path().join("public")).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Report lookups — panics with a clear message on miss
// =========================================================================

/// Find a post by entry name. Panics if not found.
pub fn find_post<'a>(report: &'a BuildReport, name: &str) -> &'a PostReport {
    report
        .posts
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = report.posts.iter().map(|p| p.name.as_str()).collect();
            panic!("post '{name}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Output directory
// =========================================================================

/// Contents of `public/<name>`. Panics if unreadable.
pub fn read_output(root: &Path, name: &str) -> String {
    let path = root.join("public").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Sorted file names in `public/`; empty when the directory is missing.
pub fn output_files(root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(root.join("public")) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
