//! Post records: the metadata view of one `@post` entry.
//!
//! ```text
//! @post hello:
//! {
//!   title: "Hello",
//!   description: "First post",
//!   file: "posts/hello.md",
//!   date: "2024-01-01",
//! }
//! ```
//!
//! Every field is optional and reads as `""` when absent. A post without a
//! `file` is not publishable yet and is skipped without comment.
//!
//! ## Output naming
//!
//! The output file takes its name from the last path segment of `file` with
//! its last extension removed: `posts/hello.md` → `hello.html`,
//! `notes/v1.2.md` → `v1.2.html`.

use crate::query::{string_of, tagged_children};
use crate::tree::{NodeId, Tree};
use std::path::{Path, PathBuf};

/// Tag that marks a root-level node as a post.
pub const POST_TAG: &str = "post";

/// Borrowed view of one post's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostRecord<'t> {
    pub node: NodeId,
    /// The entry's own label, e.g. `hello` in `@post hello: {...}`
    pub name: &'t str,
    pub title: &'t str,
    pub description: &'t str,
    pub file: &'t str,
    pub date: &'t str,
}

impl<'t> PostRecord<'t> {
    pub fn from_node(tree: &'t Tree, node: NodeId) -> Self {
        Self {
            node,
            name: tree.string(node),
            title: string_of(tree, node, "title"),
            description: string_of(tree, node, "description"),
            file: string_of(tree, node, "file"),
            date: string_of(tree, node, "date"),
        }
    }

    pub fn is_publishable(&self) -> bool {
        !self.file.is_empty()
    }

    /// Where this post's page goes inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.html", output_stem(self.file)))
    }
}

/// All `@post` entries directly under the root, in document order.
pub fn posts(tree: &Tree) -> impl Iterator<Item = PostRecord<'_>> {
    tagged_children(tree, tree.root(), POST_TAG).map(move |node| PostRecord::from_node(tree, node))
}

/// Final path segment of `file` (after the last `/` or `\`) without its last
/// extension. A name that is only an extension (`.md`) becomes empty.
pub fn output_stem(file: &str) -> &str {
    let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn tree(src: &str) -> Tree {
        let doc = parse("posts.mdesk", src);
        assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
        doc.tree
    }

    #[test]
    fn stem_strips_directories_and_extension() {
        assert_eq!(output_stem("hello.md"), "hello");
        assert_eq!(output_stem("posts/2024/hello.md"), "hello");
        assert_eq!(output_stem(r"posts\hello.markdown"), "hello");
    }

    #[test]
    fn stem_removes_only_last_extension() {
        assert_eq!(output_stem("notes/v1.2.md"), "v1.2");
        assert_eq!(output_stem("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn stem_without_extension_is_unchanged() {
        assert_eq!(output_stem("posts/README"), "README");
    }

    #[test]
    fn stem_of_dotfile_is_empty() {
        assert_eq!(output_stem(".md"), "");
    }

    #[test]
    fn stem_ignores_dots_in_directories() {
        assert_eq!(output_stem("v1.0/hello"), "hello");
    }

    #[test]
    fn record_reads_all_fields() {
        let t = tree(
            "@post hello: { title: \"Hello\", description: \"Desc\", file: \"hello.md\", date: \"2024-01-01\" }",
        );
        let post = posts(&t).next().unwrap();
        assert_eq!(post.name, "hello");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.description, "Desc");
        assert_eq!(post.file, "hello.md");
        assert_eq!(post.date, "2024-01-01");
        assert!(post.is_publishable());
    }

    #[test]
    fn missing_fields_read_empty() {
        let t = tree("@post hello: { title: \"Hello\" }");
        let post = posts(&t).next().unwrap();
        assert_eq!(post.description, "");
        assert_eq!(post.file, "");
        assert!(!post.is_publishable());
    }

    #[test]
    fn only_tagged_root_children_are_posts() {
        let t = tree(
            "@post a: { file: \"a.md\" }\nb: { file: \"b.md\" }\n@draft c: {}\n@post d: {}\nwrap: { @post e: {} }",
        );
        let names: Vec<&str> = posts(&t).map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    #[test]
    fn output_path_joins_output_dir() {
        let t = tree("@post a: { file: \"posts/hello.md\" }");
        let post = posts(&t).next().unwrap();
        assert_eq!(
            post.output_path(Path::new("public")),
            Path::new("public").join("hello.html")
        );
    }
}
