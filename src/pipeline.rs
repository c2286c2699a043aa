//! The build pipeline.
//!
//! One pass over the configuration document:
//!
//! ```text
//! read posts.mdesk → parse → abort on errors → find template
//!   for each @post:  fields → read Markdown → HTML → evaluate template → write page
//! ```
//!
//! ## Failure policy
//!
//! | Condition                               | Effect                                 |
//! |-----------------------------------------|----------------------------------------|
//! | document unreadable                     | [`BuildError::Io`], nothing built      |
//! | document diagnostic at error or above   | [`BuildError::Fatal`], nothing built   |
//! | no `template` node                      | [`BuildError::Fatal`], nothing built   |
//! | post without `file`                     | post skipped, no diagnostic            |
//! | unknown template variable               | error diagnostic, page still written   |
//! | Markdown unreadable                     | warning, page written with no content  |
//! | page unwritable                         | warning diagnostic, batch continues    |
//!
//! Per-post problems are values in the [`BuildReport`], never errors: one bad
//! post must not stop the others.

use crate::config::{ConfigError, SiteConfig};
use crate::diagnostic::{Diagnostic, Severity};
use crate::markdown;
use crate::parser::{Document, parse};
use crate::post::{self, PostRecord};
use crate::query::child_named;
use crate::template::{self, Bindings};
use crate::tree::{NodeId, Tree};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the root-level node holding the page template.
pub const TEMPLATE_NODE: &str = "template";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("configuration document has {} error(s)", error_count(.diagnostics))]
    Fatal { diagnostics: Vec<Diagnostic> },
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.severity.is_error()).count()
}

/// A parsed document that passed the fatal checks.
#[derive(Debug)]
pub struct Site {
    pub tree: Tree,
    pub template: NodeId,
    /// Parser diagnostics plus site-level warnings, none fatal.
    pub diagnostics: Vec<Diagnostic>,
}

/// Read and parse the configuration document and locate its template.
pub fn load_site(config: &SiteConfig, root: &Path) -> Result<Site, BuildError> {
    let path = config.document_path(root);
    let source = fs::read_to_string(&path).map_err(|source| BuildError::Io {
        path: path.clone(),
        source,
    })?;
    let doc = parse(&config.document.display().to_string(), &source);
    if doc.is_fatal() {
        return Err(BuildError::Fatal {
            diagnostics: doc.diagnostics,
        });
    }

    let Document {
        tree,
        mut diagnostics,
    } = doc;
    let root_node = tree.root();
    let Some(template) = child_named(&tree, root_node, TEMPLATE_NODE) else {
        diagnostics.push(Diagnostic::error(
            tree.code_loc(root_node),
            format!("missing `{TEMPLATE_NODE}` node"),
        ));
        return Err(BuildError::Fatal { diagnostics });
    };
    for extra in tree
        .children(root_node)
        .filter(|&c| c != template && tree.string(c) == TEMPLATE_NODE)
    {
        diagnostics.push(Diagnostic::warning(
            tree.code_loc(extra),
            format!("duplicate `{TEMPLATE_NODE}` node; the first one is used"),
        ));
    }

    Ok(Site {
        tree,
        template,
        diagnostics,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostStatus {
    Written,
    /// The Markdown file could not be read; the page has empty `content`.
    WrittenWithoutSource,
    /// No `file` field; not publishable yet.
    Skipped,
    WriteFailed,
}

impl PostStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, PostStatus::Written | PostStatus::WrittenWithoutSource)
    }
}

/// What happened to one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReport {
    pub name: String,
    pub title: String,
    pub file: String,
    pub output: Option<PathBuf>,
    pub status: PostStatus,
    /// Unknown template variables and I/O warnings for this post.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Non-fatal diagnostics about the document itself.
    pub document_diagnostics: Vec<Diagnostic>,
    pub posts: Vec<PostReport>,
}

impl BuildReport {
    pub fn written(&self) -> impl Iterator<Item = &PostReport> {
        self.posts.iter().filter(|p| p.status.is_written())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PostReport> {
        self.posts
            .iter()
            .filter(|p| p.status == PostStatus::WriteFailed)
    }

    pub fn post_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.posts.iter().flat_map(|p| p.diagnostics.iter())
    }
}

/// Write `html` plus a trailing newline to `path`, replacing any existing file.
fn write_page(path: &Path, html: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(html.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn build_post(
    site: &Site,
    post: &PostRecord<'_>,
    config: &SiteConfig,
    root: &Path,
    output_dir: &Path,
) -> PostReport {
    let mut report = PostReport {
        name: post.name.to_string(),
        title: post.title.to_string(),
        file: post.file.to_string(),
        output: None,
        status: PostStatus::Skipped,
        diagnostics: Vec::new(),
    };
    if !post.is_publishable() {
        tracing::debug!(post = post.name, "no file, skipping");
        return report;
    }

    let output = post.output_path(output_dir);
    report.output = Some(output.clone());
    let loc = site.tree.code_loc(post.node);

    let markdown_path = root.join(post.file);
    let (source, status) = match fs::read_to_string(&markdown_path) {
        Ok(source) => (source, PostStatus::Written),
        Err(e) => {
            report.diagnostics.push(Diagnostic::warning(
                loc.clone(),
                format!("cannot read `{}`: {e}", post.file),
            ));
            (String::new(), PostStatus::WrittenWithoutSource)
        }
    };

    let content = markdown::to_html(&source, &config.markdown);
    let bindings = Bindings {
        title: post.title,
        description: post.description,
        content: &content,
        date: post.date,
    };
    let evaluation = template::evaluate(&site.tree, site.template, &bindings);
    let page = evaluation.render();
    report.diagnostics.extend(evaluation.diagnostics);

    match write_page(&output, &page) {
        Ok(()) => {
            tracing::debug!(post = post.name, output = %output.display(), bytes = page.len() + 1, "wrote page");
            report.status = status;
        }
        Err(e) => {
            report.status = PostStatus::WriteFailed;
            report.diagnostics.push(Diagnostic::warning(
                loc,
                format!("cannot write `{}`: {e}", output.display()),
            ));
        }
    }
    report
}

/// Run the whole pipeline for the site rooted at `root`.
pub fn build(config: &SiteConfig, root: &Path) -> Result<BuildReport, BuildError> {
    config.validate()?;
    let site = load_site(config, root)?;

    let output_dir = config.output_path(root);
    if config.create_output_dir {
        fs::create_dir_all(&output_dir).map_err(|source| BuildError::Io {
            path: output_dir.clone(),
            source,
        })?;
    }

    let posts: Vec<PostReport> = post::posts(&site.tree)
        .map(|post| build_post(&site, &post, config, root, &output_dir))
        .collect();
    tracing::info!(
        posts = posts.len(),
        written = posts.iter().filter(|p| p.status.is_written()).count(),
        "build finished"
    );

    Ok(BuildReport {
        document_diagnostics: site.diagnostics,
        posts,
    })
}

// ============================================================================
// Scan and check
// ============================================================================

/// One post as listed by `deskpress scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestPost {
    pub name: String,
    pub title: String,
    pub description: String,
    pub file: String,
    pub date: String,
    /// Page that `build` would write; absent for posts without a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Everything `build` would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub document: PathBuf,
    pub output_dir: PathBuf,
    pub posts: Vec<ManifestPost>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse the document and list its posts with their output paths.
pub fn scan(config: &SiteConfig, root: &Path) -> Result<Manifest, BuildError> {
    config.validate()?;
    let site = load_site(config, root)?;
    let posts = post::posts(&site.tree)
        .map(|p| ManifestPost {
            name: p.name.to_string(),
            title: p.title.to_string(),
            description: p.description.to_string(),
            file: p.file.to_string(),
            date: p.date.to_string(),
            output: p
                .is_publishable()
                .then(|| p.output_path(&config.output_dir)),
        })
        .collect();
    Ok(Manifest {
        document: config.document.clone(),
        output_dir: config.output_dir.clone(),
        posts,
        diagnostics: site.diagnostics,
    })
}

/// Validate the site without writing anything.
///
/// Reports document diagnostics, template identifiers no binding can
/// satisfy, posts whose Markdown file is missing, and posts that would
/// overwrite each other's page. Only I/O on the document itself is an `Err`.
pub fn check(config: &SiteConfig, root: &Path) -> Result<Vec<Diagnostic>, BuildError> {
    config.validate()?;
    let site = match load_site(config, root) {
        Ok(site) => site,
        Err(BuildError::Fatal { diagnostics }) => return Ok(diagnostics),
        Err(e) => return Err(e),
    };

    let mut diagnostics = site.diagnostics.clone();
    diagnostics.extend(template::unbound_identifiers(&site.tree, site.template));

    let mut outputs: Vec<(PathBuf, &str)> = Vec::new();
    for post in post::posts(&site.tree).filter(|p| p.is_publishable()) {
        let loc = site.tree.code_loc(post.node);
        if !root.join(post.file).is_file() {
            diagnostics.push(Diagnostic::error(
                loc.clone(),
                format!("post `{}` references missing file `{}`", post.name, post.file),
            ));
        }
        let output = post.output_path(&config.output_dir);
        if let Some((_, other)) = outputs.iter().find(|(o, _)| *o == output) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                loc,
                format!(
                    "post `{}` writes `{}`, already written by post `{}`",
                    post.name,
                    output.display(),
                    other
                ),
            ));
        }
        outputs.push((output, post.name));
    }
    Ok(diagnostics)
}
