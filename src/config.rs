//! Site configuration module.
//!
//! Handles loading and validating `deskpress.toml`. The file is optional:
//! without it, deskpress reads `posts.mdesk` and writes to `public/`, exactly
//! as if the stock file below were present.
//!
//! ## Config File Location
//!
//! Place `deskpress.toml` in the site root, next to the document:
//!
//! ```text
//! blog/
//! ├── deskpress.toml        # Optional
//! ├── posts.mdesk           # Posts and template
//! ├── posts/
//! │   └── hello.md
//! └── public/               # Output (must exist unless create_output_dir)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! document = "posts.mdesk"      # Configuration document, relative to the root
//! output_dir = "public"         # Where pages are written, relative to the root
//! create_output_dir = false     # Create output_dir if missing
//!
//! [markdown]
//! tables = true
//! strikethrough = true
//! collapse_whitespace = true
//! ```
//!
//! Config files are sparse; override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::markdown::MarkdownOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILE: &str = "deskpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `deskpress.toml`.
///
/// All fields have defaults matching the conventional layout. Unknown keys
/// are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Path of the configuration document, relative to the site root.
    pub document: PathBuf,
    /// Directory pages are written to, relative to the site root.
    pub output_dir: PathBuf,
    /// Create `output_dir` before writing instead of expecting it to exist.
    pub create_output_dir: bool,
    /// Markdown extensions.
    pub markdown: MarkdownOptions,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            document: PathBuf::from("posts.mdesk"),
            output_dir: PathBuf::from("public"),
            create_output_dir: false,
            markdown: MarkdownOptions::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document.as_os_str().is_empty() {
            return Err(ConfigError::Validation("document must not be empty".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(&self.document)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load `deskpress.toml` from the given directory.
///
/// Returns the defaults when the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `deskpress.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# deskpress configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# The document declaring posts and the page template, relative to this file.
document = "posts.mdesk"

# Where generated pages go. One <name>.html per post.
output_dir = "public"

# Create output_dir if it does not exist. When false, a missing directory
# makes every page write fail (reported per post).
create_output_dir = false

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# GitHub-style pipe tables.
tables = true

# ~~strikethrough~~
strikethrough = true

# Fold runs of whitespace in ordinary text into a single space.
collapse_whitespace = true
"##
}
