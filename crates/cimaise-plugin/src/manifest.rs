//! Plugin manifest parsing.
//!
//! A bundle's entry file opens with a header comment block such as:
//!
//! ```text
//! /**
//!  * Plugin Name: Hello Cimaise
//!  * Description: Example plugin demonstrating the hook system
//!  * Version: 1.0.0
//!  * Author: Cimaise Team
//!  * License: MIT
//!  */
//! ```
//!
//! Keys are matched case-insensitively, first occurrence wins, and any
//! comment decoration before the key is ignored.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Metadata of a plugin bundle, re-derived on every discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Directory-derived identifier.
    pub slug: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub license: String,
}

fn header(key: &str) -> Regex {
    let pattern = format!(r"(?im)^[\s*#/;!-]*{}\s*:[ \t]*(.*?)[ \t]*(?:\*/)?[ \t]*\r?$", key);
    Regex::new(&pattern).expect("header pattern is a constant")
}

static NAME: LazyLock<Regex> = LazyLock::new(|| header("Plugin Name"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| header("Description"));
static VERSION: LazyLock<Regex> = LazyLock::new(|| header("Version"));
static AUTHOR: LazyLock<Regex> = LazyLock::new(|| header("Author"));
static LICENSE: LazyLock<Regex> = LazyLock::new(|| header("License"));

fn field(re: &Regex, content: &str) -> String {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse the header block of a bundle's entry file.
///
/// `Plugin Name` is required; every other key defaults to an empty string.
pub fn parse_manifest(slug: &str, content: &str) -> Result<PluginManifest, PluginError> {
    let name = field(&NAME, content);
    if name.is_empty() {
        return Err(PluginError::ManifestParse {
            path: slug.to_string(),
            message: "missing required header 'Plugin Name'".to_string(),
        });
    }

    Ok(PluginManifest {
        slug: slug.to_string(),
        name,
        version: field(&VERSION, content),
        description: field(&DESCRIPTION, content),
        author: field(&AUTHOR, content),
        license: field(&LICENSE, content),
    })
}

/// Read and parse an entry file from disk.
pub fn read_manifest(path: &Path, slug: &str) -> Result<PluginManifest, PluginError> {
    let content = std::fs::read_to_string(path).map_err(|e| PluginError::ManifestParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_manifest(slug, &content).map_err(|e| match e {
        PluginError::ManifestParse { message, .. } => PluginError::ManifestParse {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}
