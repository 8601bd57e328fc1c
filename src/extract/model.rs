// src/extract/model.rs
// =============================================================================
// Data types that flow through the extraction pipeline.
//
//   RepositoryRef  --resolve-->  ExtractionTree  --fetch_key_files-->  KeyFileReport
//
// ExtractionTree is the flat listing of the default branch. KeyFileReport
// holds the caller-facing ExtractionResult plus a side list of files that
// were matched but could not be fetched.
// =============================================================================

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FileFetchError;

// Identifies a repository on the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Parses a repository reference
//
// Supported formats:
//   - owner/repo
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo/tree/main (anything after the repo is ignored)
impl FromStr for RepositoryRef {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.");

        let path = if let Some(rest) = trimmed.strip_prefix("github.com/") {
            rest
        } else if trimmed.contains("://") || trimmed.split('/').next().unwrap_or("").contains('.') {
            return Err(anyhow!("Not a GitHub repository: {}", input));
        } else {
            trimmed
        };

        let mut parts = path.split('/').filter(|part| !part.is_empty());
        let (owner, repo) = match (parts.next(), parts.next()) {
            (Some(owner), Some(repo)) => (owner, repo),
            _ => return Err(anyhow!("Expected owner/repo, got: {}", input)),
        };

        let repo = repo.trim_end_matches(".git");
        if repo.is_empty() {
            return Err(anyhow!("Expected owner/repo, got: {}", input));
        }

        Ok(RepositoryRef::new(owner, repo))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A file with fetchable content
    Blob,
    /// Directories, submodules and anything else without content
    Other,
}

// One entry of the recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
}

impl TreeNode {
    /// The content URL, if this node is a fetchable blob
    pub fn blob_url(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Blob => self.content_url.as_deref(),
            NodeKind::Other => None,
        }
    }
}

// Repository details captured while resolving, used as generation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
}

// Output of the tree resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTree {
    pub repository: RepositoryInfo,
    pub nodes: Vec<TreeNode>,
    /// Upstream cut the listing short; it is used as-is
    pub truncated: bool,
}

impl ExtractionTree {
    /// Every path in listing order, blobs and non-blobs alike
    pub fn paths(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.path.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFile {
    pub path: String,
    pub content: String,
}

// The value handed to the caller and on to the text generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub tree: Vec<String>,
    pub files: Vec<FetchedFile>,
}

// A matched key file that was dropped, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub reason: FileFetchError,
}

// Fetcher output: the result plus diagnostics that are never merged into it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFileReport {
    pub result: ExtractionResult,
    pub failures: Vec<FileFailure>,
}
