// src/github/types.rs
// =============================================================================
// Response shapes for the four GitHub REST endpoints we call.
//
// Only the fields the pipeline reads are declared; serde ignores the rest.
// =============================================================================

use serde::Deserialize;

// GET /repos/{owner}/{repo}
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryResponse {
    pub default_branch: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// GET /repos/{owner}/{repo}/branches/{branch}
#[derive(Debug, Clone, Deserialize)]
pub struct BranchResponse {
    pub commit: BranchCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommit {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub tree: TreeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

// GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// "blob", "tree" or "commit" (submodule)
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

// GET {blob url}
#[derive(Debug, Clone, Deserialize)]
pub struct BlobResponse {
    pub content: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}
