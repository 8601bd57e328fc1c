// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Currently implements:
// - Repository lookup (default branch, name, description)
// - Branch lookup (head commit's tree id)
// - Recursive tree listing in a single call
// - Blob content retrieval by the URL the tree listing hands out
//
// The pipeline logic that strings these calls together lives in extract/.
// =============================================================================

mod client;
mod types;

pub use client::{ApiError, GitHubClient};
pub use types::{BlobResponse, BranchResponse, RepositoryResponse, TreeEntry, TreeResponse};
