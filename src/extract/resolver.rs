// src/extract/resolver.rs
// =============================================================================
// Resolves a repository into its flat file tree.
//
// How it works:
// 1. Look up the repository to learn its default branch
// 2. Look up that branch to find the tree its head commit points at
// 3. List that tree recursively in one call
// 4. Project each entry into a TreeNode, keeping upstream order
//
// Each step needs the previous answer, so they run strictly in sequence and
// the first failure ends the chain. Exactly three requests are made no matter
// how big the repository is.
//
// Rust concepts:
// - map_err + ?: turn each call's ApiError into the right ResolutionError
//   and return early on the first failure
// - Moving out of owned responses: no clones of the listing are made
// =============================================================================

use reqwest::StatusCode;

use super::model::{ExtractionTree, NodeKind, RepositoryInfo, RepositoryRef, TreeNode};
use crate::error::ResolutionError;
use crate::github::{ApiError, GitHubClient, TreeEntry};

pub async fn resolve(client: &GitHubClient, repo: &RepositoryRef) -> Result<ExtractionTree, ResolutionError> {
    let metadata = client
        .get_repository(&repo.owner, &repo.name)
        .await
        .map_err(|e| match e {
            ApiError::Status(StatusCode::NOT_FOUND) => ResolutionError::RepositoryNotFound {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
            },
            other => upstream_error("repository", other),
        })?;

    let branch_name = metadata.default_branch;
    if branch_name.trim().is_empty() {
        return Err(ResolutionError::MalformedResponse {
            stage: "repository",
            reason: "empty default_branch".to_string(),
        });
    }
    tracing::debug!(repo = %repo, branch = %branch_name, "resolved default branch");

    let branch = client
        .get_branch(&repo.owner, &repo.name, &branch_name)
        .await
        .map_err(|e| match e {
            ApiError::Status(StatusCode::NOT_FOUND) => ResolutionError::BranchNotFound {
                branch: branch_name.clone(),
            },
            other => upstream_error("branch", other),
        })?;

    let tree_sha = branch.commit.commit.tree.sha;
    let listing = client
        .get_tree_recursive(&repo.owner, &repo.name, &tree_sha)
        .await
        .map_err(|e| ResolutionError::TreeUnavailable {
            sha: tree_sha.clone(),
            reason: e.to_string(),
        })?;

    if listing.truncated {
        tracing::warn!(
            repo = %repo,
            entries = listing.tree.len(),
            "GitHub truncated the tree listing; continuing with the partial tree"
        );
    }

    let nodes = project_nodes(listing.tree);
    tracing::info!(repo = %repo, branch = %branch_name, nodes = nodes.len(), "resolved repository tree");

    Ok(ExtractionTree {
        repository: RepositoryInfo {
            full_name: metadata.full_name.unwrap_or_else(|| repo.to_string()),
            description: metadata.description.filter(|d| !d.trim().is_empty()),
            default_branch: branch_name,
        },
        nodes,
        truncated: listing.truncated,
    })
}

// Classifies tree entries without reordering them
//
// Only entries typed "blob" that also carry a content URL count as blobs.
// Directories ("tree"), submodules ("commit") and URL-less entries are Other.
pub fn project_nodes(entries: Vec<TreeEntry>) -> Vec<TreeNode> {
    entries
        .into_iter()
        .map(|entry| {
            let kind = if entry.entry_type == "blob" && entry.url.is_some() {
                NodeKind::Blob
            } else {
                NodeKind::Other
            };
            TreeNode {
                path: entry.path,
                kind,
                content_url: entry.url,
            }
        })
        .collect()
}

// Maps a failed repository/branch call onto the resolution error tier
fn upstream_error(stage: &'static str, error: ApiError) -> ResolutionError {
    match error {
        ApiError::Malformed(reason) => ResolutionError::MalformedResponse { stage, reason },
        other => ResolutionError::UpstreamUnavailable {
            stage,
            reason: other.to_string(),
        },
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why match on StatusCode::NOT_FOUND separately?
//    - GitHub answers 404 both for missing repositories and for private
//      ones seen without a token, which the user should hear about
//    - Every other status (403 rate limit, 5xx) is a transient upstream
//      failure
//
// 2. Why is the tree error not split by status?
//    - By the time the tree is requested the repository and branch are
//      known to exist, so any failure there means the tree is unavailable
//
// 3. What happens on truncated = true?
//    - The listing is used as returned; only a warning is logged
// -----------------------------------------------------------------------------
