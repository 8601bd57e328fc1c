// src/error.rs
// =============================================================================
// Error types for the extraction pipeline.
//
// There are two tiers:
// - ResolutionError: the repository -> branch -> tree chain failed. Nothing
//   can be extracted without a tree, so these abort the whole pipeline.
// - FileFetchError: a single key file could not be fetched or decoded. These
//   never escape the fetcher; they end up in the diagnostics list instead.
//
// PipelineError wraps both the resolution tier and the text generator, and
// knows how to phrase itself for an end user.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

use crate::github::ApiError;

// Fatal errors raised while resolving a repository's tree
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The repository lookup returned 404 (missing, or private without a token)
    #[error("repository {owner}/{name} was not found")]
    RepositoryNotFound { owner: String, name: String },

    /// The default branch named by the repository could not be looked up
    #[error("branch '{branch}' was not found")]
    BranchNotFound { branch: String },

    /// The recursive tree listing failed or could not be decoded
    #[error("tree {sha} is unavailable: {reason}")]
    TreeUnavailable { sha: String, reason: String },

    /// Transport failure or unexpected status from the API
    #[error("GitHub API unavailable while fetching {stage}: {reason}")]
    UpstreamUnavailable { stage: &'static str, reason: String },

    /// The API answered, but not with the shape we expect
    #[error("malformed {stage} response: {reason}")]
    MalformedResponse { stage: &'static str, reason: String },

    /// The whole pipeline ran past its deadline
    #[error("extraction did not finish within {0:?}")]
    Timeout(Duration),
}

impl ResolutionError {
    /// True when the repository (or its branch) does not exist for this caller
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolutionError::RepositoryNotFound { .. } | ResolutionError::BranchNotFound { .. }
        )
    }
}

// Why a single key file was dropped from the result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileFetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed blob response: {0}")]
    Malformed(String),

    #[error("unsupported content encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("invalid base64 content: {0}")]
    InvalidBase64(String),

    #[error("content is not valid UTF-8")]
    InvalidUtf8,
}

impl From<ApiError> for FileFetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status(status) => FileFetchError::Status(status.as_u16()),
            ApiError::Transport(e) => FileFetchError::Transport(e.to_string()),
            ApiError::Malformed(reason) => FileFetchError::Malformed(reason),
        }
    }
}

// Everything the single request/response entry point can fail with
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("text generation failed: {0:#}")]
    Generation(anyhow::Error),
}

impl PipelineError {
    // The message shown to a person, without transport details
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Resolution(ResolutionError::RepositoryNotFound { owner, name }) => {
                format!(
                    "Repository {}/{} was not found. Make sure it exists and is public.",
                    owner, name
                )
            }
            PipelineError::Resolution(ResolutionError::BranchNotFound { branch }) => {
                format!("The default branch '{}' could not be found.", branch)
            }
            PipelineError::Resolution(ResolutionError::Timeout(_)) => {
                "GitHub took too long to respond. Please try again.".to_string()
            }
            PipelineError::Resolution(_) => {
                "GitHub is temporarily unavailable. Please try again later.".to_string()
            }
            PipelineError::Generation(_) => {
                "The document could not be generated. Please try again.".to_string()
            }
        }
    }
}
