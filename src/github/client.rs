// src/github/client.rs
// =============================================================================
// A small typed client for the GitHub REST API.
//
// Strategy:
// - One reqwest Client for every call (connection pooling)
// - The base URL is configurable so tests and GitHub Enterprise can point
//   it elsewhere
// - An optional token is sent as a bearer credential on every call to the
//   API's own origin; without one GitHub still answers, just with a lower
//   rate limit
// =============================================================================

use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::types::{BlobResponse, BranchResponse, RepositoryResponse, TreeResponse};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("repo-lens/", env!("CARGO_PKG_VERSION"));

// What went wrong with a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    // Creates a client for the API rooted at `base_url`
    //
    // Blank tokens are treated as no token at all.
    pub fn new(base_url: &str, token: Option<String>, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid API URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API URL cannot be used as a base: {}", base_url));
        }

        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryResponse, ApiError> {
        let url = self.endpoint(&["repos", owner, name]);
        self.get_json(url, &[]).await
    }

    pub async fn get_branch(&self, owner: &str, name: &str, branch: &str) -> Result<BranchResponse, ApiError> {
        let url = self.endpoint(&["repos", owner, name, "branches", branch]);
        self.get_json(url, &[]).await
    }

    // Lists the whole tree in one call; GitHub may truncate very large trees
    pub async fn get_tree_recursive(&self, owner: &str, name: &str, sha: &str) -> Result<TreeResponse, ApiError> {
        let url = self.endpoint(&["repos", owner, name, "git", "trees", sha]);
        self.get_json(url, &[("recursive", "1")]).await
    }

    // Fetches a blob by the absolute URL the tree listing gave us
    pub async fn get_blob(&self, content_url: &str) -> Result<BlobResponse, ApiError> {
        let url = Url::parse(content_url)
            .map_err(|e| ApiError::Malformed(format!("invalid content URL '{}': {}", content_url, e)))?;
        self.get_json(url, &[]).await
    }

    // Appends path segments to the base URL, escaping each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // The token only goes to the API's own scheme, host and port
    fn is_api_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GitHub API request");

        let send_token = self.is_api_origin(&url);
        let mut request = self.http.get(url).header(header::ACCEPT, GITHUB_ACCEPT);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token.as_ref().filter(|_| send_token) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why path_segments_mut instead of format!?
//    - Owner, repository and branch names are user data
//    - Pushing them as segments percent-encodes '/', '?' and '#', so a
//      branch like "feature/x" stays one segment
//
// 2. What does Url::origin() compare?
//    - Scheme, host and port together
//    - Blob URLs come from the tree response, so they are checked against
//      the configured base before the token is attached
//
// 3. Why read bytes() and then serde_json::from_slice?
//    - A body that is not JSON becomes ApiError::Malformed rather than a
//      transport error, so callers can tell the two apart
// -----------------------------------------------------------------------------
