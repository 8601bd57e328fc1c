// src/pipeline.rs
// =============================================================================
// The single request/response entry point.
//
// What happens here:
// 1. Resolve the repository's tree (three sequential API calls)
// 2. Fetch the key files from it (bounded concurrent fan-out)
// 3. Optionally hand the result to a text generator
//
// Steps 1 and 2 share one deadline so an unresponsive API cannot hang the
// caller. Generation is not covered by it; it has its own request timeout.
// =============================================================================

use anyhow::Result;
use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::error::{PipelineError, ResolutionError};
use crate::extract::{
    fetch_key_files, resolve, FileFailure, KeyFilePatterns, KeyFileReport, RepositoryInfo,
    RepositoryRef,
};
use crate::generate::{GenerationContext, TextGenerator};
use crate::github::GitHubClient;

// What the presentation layer asks for
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub repository: RepositoryRef,
    pub guidance: String,
}

impl GenerateRequest {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self {
            repository: RepositoryRef::new(owner, name),
            guidance: guidance.into(),
        }
    }
}

// A finished extraction: the result plus what the caller may want to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub repository: RepositoryInfo,
    pub truncated: bool,
    pub report: KeyFileReport,
}

impl Extraction {
    pub fn failures(&self) -> &[FileFailure] {
        &self.report.failures
    }
}

pub struct Pipeline {
    client: GitHubClient,
    patterns: KeyFilePatterns,
    concurrency: usize,
    deadline: Duration,
}

impl Pipeline {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = GitHubClient::new(&config.api_base_url, config.token.clone(), config.request_timeout)?;

        let mut patterns = KeyFilePatterns::default();
        patterns.extend(config.extra_patterns.iter().cloned());

        if !client.has_token() {
            tracing::info!("no GitHub token configured; using the unauthenticated rate limit");
        }

        Ok(Self {
            client,
            patterns,
            concurrency: config.concurrency.max(1),
            deadline: config.deadline,
        })
    }

    /// Replaces the key-file set entirely
    pub fn with_patterns(mut self, patterns: KeyFilePatterns) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn patterns(&self) -> &KeyFilePatterns {
        &self.patterns
    }

    // Resolves the tree and fetches the key files under one deadline
    pub async fn extract(&self, repo: &RepositoryRef) -> Result<Extraction, ResolutionError> {
        let work = async {
            let tree = resolve(&self.client, repo).await?;
            let report = fetch_key_files(&self.client, &tree, &self.patterns, self.concurrency).await;
            Ok::<_, ResolutionError>(Extraction {
                repository: tree.repository,
                truncated: tree.truncated,
                report,
            })
        };

        match tokio::time::timeout(self.deadline, work).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(repo = %repo, deadline = ?self.deadline, "extraction timed out");
                Err(ResolutionError::Timeout(self.deadline))
            }
        }
    }

    // Runs extraction and then generation for one request
    pub async fn generate_document(
        &self,
        generator: &dyn TextGenerator,
        request: &GenerateRequest,
    ) -> Result<String, PipelineError> {
        let extraction = self.extract(&request.repository).await?;
        let context = GenerationContext::new(&extraction.repository, extraction.report.result);

        generator
            .generate(&context, &request.guidance)
            .await
            .map_err(PipelineError::Generation)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What does tokio::time::timeout do here?
//    - It races the whole resolve + fetch future against a timer
//    - When the timer wins the future is dropped, which cancels every
//      request still in flight
//
// 2. Why does generate_document take &dyn TextGenerator?
//    - The caller picks the model; tests pass a recording fake and the
//      CLI passes ChatCompletionsGenerator
//
// 3. Why is the guidance passed separately from the context?
//    - The context describes the repository; the guidance is whatever
//      the person asking wants, and it may be empty
// -----------------------------------------------------------------------------
