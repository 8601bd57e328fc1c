// src/generate/mod.rs
// =============================================================================
// The text-generation collaborator.
//
// The pipeline does not care how the document is written; it hands a
// GenerationContext plus the caller's guidance to anything implementing
// TextGenerator. ChatCompletionsGenerator is the implementation the CLI uses.
// =============================================================================

mod openai;
mod prompt;

use anyhow::Result;
use async_trait::async_trait;

use crate::extract::{ExtractionResult, RepositoryInfo};

pub use openai::{ChatCompletionsGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompt::{render_user_prompt, SYSTEM_PROMPT};

// Everything the generator is told about the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub repository_name: String,
    pub description: Option<String>,
    pub extraction: ExtractionResult,
}

impl GenerationContext {
    pub fn new(repository: &RepositoryInfo, extraction: ExtractionResult) -> Self {
        Self {
            repository_name: repository.full_name.clone(),
            description: repository.description.clone(),
            extraction,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produces the document text for `context`, steered by free-form `guidance`
    async fn generate(&self, context: &GenerationContext, guidance: &str) -> Result<String>;
}
