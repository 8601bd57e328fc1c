// src/lib.rs
// =============================================================================
// repo-lens: pull the key files out of a GitHub repository and hand them to a
// text generator.
//
// Modules:
// - github: typed client for the GitHub REST API
// - extract: tree resolution and key-file fetching
// - generate: the text-generation collaborator
// - pipeline: one call that runs everything under a deadline
// - config / error: settings and error types shared by the above
// =============================================================================

pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod github;
pub mod pipeline;

pub use config::ExtractorConfig;
pub use error::{FileFetchError, PipelineError, ResolutionError};
pub use extract::{ExtractionResult, FetchedFile, KeyFilePatterns, RepositoryRef};
pub use pipeline::{Extraction, GenerateRequest, Pipeline};
