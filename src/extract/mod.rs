// src/extract/mod.rs
// =============================================================================
// The repository content extraction pipeline.
//
// Submodules:
// - model: data types passed between the stages
// - patterns: the fixed set of key-file paths
// - resolver: repository -> default branch -> tree listing
// - fetcher: concurrent fetch and decode of the matching key files
// =============================================================================

mod fetcher;
mod model;
mod patterns;
mod resolver;

pub use fetcher::{decode_content, fetch_key_files, select_key_files, DEFAULT_CONCURRENCY};
pub use model::{
    ExtractionResult, ExtractionTree, FetchedFile, FileFailure, KeyFileReport, NodeKind,
    RepositoryInfo, RepositoryRef, TreeNode,
};
pub use patterns::{KeyFilePatterns, DEFAULT_KEY_FILES};
pub use resolver::{project_nodes, resolve};
