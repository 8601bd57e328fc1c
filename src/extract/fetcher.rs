// src/extract/fetcher.rs
// =============================================================================
// Fetches and decodes the key files found in a resolved tree.
//
// Key functionality:
// - Picks blobs whose path is exactly one of the key-file patterns
// - Fetches them concurrently, with a cap on requests in flight
// - Decodes GitHub's base64 bodies into UTF-8 text
// - Drops any file that fails, recording the reason on the side
//
// The batch as a whole never fails: a missing file only means less context
// for the generator, so one flaky request must not sink the others.
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()

use super::model::{ExtractionResult, ExtractionTree, FetchedFile, FileFailure, KeyFileReport};
use super::patterns::KeyFilePatterns;
use crate::error::FileFetchError;
use crate::github::GitHubClient;

pub const DEFAULT_CONCURRENCY: usize = 8;

// Fetches every key file in `tree`, at most `concurrency` at a time
//
// Files come back in tree order, not completion order, so two runs over the
// same repository produce identical results.
pub async fn fetch_key_files(
    client: &GitHubClient,
    tree: &ExtractionTree,
    patterns: &KeyFilePatterns,
    concurrency: usize,
) -> KeyFileReport {
    let selected = select_key_files(tree, patterns);
    tracing::debug!(matched = selected.len(), "fetching key files");

    // Each future owns its own (index, path, outcome) slot
    let fetches = selected.into_iter().map(|(index, path, url)| async move {
        let outcome = fetch_file(client, url).await;
        (index, path, outcome)
    });

    let mut outcomes: Vec<(usize, &str, Result<String, FileFetchError>)> = stream::iter(fetches)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for (_, path, outcome) in outcomes {
        match outcome {
            Ok(content) => files.push(FetchedFile {
                path: path.to_string(),
                content,
            }),
            Err(reason) => {
                tracing::warn!(path, error = %reason, "dropping key file");
                failures.push(FileFailure {
                    path: path.to_string(),
                    reason,
                });
            }
        }
    }

    tracing::info!(fetched = files.len(), dropped = failures.len(), "key files fetched");

    KeyFileReport {
        result: ExtractionResult {
            tree: tree.paths(),
            files,
        },
        failures,
    }
}

// Blobs whose path is a key file, with their tree index and content URL
pub fn select_key_files<'a>(
    tree: &'a ExtractionTree,
    patterns: &KeyFilePatterns,
) -> Vec<(usize, &'a str, &'a str)> {
    tree.nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| patterns.contains(&node.path))
        .filter_map(|(index, node)| node.blob_url().map(|url| (index, node.path.as_str(), url)))
        .collect()
}

async fn fetch_file(client: &GitHubClient, url: &str) -> Result<String, FileFetchError> {
    let blob = client.get_blob(url).await?;

    if !blob.encoding.eq_ignore_ascii_case("base64") {
        return Err(FileFetchError::UnsupportedEncoding(blob.encoding));
    }

    decode_content(&blob.content)
}

// Decodes a base64 blob body into text
//
// GitHub wraps the base64 at 60 columns, so whitespace is stripped first.
// Bytes that are not valid UTF-8 are a decode failure like any other.
pub fn decode_content(encoded: &str) -> Result<String, FileFetchError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| FileFetchError::InvalidBase64(e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| FileFetchError::InvalidUtf8)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why buffer_unordered and then sort?
//    - buffer_unordered(N) keeps at most N requests in flight and yields
//      results as they finish, which is fast but nondeterministic
//    - Sorting by the tree index afterwards restores a stable order
//
// 2. Why do the futures borrow instead of clone?
//    - The stream is driven to completion inside this function, so the
//      borrowed client and tree outlive every future
//    - No task is spawned, so nothing needs to be 'static
// -----------------------------------------------------------------------------
