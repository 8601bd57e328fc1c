// tests/extraction.rs
// =============================================================================
// End-to-end extraction against a local mock of the GitHub API.
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::io::Write;
use std::time::{Duration, Instant};

use repo_lens::extract::KeyFilePatterns;
use repo_lens::{ExtractorConfig, FileFetchError, Pipeline, RepositoryRef, ResolutionError};

const PACKAGE_JSON: &str = "{\n  \"name\": \"widget\",\n  \"version\": \"1.0.0\"\n}\n";
const INDEX_TS: &str = "export const greet = (name: string) => `héllo ${name}`;\n";

fn pipeline(server: &ServerGuard) -> Pipeline {
    let config = ExtractorConfig {
        api_base_url: server.url(),
        ..ExtractorConfig::default()
    };
    Pipeline::new(&config)
        .unwrap()
        .with_patterns(KeyFilePatterns::from_paths(["package.json", "src/index.ts"]))
}

fn widget() -> RepositoryRef {
    RepositoryRef::new("acme", "widget")
}

async fn mock_json(server: &mut ServerGuard, path: &str, status: usize, body: String) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_repository(server: &mut ServerGuard) -> Mock {
    let body = json!({
        "full_name": "acme/widget",
        "description": "Widgets for everyone",
        "default_branch": "main"
    });
    mock_json(server, "/repos/acme/widget", 200, body.to_string()).await
}

async fn mock_branch(server: &mut ServerGuard) -> Mock {
    let body = json!({
        "name": "main",
        "commit": { "sha": "c0ffee", "commit": { "tree": { "sha": "tree-sha" } } }
    });
    mock_json(server, "/repos/acme/widget/branches/main", 200, body.to_string()).await
}

// package.json, src/index.ts, node_modules/x.js and docs/
async fn mock_tree(server: &mut ServerGuard, truncated: bool) -> Mock {
    let blob = |sha: &str| format!("{}/repos/acme/widget/git/blobs/{}", server.url(), sha);
    let body = json!({
        "sha": "tree-sha",
        "truncated": truncated,
        "tree": [
            { "path": "package.json", "type": "blob", "url": blob("pkg") },
            { "path": "src/index.ts", "type": "blob", "url": blob("idx") },
            { "path": "node_modules/x.js", "type": "blob", "url": blob("nm") },
            { "path": "docs", "type": "tree", "url": format!("{}/repos/acme/widget/git/trees/docs", server.url()) }
        ]
    });

    server
        .mock("GET", "/repos/acme/widget/git/trees/tree-sha")
        .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_blob(server: &mut ServerGuard, sha: &str, content: &str) -> Mock {
    let body = json!({ "sha": sha, "encoding": "base64", "content": STANDARD.encode(content) });
    mock_json(server, &format!("/repos/acme/widget/git/blobs/{}", sha), 200, body.to_string()).await
}

#[tokio::test]
async fn test_example_repository_extraction() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, false).await;
    let pkg = mock_blob(&mut server, "pkg", PACKAGE_JSON).await;
    let idx = mock_blob(&mut server, "idx", INDEX_TS).await;
    let node_modules = server
        .mock("GET", "/repos/acme/widget/git/blobs/nm")
        .expect(0)
        .create_async()
        .await;

    let extraction = pipeline(&server).extract(&widget()).await.unwrap();
    let result = &extraction.report.result;

    assert_eq!(
        result.tree,
        vec!["package.json", "src/index.ts", "node_modules/x.js", "docs"]
    );
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.files[0].path, "package.json");
    assert_eq!(result.files[0].content, PACKAGE_JSON);
    assert_eq!(result.files[1].path, "src/index.ts");
    assert_eq!(result.files[1].content, INDEX_TS);
    assert!(extraction.failures().is_empty());

    assert_eq!(extraction.repository.full_name, "acme/widget");
    assert_eq!(extraction.repository.description.as_deref(), Some("Widgets for everyone"));
    assert_eq!(extraction.repository.default_branch, "main");
    assert!(!extraction.truncated);

    pkg.assert_async().await;
    idx.assert_async().await;
    node_modules.assert_async().await;
}

#[tokio::test]
async fn test_one_failed_file_is_dropped_not_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, false).await;
    let _pkg = mock_blob(&mut server, "pkg", PACKAGE_JSON).await;
    let _idx = mock_json(
        &mut server,
        "/repos/acme/widget/git/blobs/idx",
        500,
        json!({ "message": "boom" }).to_string(),
    )
    .await;

    let extraction = pipeline(&server).extract(&widget()).await.unwrap();
    let result = &extraction.report.result;

    // The failed path stays in the tree, only the file is missing
    assert_eq!(result.tree.len(), 4);
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].path, "package.json");

    assert_eq!(extraction.failures().len(), 1);
    assert_eq!(extraction.failures()[0].path, "src/index.ts");
    assert_eq!(extraction.failures()[0].reason, FileFetchError::Status(500));
}

#[tokio::test]
async fn test_invalid_utf8_is_dropped_like_any_failure() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, false).await;
    let _pkg = mock_blob(&mut server, "pkg", PACKAGE_JSON).await;
    let binary = json!({ "encoding": "base64", "content": STANDARD.encode([0xffu8, 0xfe, 0xfd]) });
    let _idx = mock_json(&mut server, "/repos/acme/widget/git/blobs/idx", 200, binary.to_string()).await;

    let extraction = pipeline(&server).extract(&widget()).await.unwrap();

    assert_eq!(extraction.report.result.files.len(), 1);
    assert_eq!(extraction.failures()[0].reason, FileFetchError::InvalidUtf8);
}

#[tokio::test]
async fn test_malformed_blob_body_is_dropped() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, false).await;
    let _pkg = mock_json(&mut server, "/repos/acme/widget/git/blobs/pkg", 200, "not json".to_string()).await;
    let _idx = mock_blob(&mut server, "idx", INDEX_TS).await;

    let extraction = pipeline(&server).extract(&widget()).await.unwrap();

    let paths: Vec<&str> = extraction.report.result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/index.ts"]);
    assert!(matches!(
        extraction.failures()[0].reason,
        FileFetchError::Malformed(_)
    ));
}

#[tokio::test]
async fn test_missing_repository_makes_no_further_calls() {
    let mut server = mockito::Server::new_async().await;
    let repo = mock_json(
        &mut server,
        "/repos/acme/widget",
        404,
        json!({ "message": "Not Found" }).to_string(),
    )
    .await;
    let branch = server
        .mock("GET", Matcher::Regex("^/repos/acme/widget/.+".to_string()))
        .expect(0)
        .create_async()
        .await;

    let error = pipeline(&server).extract(&widget()).await.unwrap_err();

    match error {
        ResolutionError::RepositoryNotFound { owner, name } => {
            assert_eq!(owner, "acme");
            assert_eq!(name, "widget");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    repo.assert_async().await;
    branch.assert_async().await;
}

#[tokio::test]
async fn test_missing_branch() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_json(&mut server, "/repos/acme/widget/branches/main", 404, "{}".to_string()).await;

    let error = pipeline(&server).extract(&widget()).await.unwrap_err();
    assert!(matches!(error, ResolutionError::BranchNotFound { ref branch } if branch == "main"));
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_tree_failure_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = server
        .mock("GET", "/repos/acme/widget/git/trees/tree-sha")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let error = pipeline(&server).extract(&widget()).await.unwrap_err();
    assert!(matches!(error, ResolutionError::TreeUnavailable { ref sha, .. } if sha == "tree-sha"));
}

#[tokio::test]
async fn test_malformed_repository_response() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_json(&mut server, "/repos/acme/widget", 200, json!({ "id": 1 }).to_string()).await;

    let error = pipeline(&server).extract(&widget()).await.unwrap_err();
    assert!(matches!(
        error,
        ResolutionError::MalformedResponse { stage: "repository", .. }
    ));
    assert!(!error.is_not_found());
}

#[tokio::test]
async fn test_rate_limited_repository_is_upstream_failure() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_json(
        &mut server,
        "/repos/acme/widget",
        403,
        json!({ "message": "API rate limit exceeded" }).to_string(),
    )
    .await;

    let error = pipeline(&server).extract(&widget()).await.unwrap_err();
    assert!(matches!(
        error,
        ResolutionError::UpstreamUnavailable { stage: "repository", .. }
    ));
}

#[tokio::test]
async fn test_repeated_extraction_is_identical() {
    let mut server = mockito::Server::new_async().await;
    let repo = server
        .mock("GET", "/repos/acme/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "full_name": "acme/widget", "default_branch": "main" }).to_string())
        .expect(2)
        .create_async()
        .await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, false).await;
    let _pkg = mock_blob(&mut server, "pkg", PACKAGE_JSON).await;
    let _idx = mock_blob(&mut server, "idx", INDEX_TS).await;

    let pipeline = pipeline(&server);
    let first = pipeline.extract(&widget()).await.unwrap();
    let second = pipeline.extract(&widget()).await.unwrap();

    assert_eq!(first.report.result, second.report.result);
    repo.assert_async().await;
}

#[tokio::test]
async fn test_token_is_sent_on_every_call() {
    let mut server = mockito::Server::new_async().await;
    let config = ExtractorConfig {
        api_base_url: server.url(),
        token: Some("secret".to_string()),
        ..ExtractorConfig::default()
    };
    let pipeline = Pipeline::new(&config)
        .unwrap()
        .with_patterns(KeyFilePatterns::from_paths(["package.json"]));

    let authorized = server
        .mock("GET", Matcher::Any)
        .match_header("authorization", "Bearer secret")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let error = pipeline.extract(&widget()).await.unwrap_err();
    assert!(error.is_not_found());
    authorized.assert_async().await;
}

#[tokio::test]
async fn test_truncated_tree_is_accepted() {
    let mut server = mockito::Server::new_async().await;
    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = mock_tree(&mut server, true).await;
    let _pkg = mock_blob(&mut server, "pkg", PACKAGE_JSON).await;
    let _idx = mock_blob(&mut server, "idx", INDEX_TS).await;

    let extraction = pipeline(&server).extract(&widget()).await.unwrap();
    assert!(extraction.truncated);
    assert_eq!(extraction.report.result.tree.len(), 4);
    assert_eq!(extraction.report.result.files.len(), 2);
}

#[tokio::test]
async fn test_unresponsive_upstream_hits_deadline() {
    // Accepts connections at the OS level but never answers
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = ExtractorConfig {
        api_base_url: format!("http://{}", listener.local_addr().unwrap()),
        deadline: Duration::from_millis(200),
        ..ExtractorConfig::default()
    };

    let error = Pipeline::new(&config).unwrap().extract(&widget()).await.unwrap_err();
    assert!(matches!(error, ResolutionError::Timeout(d) if d == Duration::from_millis(200)));
    drop(listener);
}

// Three key files whose blobs answer slower the earlier they sit in the tree
async fn mock_staggered_repository(server: &mut ServerGuard) -> Vec<Mock> {
    let blob = |sha: &str| format!("{}/repos/acme/widget/git/blobs/{}", server.url(), sha);
    let tree = json!({
        "tree": [
            { "path": "a.toml", "type": "blob", "url": blob("a") },
            { "path": "b.toml", "type": "blob", "url": blob("b") },
            { "path": "c.toml", "type": "blob", "url": blob("c") }
        ]
    });

    let mut mocks = vec![
        mock_repository(server).await,
        mock_branch(server).await,
        server
            .mock("GET", "/repos/acme/widget/git/trees/tree-sha")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(tree.to_string())
            .create_async()
            .await,
    ];

    for (sha, delay_ms) in [("a", 800u64), ("b", 400), ("c", 0)] {
        let body = json!({ "encoding": "base64", "content": STANDARD.encode(sha) }).to_string();
        mocks.push(
            server
                .mock("GET", format!("/repos/acme/widget/git/blobs/{}", sha).as_str())
                .with_status(200)
                .with_chunked_body(move |w| {
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    w.write_all(body.as_bytes())
                })
                .create_async()
                .await,
        );
    }
    mocks
}

fn staggered_pipeline(server: &ServerGuard, concurrency: usize) -> Pipeline {
    let config = ExtractorConfig {
        api_base_url: server.url(),
        concurrency,
        ..ExtractorConfig::default()
    };
    Pipeline::new(&config)
        .unwrap()
        .with_patterns(KeyFilePatterns::from_paths(["a.toml", "b.toml", "c.toml"]))
}

#[tokio::test]
async fn test_key_files_fetch_concurrently_in_tree_order() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_staggered_repository(&mut server).await;

    let started = Instant::now();
    let extraction = staggered_pipeline(&server, 8).extract(&widget()).await.unwrap();
    let elapsed = started.elapsed();

    // c finishes first and a last, but files follow the tree
    let files: Vec<(&str, &str)> = extraction
        .report
        .result
        .files
        .iter()
        .map(|f| (f.path.as_str(), f.content.as_str()))
        .collect();
    assert_eq!(files, vec![("a.toml", "a"), ("b.toml", "b"), ("c.toml", "c")]);

    // Overlapping requests take about the slowest delay, not the 1200ms sum
    assert!(elapsed >= Duration::from_millis(800), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1150), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_concurrency_of_one_serializes_fetches() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_staggered_repository(&mut server).await;

    let started = Instant::now();
    let extraction = staggered_pipeline(&server, 1).extract(&widget()).await.unwrap();
    let elapsed = started.elapsed();

    let paths: Vec<&str> = extraction.report.result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["a.toml", "b.toml", "c.toml"]);
    assert!(elapsed >= Duration::from_millis(1200), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_token_stays_on_api_origin() {
    let mut server = mockito::Server::new_async().await;
    let mut elsewhere = mockito::Server::new_async().await;

    let tree = json!({
        "tree": [
            { "path": "package.json", "type": "blob", "url": format!("{}/repos/acme/widget/git/blobs/pkg", server.url()) },
            { "path": "src/index.ts", "type": "blob", "url": format!("{}/blobs/idx", elsewhere.url()) }
        ]
    });

    let _repo = mock_repository(&mut server).await;
    let _branch = mock_branch(&mut server).await;
    let _tree = server
        .mock("GET", "/repos/acme/widget/git/trees/tree-sha")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(tree.to_string())
        .create_async()
        .await;
    let same_origin = server
        .mock("GET", "/repos/acme/widget/git/blobs/pkg")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body(json!({ "encoding": "base64", "content": STANDARD.encode(PACKAGE_JSON) }).to_string())
        .expect(1)
        .create_async()
        .await;
    let other_origin = elsewhere
        .mock("GET", "/blobs/idx")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(json!({ "encoding": "base64", "content": STANDARD.encode(INDEX_TS) }).to_string())
        .expect(1)
        .create_async()
        .await;

    let config = ExtractorConfig {
        api_base_url: server.url(),
        token: Some("secret".to_string()),
        ..ExtractorConfig::default()
    };
    let pipeline = Pipeline::new(&config)
        .unwrap()
        .with_patterns(KeyFilePatterns::from_paths(["package.json", "src/index.ts"]));

    let extraction = pipeline.extract(&widget()).await.unwrap();

    assert_eq!(extraction.report.result.files.len(), 2);
    same_origin.assert_async().await;
    other_origin.assert_async().await;
}
