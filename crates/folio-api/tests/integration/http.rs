//! Integration tests for the HTTP binding.

use axum::http::{Method, StatusCode};

use crate::common::{TestCorpus, get, send};

#[tokio::test]
async fn test_health() {
    let corpus = TestCorpus::new().await;
    let (status, body) = get(corpus.app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "folio");
    assert_eq!(body["index"]["state"], "ready");
    assert_eq!(body["index"]["generation"], 1);
}

#[tokio::test]
async fn test_directory_defaults_to_root() {
    let corpus = TestCorpus::new().await;
    let (status, body) = get(corpus.app(), "/api/directory").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], ".");
    let names: Vec<_> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"README.md"));
    assert!(names.contains(&"technical"));
    assert!(names.contains(&"market"));

    let first = &body["files"][0];
    for field in ["name", "path", "is_directory", "size", "modified_time"] {
        assert!(first.get(field).is_some(), "missing {field}");
    }
}

#[tokio::test]
async fn test_directory_subdirectory_and_missing() {
    let corpus = TestCorpus::new().await;

    let (status, body) = get(corpus.app(), "/api/directory?path=technical").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "technical");
    assert_eq!(body["path"], "technical");

    let (status, body) = get(corpus.app(), "/api/directory?path=nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_content() {
    let corpus = TestCorpus::new().await;
    let (status, body) = get(corpus.app(), "/api/content?path=README.md").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Knowledge Base");
    assert_eq!(body["file_path"], "README.md");
    assert_eq!(body["frontmatter"]["title"], "Knowledge Base");
    assert_eq!(body["frontmatter"]["date"], "2025-07-24");
    assert!(body["html_content"].as_str().unwrap().contains("Knowledge Base"));
    assert!(body["raw_content"].as_str().unwrap().contains("# Knowledge Base"));
}

#[tokio::test]
async fn test_content_errors() {
    let corpus = TestCorpus::new().await;

    let (status, _) = get(corpus.app(), "/api/content?path=nonexistent.md").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(corpus.app(), "/api/content?path=../../../etc/passwd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(corpus.app(), "/api/content?path=technical").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(corpus.app(), "/api/content").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    corpus.write(".env", "SECRET_KEY=hunter2");
    let (status, body) = get(corpus.app(), "/api/content?path=.env").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.to_string().contains("hunter2"));

    std::fs::write(corpus.root().join("binary.md"), [0xff, 0x00, 0xfe]).unwrap();
    let (status, _) = get(corpus.app(), "/api/content?path=binary.md").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search() {
    let corpus = TestCorpus::new().await;
    let (status, body) = get(corpus.app(), "/api/search?q=technical").await;

    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().any(|h| h["path"].as_str().unwrap().contains("technical")));
    for hit in hits {
        for field in ["path", "title", "excerpt"] {
            assert!(hit[field].is_string(), "missing {field}");
        }
    }
}

#[tokio::test]
async fn test_search_empty_query_is_not_an_error() {
    let corpus = TestCorpus::new().await;
    for uri in ["/api/search?q=", "/api/search?q=%20%20", "/api/search"] {
        let (status, body) = get(corpus.app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, serde_json::json!([]));
    }
}

#[tokio::test]
async fn test_search_mode_and_limit() {
    let corpus = TestCorpus::new().await;

    let (_, body) = get(corpus.app(), "/api/search?q=market%20technical&mode=and").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = get(corpus.app(), "/api/search?q=research&limit=2").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reindex_endpoint() {
    let corpus = TestCorpus::new().await;
    corpus.write("new/page.md", "# Page\n\nwombat sightings");

    let (status, body) = send(corpus.app(), Method::POST, "/api/reindex").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 2);
    assert_eq!(body["documents_indexed"], 5);

    let (_, body) = get(corpus.app(), "/api/search?q=wombat").await;
    assert_eq!(body[0]["path"], "new/page.md");
}

#[tokio::test]
async fn test_unknown_route() {
    let corpus = TestCorpus::new().await;
    let (status, _) = get(corpus.app(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
