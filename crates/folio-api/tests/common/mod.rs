//! Common test utilities for the content service integration tests.

use std::fs;
use std::path::Path;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use folio_api::{AppState, ContentService, ServiceConfig, router};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// A knowledge base on disk plus a service opened over it.
pub struct TestCorpus {
    /// Keeps the directory alive for the duration of the test.
    pub dir: TempDir,
    /// Service with its startup build complete.
    pub service: ContentService,
}

impl TestCorpus {
    /// Write the sample knowledge base and open a service over it.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        write_knowledge_base(dir.path());
        let service = ContentService::open(ServiceConfig::new(dir.path()))
            .await
            .expect("open service");
        Self { dir, service }
    }

    /// Root of the corpus on disk.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the corpus root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
    }

    /// Router over this corpus's service.
    pub fn app(&self) -> Router {
        router(AppState::new(
            self.service.clone(),
            CancellationToken::new(),
        ))
    }
}

/// Root README with frontmatter, two sections, one hidden file.
pub fn write_knowledge_base(root: &Path) {
    fs::write(
        root.join("README.md"),
        "---\ntitle: \"Knowledge Base\"\ndate: \"2025-07-24\"\n---\n\n# Knowledge Base\n\nWelcome to the knowledge base!\n\n## Sections\n\n- [Technical Research](./technical/README.md)\n- [Market Research](./market/README.md)\n",
    )
    .expect("write README");

    fs::create_dir(root.join("technical")).expect("mkdir technical");
    fs::write(
        root.join("technical/README.md"),
        "# Technical Research\n\nTechnical documentation goes here.",
    )
    .expect("write technical README");
    fs::write(
        root.join("technical/study1.md"),
        "# Study 1\n\nFirst technical study.",
    )
    .expect("write study1");

    fs::create_dir(root.join("market")).expect("mkdir market");
    fs::write(
        root.join("market/README.md"),
        "# Market Research\n\nMarket analysis goes here.",
    )
    .expect("write market README");

    fs::write(root.join("notes.txt"), "not a document").expect("write notes");
    fs::write(root.join(".draft.md"), "# Hidden\n\nsecret technical draft").expect("write draft");
}

/// Send one request and decode the JSON response.
pub async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

/// GET shorthand.
pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Method::GET, uri).await
}
