//! Integration tests for `ContentService` operations.

use folio_api::{ContentService, ServiceConfig};
use folio_core::{Error, IndexState};
use folio_fts::{QueryMode, SearchParams};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::common::TestCorpus;

#[tokio::test]
async fn test_list_root_directory() {
    let corpus = TestCorpus::new().await;
    let listing = corpus.service.list_directory(".").unwrap();

    assert_eq!(listing.name, ".");
    assert_eq!(listing.path, ".");
    let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["market", "technical", "README.md"]);
}

#[tokio::test]
async fn test_list_subdirectory() {
    let corpus = TestCorpus::new().await;
    let listing = corpus.service.list_directory("technical").unwrap();

    assert_eq!(listing.name, "technical");
    assert_eq!(listing.path, "technical");
    let paths: Vec<_> = listing.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["technical/README.md", "technical/study1.md"]);
    assert!(listing.entries.iter().all(|e| !e.is_directory && e.size > 0));
}

#[tokio::test]
async fn test_list_rejects_missing_file_and_traversal() {
    let corpus = TestCorpus::new().await;
    for path in ["nonexistent", "README.md", "../", "technical/../../etc"] {
        let err = corpus.service.list_directory(path).unwrap_err();
        assert!(err.is_not_found(), "{path}: {err}");
    }
}

#[tokio::test]
async fn test_get_document_with_frontmatter() {
    let corpus = TestCorpus::new().await;
    let doc = corpus.service.get_document("README.md").unwrap();

    assert_eq!(doc.title, "Knowledge Base");
    assert_eq!(doc.file_path, "README.md");
    assert!(doc.html_content.contains("Knowledge Base"));
    assert!(doc.html_content.contains("/api/content?path=technical/README.md"));
    assert!(!doc.raw_content.contains("date:"));
    assert!(doc.frontmatter.contains_key("date"));
}

#[tokio::test]
async fn test_get_document_in_subdirectory() {
    let corpus = TestCorpus::new().await;
    let doc = corpus.service.get_document("technical/study1.md").unwrap();
    assert_eq!(doc.title, "Study 1");
    assert_eq!(doc.file_path, "technical/study1.md");
    assert!(doc.html_content.contains("First technical study"));
}

#[tokio::test]
async fn test_get_document_errors() {
    let corpus = TestCorpus::new().await;
    for path in ["nonexistent.md", "technical", "../../../etc/passwd", "/etc/passwd"] {
        let err = corpus.service.get_document(path).unwrap_err();
        assert!(err.is_not_found(), "{path}: {err}");
    }

    std::fs::write(corpus.root().join("binary.md"), [0xc3, 0x28]).unwrap();
    assert!(matches!(
        corpus.service.get_document("binary.md"),
        Err(Error::InvalidDocument { .. })
    ));
}

#[tokio::test]
async fn test_hidden_and_non_document_paths_are_not_served() {
    let corpus = TestCorpus::new().await;
    corpus.write(".env", "SECRET_KEY=hunter2");
    corpus.write(".git/config", "[remote]\nurl=x");

    for path in [".env", ".git/config", ".draft.md", "notes.txt"] {
        let err = corpus.service.get_document(path).unwrap_err();
        assert!(err.is_not_found(), "{path}: {err}");
    }
    assert!(corpus.service.list_directory(".git").unwrap_err().is_not_found());

    let names: Vec<_> = corpus
        .service
        .list_directory(".")
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(!names.iter().any(|n| n.starts_with('.')));
}

#[tokio::test]
async fn test_get_document_reads_live_tree() {
    let corpus = TestCorpus::new().await;
    corpus.write("fresh.md", "# Fresh\n\nadded after startup");
    let doc = corpus.service.get_document("fresh.md").unwrap();
    assert_eq!(doc.title, "Fresh");
}

#[tokio::test]
async fn test_search_finds_documents() {
    let corpus = TestCorpus::new().await;
    let hits = corpus.service.search("technical");

    let paths: Vec<_> = hits.iter().map(|h| h.path.as_str()).collect();
    assert!(paths.contains(&"technical/README.md"));
    assert!(paths.contains(&"technical/study1.md"));
    assert!(!paths.iter().any(|p| p.contains("draft")));
    for hit in &hits {
        assert!(hit.excerpt.to_lowercase().contains("technical"));
    }
}

#[tokio::test]
async fn test_search_empty_query() {
    let corpus = TestCorpus::new().await;
    assert!(corpus.service.search("").is_empty());
    assert!(corpus.service.search("   ").is_empty());
}

#[tokio::test]
async fn test_search_and_mode() {
    let corpus = TestCorpus::new().await;
    let or_hits = corpus.service.search("market technical");
    let and_hits = corpus
        .service
        .search_with(&SearchParams::new("market technical").with_mode(QueryMode::And));

    assert!(or_hits.len() > and_hits.len());
    // The root README links to both sections.
    let paths: Vec<_> = and_hits.iter().map(|h| h.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md"]);
}

#[tokio::test]
async fn test_reindex_picks_up_changes() {
    let corpus = TestCorpus::new().await;
    assert!(corpus.service.search("zeppelin").is_empty());

    corpus.write("market/airships.md", "# Airships\n\nZeppelin market outlook.");
    std::fs::remove_file(corpus.root().join("technical/study1.md")).unwrap();

    let stats = corpus
        .service
        .reindex(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.generation, 2);
    assert_eq!(stats.documents_indexed, 4);
    assert_eq!(corpus.service.search("zeppelin")[0].path, "market/airships.md");
    assert!(corpus.service.search("study").is_empty());
}

#[tokio::test]
async fn test_unreadable_document_is_skipped_not_fatal() {
    let corpus = TestCorpus::new().await;
    std::fs::write(corpus.root().join("broken.md"), [0xff, 0xfe, 0xfd]).unwrap();

    let stats = corpus
        .service
        .reindex(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.documents_indexed, 4);
}

#[tokio::test]
async fn test_malformed_frontmatter_still_indexed() {
    let corpus = TestCorpus::new().await;
    let raw = "---\ntitle: Broken\n\nunterminated quokka notes";
    corpus.write("broken-meta.md", raw);
    corpus
        .service
        .reindex(&CancellationToken::new())
        .await
        .unwrap();

    let doc = corpus.service.get_document("broken-meta.md").unwrap();
    assert!(doc.frontmatter.is_empty());
    assert_eq!(doc.raw_content, raw);
    assert_eq!(corpus.service.search("quokka")[0].path, "broken-meta.md");
    assert!(corpus.service.get_document("README.md").is_ok());
}

#[tokio::test]
async fn test_concurrent_reindex_and_search() {
    let corpus = TestCorpus::new().await;
    let service = corpus.service.clone();

    let writer = {
        let service = service.clone();
        tokio::spawn(async move {
            for _ in 0..5 {
                service.reindex(&CancellationToken::new()).await.unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                let mut last_generation = 0;
                for _ in 0..50 {
                    let generation = service.snapshot().generation();
                    assert!(generation >= last_generation);
                    last_generation = generation;
                    // Every generation holds the same three "research" documents.
                    assert_eq!(service.search("research").len(), 3);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(service.snapshot().generation(), 6);
}

#[tokio::test]
async fn test_reindex_is_serialized() {
    let corpus = TestCorpus::new().await;
    let service = corpus.service.clone();

    let runs: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.reindex(&CancellationToken::new()).await.unwrap() })
        })
        .collect();

    let mut generations = Vec::new();
    for run in runs {
        generations.push(run.await.unwrap().generation);
    }
    generations.sort_unstable();
    assert_eq!(generations, vec![2, 3, 4, 5]);
    assert_eq!(service.snapshot().generation(), 5);
}

#[tokio::test]
async fn test_index_handle_observes_lifecycle() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("one.md"), "# One").unwrap();

    let service = ContentService::new(ServiceConfig::new(dir.path())).unwrap();
    assert_eq!(service.index_handle().state(), IndexState::Empty);

    let handle = service.index_handle().clone();
    let waiter = tokio::spawn(async move {
        handle
            .wait_ready(std::time::Duration::from_secs(5))
            .await
    });

    service.reindex(&CancellationToken::new()).await.unwrap();
    assert_eq!(waiter.await.unwrap(), Ok((1, 1)));
}
