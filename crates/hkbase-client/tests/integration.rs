//! Integration tests against a live hkbase server.
//!
//! Skipped unless `HKBASE_INTEGRATION=1`. The server URL defaults to
//! `http://localhost:3000` and can be overridden with `HKBASE_URL`; the
//! auth token is read from `HKBASE_AUTH_TOKEN` as usual.

use hkbase_client::{EntityFilter, HkBase, HkBaseConfig, HkError, ImportOptions};
use hkbase_model::{ContentType, HkEntity, Node};
use std::collections::HashSet;

fn integration_enabled() -> bool {
    if std::env::var("HKBASE_INTEGRATION").is_err() {
        eprintln!("Skipping integration test; set HKBASE_INTEGRATION=1 to run");
        return false;
    }
    true
}

fn client() -> HkBase {
    let url =
        std::env::var("HKBASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    HkBase::new(HkBaseConfig::new(url)).unwrap()
}

fn ids(entities: &[HkEntity]) -> HashSet<String> {
    entities.iter().map(|e| e.id().to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn add_then_get_includes_added_entities() {
    if !integration_enabled() {
        return;
    }
    let base = client();
    let repo = base.delete_create_repository("it-add-get").await.unwrap();

    let nodes = vec![
        HkEntity::Node(Node::new("n1")),
        HkEntity::Node(Node::new("n2")),
    ];
    repo.add_entities(nodes.clone(), None).await.unwrap();
    // Idempotent on repeated add with the same ids.
    repo.add_entities(nodes, None).await.unwrap();

    let entities = repo.get_entities(EntityFilter::all()).await.unwrap();
    let ids = ids(&entities);
    assert!(ids.contains("n1"));
    assert!(ids.contains("n2"));

    base.delete_repository("it-add-get").await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delete_excludes_deleted_ids() {
    if !integration_enabled() {
        return;
    }
    let base = client();
    let repo = base.delete_create_repository("it-delete").await.unwrap();

    repo.add_entities(
        vec![
            HkEntity::Node(Node::new("keep")),
            HkEntity::Node(Node::new("drop")),
        ],
        None,
    )
    .await
    .unwrap();
    repo.delete_entities("drop", None).await.unwrap();

    let entities = repo.get_entities(EntityFilter::all()).await.unwrap();
    let ids = ids(&entities);
    assert!(ids.contains("keep"));
    assert!(!ids.contains("drop"));

    base.delete_repository("it-delete").await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn import_as_hk_matches_add_entities() {
    if !integration_enabled() {
        return;
    }
    let base = client();
    let repo = base.delete_create_repository("it-import").await.unwrap();

    let content = r#"[{"type": "node", "id": "imported"}]"#;
    let options = ImportOptions {
        as_hk: true,
        ..ImportOptions::default()
    };
    repo.import_data(content, ContentType::Json, &options)
        .await
        .unwrap();

    let entities = repo.get_entities(EntityFilter::all()).await.unwrap();
    assert!(ids(&entities).contains("imported"));

    base.delete_repository("it-import").await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clear_empties_the_repository() {
    if !integration_enabled() {
        return;
    }
    let base = client();
    let repo = base.delete_create_repository("it-clear").await.unwrap();

    repo.add_entities(
        vec![
            HkEntity::Node(Node::new("a")),
            HkEntity::Node(Node::new("b")),
        ],
        None,
    )
    .await
    .unwrap();
    repo.clear().await.unwrap();

    let entities = repo.get_entities(EntityFilter::all()).await.unwrap();
    assert!(entities.is_empty());

    base.delete_repository("it-clear").await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn connect_to_missing_repository_fails() {
    if !integration_enabled() {
        return;
    }
    let base = client();

    let err = base
        .connect_repository("it-does-not-exist")
        .await
        .unwrap_err();
    assert!(matches!(err, HkError::NotConnected(name) if name == "it-does-not-exist"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_server_errors_are_wrapped() {
    if !integration_enabled() {
        return;
    }
    // Nothing listens on this port; the network failure must surface as
    // the wrapped client error, not a panic or a server error.
    let base = HkBase::new(HkBaseConfig::new("http://localhost:59999")).unwrap();
    let err = base.list_repositories().await.unwrap_err();
    assert!(matches!(err, HkError::Client { .. }));
}
