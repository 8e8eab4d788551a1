mod common;

use axum::http::StatusCode;
use folio::db::models::Document;
use folio::db::repository::DocumentRepository;
use folio::service::cascade::CascadeMode;
use folio::service::documents::DeletePolicy;

fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter().map(|d| d.id.to_string()).collect()
}

#[tokio::test]
async fn create_then_sidebar_lists_it_once() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");

    let doc = env.create(&server, &token, "Untitled", None).await;
    assert!(!doc.is_archived);
    assert!(!doc.is_published);
    assert_eq!(doc.user_id, "user-1");

    let sidebar = env.list(&server, &token, "/api/v1/documents/sidebar").await;
    assert_eq!(ids(&sidebar), vec![doc.id.to_string()]);
}

#[tokio::test]
async fn sidebar_filters_by_parent() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");
    let [root, a, b, a1] = env.tree(&server, &token).await;

    let response = server
        .get("/api/v1/documents/sidebar")
        .add_query_param("parentDocument", root.id.as_str())
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let children: Vec<Document> = response.json();

    // newest first
    assert_eq!(ids(&children), vec![b.id.to_string(), a.id.to_string()]);
    assert!(!ids(&children).contains(&a1.id.to_string()));
}

#[tokio::test]
async fn archive_moves_subtree_to_trash() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");
    let [root, a, b, a1] = env.tree(&server, &token).await;

    let response = server
        .post(&format!("/api/v1/documents/{}/archive", root.id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert!(response.json::<Document>().is_archived);

    let mut trash = ids(&env.list(&server, &token, "/api/v1/documents/trash").await);
    trash.sort();
    let mut expected = ids(&[root, a, b, a1]);
    expected.sort();
    assert_eq!(trash, expected);

    assert!(env.list(&server, &token, "/api/v1/documents/search").await.is_empty());
    assert!(env.list(&server, &token, "/api/v1/documents/sidebar").await.is_empty());
}

#[tokio::test]
async fn background_archive_settles() {
    let env = common::TestEnv::with(CascadeMode::Background, DeletePolicy::Orphan);
    let server = env.server();
    let token = env.token("user-1");
    let [root, ..] = env.tree(&server, &token).await;

    server
        .post(&format!("/api/v1/documents/{}/archive", root.id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let mut trash = Vec::new();
    for _ in 0..50 {
        trash = env.list(&server, &token, "/api/v1/documents/trash").await;
        if trash.len() == 4 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(trash.len(), 4);
}

#[tokio::test]
async fn restore_under_archived_parent_detaches() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");
    let [root, a, _b, a1] = env.tree(&server, &token).await;

    server
        .post(&format!("/api/v1/documents/{}/archive", root.id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/documents/{}/restore", a.id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let restored: Document = response.json();
    assert!(!restored.is_archived);
    assert_eq!(restored.parent_document, None);

    let sidebar = env.list(&server, &token, "/api/v1/documents/sidebar").await;
    assert_eq!(ids(&sidebar), vec![a.id.to_string()]);

    let a1 = env.repo.get_by_id(&a1.id).await.unwrap().unwrap();
    assert!(!a1.is_archived);
    assert_eq!(a1.parent_document, Some(a.id.clone()));
}

#[tokio::test]
async fn remove_orphans_children() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");
    let [root, a, b, a1] = env.tree(&server, &token).await;

    server
        .delete(&format!("/api/v1/documents/{}", root.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(env.repo.get_by_id(&root.id).await.unwrap().is_none());
    assert_eq!(env.repo.len(), 3);

    assert!(env.list(&server, &token, "/api/v1/documents/sidebar").await.is_empty());
    let mut search = ids(&env.list(&server, &token, "/api/v1/documents/search").await);
    search.sort();
    let mut expected = ids(&[a, b, a1]);
    expected.sort();
    assert_eq!(search, expected);
}

#[tokio::test]
async fn remove_with_reject_policy_conflicts() {
    let env = common::TestEnv::with(CascadeMode::Awaited, DeletePolicy::Reject);
    let server = env.server();
    let token = env.token("user-1");
    let [root, ..] = env.tree(&server, &token).await;

    server
        .delete(&format!("/api/v1/documents/{}", root.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(env.repo.len(), 4);
}

#[tokio::test]
async fn remove_with_cascade_policy_deletes_subtree() {
    let env = common::TestEnv::with(CascadeMode::Awaited, DeletePolicy::Cascade);
    let server = env.server();
    let token = env.token("user-1");
    let [root, ..] = env.tree(&server, &token).await;

    server
        .delete(&format!("/api/v1/documents/{}", root.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(env.repo.is_empty());
}

#[tokio::test]
async fn mutations_on_missing_document_are_not_found() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");

    for path in [
        "/api/v1/documents/missing/archive",
        "/api/v1/documents/missing/restore",
    ] {
        server
            .post(path)
            .authorization_bearer(&token)
            .await
            .assert_status_not_found();
    }
    server
        .delete("/api/v1/documents/missing")
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn mutations_on_foreign_document_are_forbidden() {
    let env = common::TestEnv::start();
    let server = env.server();
    let owner = env.token("owner");
    let intruder = env.token("intruder");
    let doc = env.create(&server, &owner, "private", None).await;

    for action in ["archive", "restore"] {
        server
            .post(&format!("/api/v1/documents/{}/{}", doc.id, action))
            .authorization_bearer(&intruder)
            .await
            .assert_status_forbidden();
    }
    server
        .delete(&format!("/api/v1/documents/{}", doc.id))
        .authorization_bearer(&intruder)
        .await
        .assert_status_forbidden();

    let stored = env.repo.get_by_id(&doc.id).await.unwrap().unwrap();
    assert_eq!(stored, doc);
    assert!(env.list(&server, &intruder, "/api/v1/documents/search").await.is_empty());
}

#[tokio::test]
async fn create_with_invalid_body_is_bad_request() {
    let env = common::TestEnv::start();
    let server = env.server();
    let token = env.token("user-1");

    for body in [serde_json::json!({ "title": 5 }), serde_json::json!({})] {
        let response = server
            .post("/api/v1/documents")
            .authorization_bearer(&token)
            .json(&body)
            .await;
        response.assert_status_bad_request();

        let error: serde_json::Value = response.json();
        assert!(error["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }
    assert!(env.repo.is_empty());
}
