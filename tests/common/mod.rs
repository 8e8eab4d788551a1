#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;

use folio::app::{router, AppState};
use folio::auth::config::AuthConfig;
use folio::auth::jwt::{issue_token, JwtVerifier};
use folio::db::memory::InMemoryDocumentRepository;
use folio::db::models::Document;
use folio::service::cascade::CascadeMode;
use folio::service::documents::{DeletePolicy, DocumentService};

pub const TEST_SECRET: &str = "test-secret";

/// Router wired to an in-memory store, plus handles for inspecting it.
pub struct TestEnv {
    pub router: Router,
    pub repo: Arc<InMemoryDocumentRepository>,
    pub auth: AuthConfig,
}

impl TestEnv {
    /// Awaited cascade and orphaning delete, so assertions need no polling.
    pub fn start() -> Self {
        Self::with(CascadeMode::Awaited, DeletePolicy::Orphan)
    }

    pub fn with(cascade: CascadeMode, delete_policy: DeletePolicy) -> Self {
        let repo = Arc::new(InMemoryDocumentRepository::new());
        let auth = AuthConfig::new(TEST_SECRET);

        let documents = DocumentService::new(repo.clone())
            .with_cascade(cascade)
            .with_delete_policy(delete_policy);
        let state = AppState::new(documents, JwtVerifier::new(&auth));

        Self {
            router: router(state),
            repo,
            auth,
        }
    }

    /// Build an `axum_test::TestServer` that does not expect success by default.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// A valid bearer token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        issue_token(&self.auth, user_id, None, chrono::Duration::hours(1))
            .expect("Failed to sign test token")
    }

    /// Helper: create a document via the API.
    pub async fn create(
        &self,
        server: &axum_test::TestServer,
        token: &str,
        title: &str,
        parent: Option<&Document>,
    ) -> Document {
        let mut body = serde_json::json!({ "title": title });
        if let Some(parent) = parent {
            body["parentDocument"] = serde_json::json!(parent.id);
        }

        let response = server
            .post("/api/v1/documents")
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Document>()
    }

    /// Helper: root -> (a -> a1), b. Returns `[root, a, b, a1]`.
    pub async fn tree(&self, server: &axum_test::TestServer, token: &str) -> [Document; 4] {
        let root = self.create(server, token, "root", None).await;
        let a = self.create(server, token, "a", Some(&root)).await;
        let b = self.create(server, token, "b", Some(&root)).await;
        let a1 = self.create(server, token, "a1", Some(&a)).await;
        [root, a, b, a1]
    }

    pub async fn list(
        &self,
        server: &axum_test::TestServer,
        token: &str,
        path: &str,
    ) -> Vec<Document> {
        let response = server.get(path).authorization_bearer(token).await;
        response.assert_status_ok();
        response.json::<Vec<Document>>()
    }
}
