//! Shared test helpers for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use docvault_api::build_state;
use docvault_auth::JwtEncoder;
use docvault_core::config::{AppConfig, DatabaseConfig};
use docvault_database::DatabasePool;
use docvault_database::migration::run_migrations;
use docvault_database::repositories::PrincipalRepository;
use docvault_entity::principal::{CreatePrincipal, Principal};
use docvault_storage::MemoryBlobStore;

const BOUNDARY: &str = "docvault-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    principals: PrincipalRepository,
    tokens: Arc<JwtEncoder>,
    _dir: tempfile::TempDir,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// The body as JSON, or `Null` when it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestApp {
    /// Create a new test application over a fresh database
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: format!("sqlite://{}/api.db", dir.path().display()),
            ..DatabaseConfig::default()
        };
        config.auth.jwt_secret = "test-secret".to_string();

        let db = DatabasePool::connect(&config.database).await.expect("connect");
        run_migrations(db.pool()).await.expect("migrate");
        let pool = db.into_pool();

        let state = build_state(config.clone(), pool.clone(), Arc::new(MemoryBlobStore::new()));
        let tokens = Arc::clone(&state.jwt_encoder);
        Self {
            router: docvault_api::build_app(state),
            tokens,
            config,
            principals: PrincipalRepository::new(pool),
            _dir: dir,
        }
    }

    /// Register a principal and return a bearer token for it
    pub async fn user(&self, email: &str) -> (Principal, String) {
        let principal = self
            .principals
            .create(&CreatePrincipal {
                email: email.to_string(),
                display_name: email.to_string(),
                is_staff: false,
            })
            .await
            .expect("create principal");
        let token = self
            .tokens
            .issue(&principal)
            .expect("issue token")
            .token;
        (principal, token)
    }

    /// Disable a principal
    pub async fn disable(&self, principal: &Principal) {
        self.principals
            .set_active(principal.id, false)
            .await
            .expect("disable");
    }

    /// Send a request with an optional JSON body and bearer token
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    /// Upload content through the multipart endpoint
    pub async fn upload(
        &self,
        token: &str,
        virtual_path: &str,
        file_name: &str,
        content: &str,
    ) -> TestResponse {
        let mut body = String::new();
        for (name, value) in [("virtual_path", virtual_path), ("notes", "test upload")] {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
        ));

        let request = Request::builder()
            .method("POST")
            .uri("/api/documents")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();
        TestResponse {
            status,
            headers,
            bytes,
        }
    }
}
