//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use mentorlink_api::{AppState, build_app, build_state};
use mentorlink_auth::JwtEncoder;
use mentorlink_core::config::{AppConfig, DatabaseProvider};
use mentorlink_core::types::UserId;
use mentorlink_database::Stores;
use mentorlink_database::memory::MemoryDirectory;
use mentorlink_entity::user::{UserRole, UserSummary};

/// Test application over in-memory stores.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the bus directly
    pub state: AppState,
    /// Directory the tests seed users into
    pub directory: Arc<MemoryDirectory>,
    encoder: JwtEncoder,
}

/// A seeded user and a token for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// User id
    pub id: UserId,
    /// Bearer token
    pub token: String,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let directory = Arc::new(MemoryDirectory::new());
        let encoder = JwtEncoder::new(&config.auth);
        let state = build_state(config, Stores::memory(directory.clone()));
        let router = build_app(state.clone());

        Self {
            router,
            state,
            directory,
            encoder,
        }
    }

    /// Seed a directory entry and mint a token for it
    pub fn user(&self, name: &str, role: UserRole) -> TestUser {
        let id = UserId::new();
        self.directory.insert(UserSummary {
            id,
            name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            role,
            profile_picture: None,
        });
        let (token, _) = self
            .encoder
            .issue(id, role, name)
            .expect("Failed to issue token");
        TestUser { id, token }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral port for live WebSocket clients
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body, or `Null`
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        assert_eq!(self.body["success"], true, "Not a success body: {}", self.body);
        &self.body["data"]
    }

    /// The `error` code of a failure body
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
