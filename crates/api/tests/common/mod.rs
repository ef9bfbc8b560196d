#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sentinel_api::auth::cookie::CookieConfig;
use sentinel_api::auth::jwt::JwtConfig;
use sentinel_api::auth::SessionPolicy;
use sentinel_api::config::{ServerConfig, StorageBackend, StorageConfig};
use sentinel_api::router::build_app_router;
use sentinel_api::state::AppState;
use sentinel_db::store::{MemorySessionStore, MemoryUserDirectory, SessionStore};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and in-memory storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            database_url: None,
            replica_url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            issuer: "sentinel-test".to_string(),
        },
        session: SessionPolicy {
            ttl: chrono::Duration::hours(24),
            store_timeout: Duration::from_secs(2),
        },
        cookie: CookieConfig::default(),
        sweep_interval: None,
    }
}

/// Full application with the production middleware stack over fresh
/// in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<MemorySessionStore>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        let store: Arc<dyn SessionStore> = sessions.clone();
        let state = AppState::new(config.clone(), Arc::new(MemoryUserDirectory::new()), store)
            .expect("test state");

        Self {
            router: build_app_router(state),
            sessions,
            config,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Register `username` with [`PASSWORD`] through the API.
    pub async fn register(&self, username: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{username}@test.com"),
            "password": PASSWORD,
        });
        let response = post_json(self.app(), "/api/v1/auth/register", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"].clone()
    }

    /// Log in through the API and return the token from the body.
    pub async fn login(&self, username: &str) -> String {
        let response = self.login_response(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn login_response(&self, username: &str, password: &str) -> Response<Body> {
        let body = serde_json::json!({ "username": username, "password": password });
        post_json(self.app(), "/api/v1/auth/login", body).await
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The single `Set-Cookie` header of a response.
pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Assert a 401 with the given error code.
pub async fn assert_unauthorized(response: Response<Body>, code: &str) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], code);
}
