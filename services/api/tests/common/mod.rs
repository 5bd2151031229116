//! shared helpers for driving the router in-process against the in-memory store

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use gem_lab_core::ports::{AdminRepository, CertificateRepository};
use gem_lab_core::InMemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("valid address"),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::INFO,
        jwt_secret: SECRET.to_string(),
        secure_cookies: false,
        cors_origin: "http://localhost:3000".to_string(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub fn test_app() -> TestApp {
    test_app_with(Arc::new(InMemoryStore::new()))
}

/// Same app over a caller-supplied storage backend.
pub fn test_app_with<D>(db: Arc<D>) -> TestApp
where
    D: CertificateRepository + AdminRepository + 'static,
{
    let state = Arc::new(AppState::new(db, &test_config()));
    TestApp {
        router: web::router(state.clone()),
        state,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `admin-token=...` pair from `Set-Cookie`, ready to send back.
    pub fn session_cookie(&self) -> Option<String> {
        let set_cookie = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        set_cookie.split(';').next().map(|pair| pair.trim().to_string())
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Registers the administrator and returns the session cookie.
    pub async fn register_admin(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/admin/account/register",
                Some(json!({
                    "name": "Lab Admin",
                    "email": email,
                    "password": password,
                    "confirmPassword": password,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.session_cookie().expect("register should set a cookie")
    }
}

pub fn ruby_body(number: &str) -> Value {
    json!({
        "certificateNumber": number,
        "gemName": "Ruby",
        "gemType": "Natural Ruby",
        "carat": "2.0 carats",
        "color": "Red",
        "issueDate": "2024-06-01",
    })
}
