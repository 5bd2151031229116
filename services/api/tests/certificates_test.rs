//! integration tests for the certificate routes
//!
//! public lookup and intake, and the admin CRUD routes behind the session guard

mod common;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{ruby_body, test_app, test_app_with, TestApp};
use gem_lab_core::domain::{AdminAccount, AdminCredentials, CertificateRecord};
use gem_lab_core::{AdminRepository, CertificateRepository, InMemoryStore, PortResult};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

async fn signed_in() -> (TestApp, String) {
    let app = test_app();
    let cookie = app.register_admin("admin@lab.test", "secret1").await;
    (app, cookie)
}

/// test the normalization scenario: create lowercase, look up uppercase
#[tokio::test]
async fn test_create_then_lookup_normalized_number() {
    let (app, cookie) = signed_in().await;

    let created = app
        .send(
            Method::POST,
            "/admin/certificates",
            Some(ruby_body("gem-2024-010")),
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["certificateNumber"], "GEM-2024-010");
    assert_eq!(created.body["status"], "Certified");
    assert_eq!(created.body["issueDate"], "2024-06-01");
    assert_eq!(created.body["shape"], serde_json::Value::Null);

    let found = app
        .send(Method::GET, "/certificates/GEM-2024-010", None, None)
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body, created.body);

    let again = app
        .send(Method::GET, "/certificates/gem-2024-010", None, None)
        .await;
    assert_eq!(again.body, found.body);
}

/// test that an unknown number is a 404 with an error body
#[tokio::test]
async fn test_lookup_unknown_number() {
    let app = test_app();
    let response = app.send(Method::GET, "/certificates/NOPE-1", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Certificate not found");
}

/// test that every admin route rejects a request without a valid session
#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = test_app();
    let id = Uuid::new_v4();
    let forged = "admin-token=eyJhbGciOiJIUzI1NiJ9.e30.bogus";

    let requests = [
        (Method::GET, "/admin/certificates".to_string()),
        (Method::POST, "/admin/certificates".to_string()),
        (Method::GET, format!("/admin/certificates/{id}")),
        (Method::PUT, format!("/admin/certificates/{id}")),
        (Method::DELETE, format!("/admin/certificates/{id}")),
        (Method::GET, "/admin/account/me".to_string()),
    ];
    for (method, uri) in requests {
        for cookie in [None, Some(forged)] {
            let response = app
                .send(method.clone(), &uri, Some(ruby_body("GEM-X")), cookie)
                .await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(response.error(), "Unauthorized");
        }
    }
}

/// test that an expired session cookie is treated as no session
#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (app, _) = signed_in().await;
    let token = app
        .state
        .sessions
        .issue_at(Uuid::new_v4(), "admin@lab.test", Utc::now() - Duration::hours(25))
        .expect("token");
    let response = app
        .send(
            Method::GET,
            "/admin/certificates",
            None,
            Some(&format!("admin-token={token}")),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

/// test required fields and duplicate numbers on the admin create route
#[tokio::test]
async fn test_admin_create_validation_and_duplicates() {
    let (app, cookie) = signed_in().await;

    let missing = app
        .send(
            Method::POST,
            "/admin/certificates",
            Some(json!({ "certificateNumber": "GEM-1", "gemName": "Ruby" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.error(),
        "Certificate number, gem name, type, carat, color, and issue date are required"
    );

    let first = app
        .send(Method::POST, "/admin/certificates", Some(ruby_body("GEM-1")), Some(&cookie))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let duplicate = app
        .send(Method::POST, "/admin/certificates", Some(ruby_body("gem-1")), Some(&cookie))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.error(), "Certificate number already exists");

    let bad_date = app
        .send(
            Method::POST,
            "/admin/certificates",
            Some(json!({
                "certificateNumber": "GEM-2",
                "gemName": "Ruby",
                "gemType": "Natural Ruby",
                "carat": "1 carat",
                "color": "Red",
                "issueDate": "yesterday",
            })),
            Some(&cookie),
        )
        .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
}

/// test the public intake contract (weight/clarity, 409 on duplicates)
#[tokio::test]
async fn test_public_intake() {
    let app = test_app();
    let body = json!({
        "certificateNumber": "gem-2024-001",
        "gemName": "Royal Blue Sapphire",
        "gemType": "Natural Sapphire",
        "weight": "3.52 carats",
        "color": "Royal Blue",
        "clarity": "VS2",
        "issueDate": "2024-01-15",
    });

    let created = app
        .send(Method::POST, "/certificates", Some(body.clone()), None)
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["certificateNumber"], "GEM-2024-001");
    assert_eq!(created.body["carat"], "3.52 carats");
    assert_eq!(created.body["clarity"], "VS2");

    let duplicate = app.send(Method::POST, "/certificates", Some(body), None).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error(), "Certificate with this number already exists");

    let missing = app
        .send(
            Method::POST,
            "/certificates",
            Some(json!({ "certificateNumber": "GEM-9", "gemName": "Opal" })),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "All required fields must be provided");
}

/// test that the admin list is newest first
#[tokio::test]
async fn test_list_is_newest_first() {
    let (app, cookie) = signed_in().await;
    for number in ["GEM-A", "GEM-B", "GEM-C"] {
        app.send(Method::POST, "/admin/certificates", Some(ruby_body(number)), Some(&cookie))
            .await;
    }

    let list = app
        .send(Method::GET, "/admin/certificates", None, Some(&cookie))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    let numbers: Vec<&str> = list
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["certificateNumber"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["GEM-C", "GEM-B", "GEM-A"]);
}

/// test that a partial update changes only the supplied fields
#[tokio::test]
async fn test_partial_update() {
    let (app, cookie) = signed_in().await;
    let mut body = ruby_body("GEM-P");
    body["shape"] = json!("Oval");
    body["origin"] = json!("Burma");
    let created = app
        .send(Method::POST, "/admin/certificates", Some(body), Some(&cookie))
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    let uri = format!("/admin/certificates/{id}");

    let updated = app
        .send(Method::PUT, &uri, Some(json!({ "remarks": "x" })), Some(&cookie))
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let mut expected = created.body.clone();
    expected["remarks"] = json!("x");
    assert_eq!(updated.body, expected);

    let cleared = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "shape": null, "origin": "", "status": "Not Certified" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["shape"], serde_json::Value::Null);
    assert_eq!(cleared.body["origin"], serde_json::Value::Null);
    assert_eq!(cleared.body["status"], "Not Certified");
    assert_eq!(cleared.body["remarks"], "x");

    let fetched = app.send(Method::GET, &uri, None, Some(&cookie)).await;
    assert_eq!(fetched.body, cleared.body);
}

/// test that an update cannot steal another record's number
#[tokio::test]
async fn test_update_number_conflict() {
    let (app, cookie) = signed_in().await;
    app.send(Method::POST, "/admin/certificates", Some(ruby_body("GEM-1")), Some(&cookie))
        .await;
    let second = app
        .send(Method::POST, "/admin/certificates", Some(ruby_body("GEM-2")), Some(&cookie))
        .await;
    let uri = format!("/admin/certificates/{}", second.body["id"].as_str().unwrap());

    let response = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "certificateNumber": "gem-1" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Certificate number already exists");
}

/// test delete, then 404 on every id-based route
#[tokio::test]
async fn test_delete_and_unknown_ids() {
    let (app, cookie) = signed_in().await;
    let created = app
        .send(Method::POST, "/admin/certificates", Some(ruby_body("GEM-D")), Some(&cookie))
        .await;
    let uri = format!("/admin/certificates/{}", created.body["id"].as_str().unwrap());

    let deleted = app.send(Method::DELETE, &uri, None, Some(&cookie)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Certificate deleted successfully");

    let lookup = app.send(Method::GET, "/certificates/GEM-D", None, None).await;
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);

    for uri in [uri.as_str(), "/admin/certificates/not-a-uuid"] {
        let get = app.send(Method::GET, uri, None, Some(&cookie)).await;
        assert_eq!(get.status, StatusCode::NOT_FOUND);
        let put = app
            .send(Method::PUT, uri, Some(json!({ "remarks": "x" })), Some(&cookie))
            .await;
        assert_eq!(put.status, StatusCode::NOT_FOUND);
        let delete = app.send(Method::DELETE, uri, None, Some(&cookie)).await;
        assert_eq!(delete.status, StatusCode::NOT_FOUND);
        assert_eq!(delete.error(), "Certificate not found");
    }
}

/// In-memory storage that yields after every number lookup, so concurrent
/// requests all pass the existence check before any insert lands.
struct Interleaved(InMemoryStore);

#[async_trait]
impl CertificateRepository for Interleaved {
    async fn insert_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        self.0.insert_certificate(record).await
    }

    async fn get_certificate_by_id(&self, id: Uuid) -> PortResult<Option<CertificateRecord>> {
        self.0.get_certificate_by_id(id).await
    }

    async fn get_certificate_by_number(
        &self,
        number: &str,
    ) -> PortResult<Option<CertificateRecord>> {
        let found = self.0.get_certificate_by_number(number).await;
        tokio::task::yield_now().await;
        found
    }

    async fn list_certificates(&self) -> PortResult<Vec<CertificateRecord>> {
        self.0.list_certificates().await
    }

    async fn update_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        self.0.update_certificate(record).await
    }

    async fn delete_certificate(&self, id: Uuid) -> PortResult<()> {
        self.0.delete_certificate(id).await
    }
}

#[async_trait]
impl AdminRepository for Interleaved {
    async fn admin_exists(&self) -> PortResult<bool> {
        self.0.admin_exists().await
    }

    async fn get_admin_by_email(&self, email: &str) -> PortResult<Option<AdminCredentials>> {
        self.0.get_admin_by_email(email).await
    }

    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<AdminAccount> {
        self.0.create_admin(name, email, password_hash).await
    }
}

/// test that concurrent intake of one number admits exactly one
#[tokio::test]
async fn test_concurrent_intake_single_winner() {
    let app = test_app_with(Arc::new(Interleaved(InMemoryStore::new())));
    let attempts = (0..6).map(|i| {
        let number = if i % 2 == 0 { "gem-race" } else { "GEM-RACE" };
        let body = json!({
            "certificateNumber": number,
            "gemName": "Spinel",
            "gemType": "Natural Spinel",
            "weight": "1.1 carats",
            "color": "Pink",
            "clarity": "VS1",
        });
        let app = &app;
        async move { app.send(Method::POST, "/certificates", Some(body), None).await }
    });
    let responses = futures::future::join_all(attempts).await;

    let created = responses
        .iter()
        .filter(|r| r.status == StatusCode::CREATED)
        .count();
    let conflicts = responses
        .iter()
        .filter(|r| r.status == StatusCode::CONFLICT)
        .count();
    assert_eq!((created, conflicts), (1, 5));

    let found = app.send(Method::GET, "/certificates/GEM-RACE", None, None).await;
    assert_eq!(found.status, StatusCode::OK);
}
