//! services/api/src/web/session.rs
//!
//! Stateless admin sessions: an HS256 JWT carried in the `admin-token` cookie.
//! Nothing is stored server-side, so a token stays valid until it expires.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "admin-token";
pub const SESSION_TTL_HOURS: i64 = 24;

/// The identity a valid token vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub admin_id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    admin_id: Uuid,
    email: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens and renders the matching cookies.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionIssuer {
    pub fn new(secret: &[u8], secure_cookies: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(SESSION_TTL_HOURS),
            secure_cookies,
        }
    }

    pub fn issue(
        &self,
        admin_id: Uuid,
        email: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(admin_id, email, Utc::now())
    }

    /// Issues a token as if it had been minted at `issued_at`.
    pub fn issue_at(
        &self,
        admin_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            admin_id,
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Returns the session if the signature matches and the token is unexpired.
    /// Every failure collapses to `None`.
    pub fn verify(&self, token: &str) -> Option<AdminSession> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;
        Some(AdminSession {
            admin_id: data.claims.admin_id,
            email: data.claims.email,
        })
    }

    /// Resolves the admin behind the request's cookie, if any.
    pub fn current_admin(&self, headers: &HeaderMap) -> Option<AdminSession> {
        token_from_headers(headers).and_then(|token| self.verify(token))
    }

    /// `Set-Cookie` value that stores `token` for the session lifetime.
    pub fn attach_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            COOKIE_NAME,
            token,
            self.ttl.num_seconds(),
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }

    /// `Set-Cookie` value that removes the session cookie immediately.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
            COOKIE_NAME,
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }
}

/// Finds the `admin-token` value across all `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix("admin-token="))
        .filter(|token| !token.is_empty())
}
