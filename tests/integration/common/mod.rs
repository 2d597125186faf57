//! Common test utilities and fixtures for integration tests
//!
//! This module provides shared infrastructure for all integration tests including:
//! - An application router over in-memory stores and the mock email service
//! - JWT minting for the different caller roles
//! - Company and user fixtures
//! - Request builders and response helpers
//! - A Postgres-backed variant in [`postgres`]


use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use partyhub_auth::{AccessClaims, AuthBackend, AuthConfig, CallerRole};
use partyhub_common::config::DEFAULT_MAX_CERTIFICATE_BYTES;
use partyhub_companies::{
    CompaniesRepositories, CompaniesServices, CompaniesState, MemoryStore, Party, PartyId,
    PlatformUser, ServiceLimits,
};
use partyhub_email::mock::MockEmailService;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret"; // pragma: allowlist secret
pub const TEST_ISSUER: &str = "partyhub-test";
pub const TEST_AUDIENCE: &str = "partyhub";

/// Application wired to in-memory stores and a capturing email service
#[allow(dead_code)]
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub email: MockEmailService,
    pub router: Router,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_CERTIFICATE_BYTES, Duration::from_secs(2))
    }

    pub fn with_limits(max_certificate_bytes: usize, notify_timeout: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = CompaniesRepositories::in_memory(store.clone());
        let email = MockEmailService::new();

        let router = test_router(
            &repos,
            &email,
            ServiceLimits {
                max_certificate_bytes,
                notify_timeout,
            },
        );

        Self {
            store,
            email,
            router,
        }
    }

    /// Seed an unverified company
    pub fn seed_company(&self, id: PartyId, name: &str) -> Party {
        let party = Party::new(id, name).unwrap();
        self.store.insert_party(party.clone());
        party
    }

    /// Seed a registered user belonging to `company_id`
    pub fn seed_user(
        &self,
        company_id: PartyId,
        first_name: &str,
        family_name: &str,
    ) -> PlatformUser {
        let id = Uuid::new_v4();
        let user = PlatformUser {
            id,
            email: format!("{}@company{}.test", first_name.to_lowercase(), company_id),
            first_name: first_name.to_string(),
            family_name: family_name.to_string(),
            company_id: Some(company_id),
        };
        self.store.insert_user(user.clone());
        user
    }

    /// Send a request through a fresh clone of the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send_request(&self.router, request).await
    }
}

/// Full application router over the given stores, verifying test tokens
pub fn test_router(
    repos: &CompaniesRepositories,
    email: &MockEmailService,
    limits: ServiceLimits,
) -> Router {
    let max_certificate_bytes = limits.max_certificate_bytes;
    let services = CompaniesServices::new(repos, Arc::new(email.clone()), limits);

    let auth = AuthBackend::jwt(AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        issuer: Some(TEST_ISSUER.to_string()),
        audience: Some(TEST_AUDIENCE.to_string()),
    });

    let state = CompaniesState { services, auth };
    partyhub_app::build_router(state, max_certificate_bytes)
}

/// Send a request through a clone of `router` and buffer the response
pub async fn send_request(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        bytes: bytes.to_vec(),
    }
}

/// Buffered response for assertions
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        if self.bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.bytes).unwrap()
    }

    /// `error.code` of an error body
    pub fn error_code(&self) -> String {
        self.json()["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Caller fixture: identity and a signed access token
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CallerFixture {
    pub user_id: Uuid,
    pub company_id: Option<PartyId>,
    pub token: String,
}

#[allow(dead_code)]
impl CallerFixture {
    pub fn new(user_id: Uuid, company_id: Option<PartyId>, roles: &[CallerRole]) -> Self {
        let token = create_test_jwt(user_id, company_id, roles, 3600);
        Self {
            user_id,
            company_id,
            token,
        }
    }

    pub fn platform_manager() -> Self {
        Self::new(Uuid::new_v4(), None, &[CallerRole::PlatformManager])
    }

    pub fn legal_representative(company_id: PartyId) -> Self {
        Self::new(
            Uuid::new_v4(),
            Some(company_id),
            &[CallerRole::LegalRepresentative, CallerRole::CompanyMember],
        )
    }

    /// Legal representative backed by a registered user, so emails carry their name
    pub fn registered_representative(user: &PlatformUser) -> Self {
        Self::new(
            user.id,
            user.company_id,
            &[CallerRole::LegalRepresentative, CallerRole::CompanyMember],
        )
    }

    pub fn member(company_id: PartyId) -> Self {
        Self::new(Uuid::new_v4(), Some(company_id), &[CallerRole::CompanyMember])
    }
}

/// Create a test access token; a negative lifetime yields an expired token
pub fn create_test_jwt(
    user_id: Uuid,
    company_id: Option<PartyId>,
    roles: &[CallerRole],
    lifetime_secs: i64,
) -> String {
    let now = chrono::Utc::now().timestamp();

    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: Some(format!("{}@partyhub.test", user_id.simple())),
        company_id,
        roles: roles.iter().map(ToString::to_string).collect(),
        iat: now as u64,
        exp: (now + lifetime_secs) as u64,
        aud: Some(TEST_AUDIENCE.to_string()),
        iss: Some(TEST_ISSUER.to_string()),
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(TEST_JWT_SECRET.as_ref());

    jsonwebtoken::encode(&header, &claims, &encoding_key).unwrap()
}

/// Build a request with an optional bearer token and JSON body
#[allow(dead_code)]
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Certificate upload as it would come from a browser form
#[allow(dead_code)]
pub struct CertificateForm<'a> {
    pub name: &'a str,
    pub certificate_type: &'a str,
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub content: Vec<u8>,
}

const BOUNDARY: &str = "partyhub-test-boundary";

#[allow(dead_code)]
impl CertificateForm<'_> {
    /// PDF named `cert.pdf` with `size` deterministic bytes
    pub fn pdf(size: usize) -> Self {
        Self {
            name: "ISO 9001",
            certificate_type: "quality",
            file_name: "cert.pdf",
            mime_type: "application/pdf",
            content: (0..size).map(|i| (i % 251) as u8).collect(),
        }
    }

    pub fn request(&self, token: &str) -> Request<Body> {
        let mut body = Vec::new();

        for (field, value) in [("name", self.name), ("type", self.certificate_type)] {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, field, value
                )
                .as_bytes(),
            );
        }

        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, self.file_name, self.mime_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&self.content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/company-settings/certificate")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_creation() {
        let token = create_test_jwt(Uuid::new_v4(), Some(7), &[CallerRole::CompanyMember], 60);
        assert!(!token.is_empty());
        assert_eq!(token.matches('.').count(), 2);
    }
}
