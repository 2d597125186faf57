//! Company settings endpoint integration tests
//!
//! Tests the 2 settings endpoints:
//! - GET /company-settings/:company_id - Get settings
//! - PUT /company-settings/:company_id - Update settings

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{json_request, CallerFixture, CertificateForm, TestApp};

fn settings_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "website": "https://acme.example",
        "vatNumber": "DE123456789",
        "preferredCategories": ["bearings", "fasteners"],
        "ppapCompatibilityLevel": 3
    })
}

#[tokio::test]
async fn test_update_settings_keeps_certificates_and_verification() {
    let app = TestApp::new();
    app.seed_company(7, "Acme");
    let member = CallerFixture::member(7);
    let admin = CallerFixture::platform_manager();

    let response = app.send(CertificateForm::pdf(32).request(&member.token)).await;
    let certificate_id = response.json()["id"].as_i64().unwrap();
    app.send(json_request(
        Method::POST,
        "/admin/verify_company?companyId=7",
        Some(&admin.token),
        None,
    ))
    .await;

    let response = app
        .send(json_request(
            Method::PUT,
            "/company-settings/7",
            Some(&member.token),
            Some(settings_body("Acme GmbH")),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["name"], "Acme GmbH");
    assert_eq!(body["vatNumber"], "DE123456789");
    assert_eq!(body["preferredCategories"], json!(["bearings", "fasteners"]));
    assert_eq!(body["ppapCompatibilityLevel"], 3);
    assert_eq!(body["verificationStatus"], "verified");
    assert_eq!(body["certificateIds"], json!([certificate_id]));

    let response = app
        .send(json_request(
            Method::GET,
            "/company-settings/7",
            Some(&CallerFixture::member(8).token),
            None,
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], "Acme GmbH");
}

#[tokio::test]
async fn test_update_settings_of_foreign_company_is_forbidden() {
    let app = TestApp::new();
    app.seed_company(7, "Acme");
    let outsider = CallerFixture::member(8);

    let response = app
        .send(json_request(
            Method::PUT,
            "/company-settings/7",
            Some(&outsider.token),
            Some(settings_body("Hijacked")),
        ))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "AUTHORIZATION_ERROR");
}

#[tokio::test]
async fn test_update_settings_validates_body() {
    let app = TestApp::new();
    app.seed_company(7, "Acme");
    let member = CallerFixture::member(7);

    let mut body = settings_body("Acme");
    body["website"] = json!("not a url");

    let response = app
        .send(json_request(
            Method::PUT,
            "/company-settings/7",
            Some(&member.token),
            Some(body),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_settings_of_unknown_company_is_not_found() {
    let app = TestApp::new();
    let member = CallerFixture::member(7);

    let response = app
        .send(json_request(
            Method::GET,
            "/company-settings/7",
            Some(&member.token),
            None,
        ))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
