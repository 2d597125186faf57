//! Certificate endpoint integration tests
//!
//! Tests the 4 certificate endpoints:
//! - POST /company-settings/certificate - Upload
//! - GET /company-settings/certificate/:id - Download
//! - DELETE /company-settings/certificate/:id - Remove
//! - GET /company-settings/:company_id/certificates - List

use std::time::Duration;

use axum::http::{header, Method, StatusCode};

use crate::common::{json_request, CallerFixture, CertificateForm, TestApp};

async fn upload(app: &TestApp, caller: &CallerFixture, form: &CertificateForm<'_>) -> i64 {
    let response = app.send(form.request(&caller.token)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
    response.json()["id"].as_i64().unwrap()
}

async fn certificate_ids(app: &TestApp, caller: &CallerFixture, company_id: i64) -> Vec<i64> {
    let response = app
        .send(json_request(
            Method::GET,
            &format!("/company-settings/{}", company_id),
            Some(&caller.token),
            None,
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.json()["certificateIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_i64().unwrap())
        .collect()
}

mod test_upload_certificate {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download_returns_exact_bytes() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);
        let form = CertificateForm::pdf(1024);

        let response = app.send(form.request(&member.token)).await;
        assert_eq!(response.status, StatusCode::CREATED);
        let summary = response.json();
        assert_eq!(summary["partyId"], 7);
        assert_eq!(summary["name"], "ISO 9001");
        assert_eq!(summary["type"], "quality");
        assert_eq!(summary["sizeBytes"], 1024);
        let id = summary["id"].as_i64().unwrap();

        assert_eq!(certificate_ids(&app, &member, 7).await, vec![id]);

        let response = app
            .send(json_request(
                Method::GET,
                &format!("/company-settings/certificate/{}", id),
                Some(&member.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.bytes, form.content);
        assert_eq!(
            response.header(header::CONTENT_TYPE).as_deref(),
            Some("application/pdf")
        );
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION).as_deref(),
            Some("attachment; filename=\"cert.pdf\"")
        );
    }

    #[tokio::test]
    async fn test_uploads_keep_insertion_order() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);

        let first = upload(&app, &member, &CertificateForm::pdf(10)).await;
        let second = upload(&app, &member, &CertificateForm::pdf(20)).await;
        assert_ne!(first, second);

        assert_eq!(certificate_ids(&app, &member, 7).await, vec![first, second]);

        let response = app
            .send(json_request(
                Method::GET,
                "/company-settings/7/certificates",
                Some(&member.token),
                None,
            ))
            .await;
        let listed: Vec<i64> = response
            .json()
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let app = TestApp::with_limits(1024, Duration::from_secs(2));
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);

        let response = app.send(CertificateForm::pdf(2048).request(&member.token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.store.certificate_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);
        let mut form = CertificateForm::pdf(16);
        form.name = "   ";

        let response = app.send(form.request(&member.token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(certificate_ids(&app, &member, 7).await.is_empty());
    }

    #[tokio::test]
    async fn test_caller_without_company_is_forbidden() {
        let app = TestApp::new();
        let admin = CallerFixture::platform_manager();

        let response = app.send(CertificateForm::pdf(16).request(&admin.token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_for_missing_company_is_not_found() {
        let app = TestApp::new();
        let member = CallerFixture::member(99);

        let response = app.send(CertificateForm::pdf(16).request(&member.token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(app.store.certificate_count(), 0);
    }
}

mod test_delete_certificate {
    use super::*;

    #[tokio::test]
    async fn test_remove_own_certificate() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);
        let id = upload(&app, &member, &CertificateForm::pdf(1024)).await;

        let response = app
            .send(json_request(
                Method::DELETE,
                &format!("/company-settings/certificate/{}", id),
                Some(&member.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(certificate_ids(&app, &member, 7).await.is_empty());

        let response = app
            .send(json_request(
                Method::GET,
                &format!("/company-settings/certificate/{}", id),
                Some(&member.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cannot_remove_another_companys_certificate() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        app.seed_company(8, "Globex");
        let owner = CallerFixture::member(7);
        let intruder = CallerFixture::member(8);
        let id = upload(&app, &owner, &CertificateForm::pdf(1024)).await;

        let response = app
            .send(json_request(
                Method::DELETE,
                &format!("/company-settings/certificate/{}", id),
                Some(&intruder.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        assert_eq!(certificate_ids(&app, &owner, 7).await, vec![id]);
        let response = app
            .send(json_request(
                Method::GET,
                &format!("/company-settings/certificate/{}", id),
                Some(&owner.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.bytes.len(), 1024);
    }

    #[tokio::test]
    async fn test_removing_twice_is_not_found() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);
        let id = upload(&app, &member, &CertificateForm::pdf(8)).await;
        let uri = format!("/company-settings/certificate/{}", id);

        let response = app
            .send(json_request(Method::DELETE, &uri, Some(&member.token), None))
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);

        let response = app
            .send(json_request(Method::DELETE, &uri, Some(&member.token), None))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

mod test_list_certificates {
    use super::*;

    #[tokio::test]
    async fn test_list_for_unknown_company_is_not_found() {
        let app = TestApp::new();
        let member = CallerFixture::member(7);

        let response = app
            .send(json_request(
                Method::GET,
                "/company-settings/7/certificates",
                Some(&member.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_omits_payloads() {
        let app = TestApp::new();
        app.seed_company(7, "Acme");
        let member = CallerFixture::member(7);
        upload(&app, &member, &CertificateForm::pdf(64)).await;

        let response = app
            .send(json_request(
                Method::GET,
                "/company-settings/7/certificates",
                Some(&CallerFixture::member(8).token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let listed = response.json();
        assert_eq!(listed[0]["fileName"], "cert.pdf");
        assert!(listed[0].get("content").is_none());
    }
}
