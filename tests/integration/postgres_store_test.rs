//! Postgres store integration tests
//!
//! Exercises the guarantees the Postgres adapters get from the schema:
//! - the partial unique index on pending `(email, company_id)` pairs
//! - `FOR UPDATE` serialization of certificate list edits per party
//! - list order from `unnest ... WITH ORDINALITY`
//! - the monotonic `GREATEST` on `verification_status`
//!
//! Every test returns early unless `TEST_DATABASE_URL` or `DATABASE_URL` is set.

mod common;

use axum::http::{Method, StatusCode};
use partyhub_companies::{
    DetachOutcome, InsertOutcome, NewCertificate, NewInvitation, Party, VerificationStatus,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::postgres::{unique_email, PgTestApp};
use common::{json_request, CallerFixture, CertificateForm};

const MAX: usize = 1024 * 1024;

fn upload(name: &str) -> NewCertificate {
    NewCertificate::new(name, "quality", "application/pdf", "cert.pdf", vec![3; 64], MAX)
        .unwrap()
}

mod test_invitations {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_invitations_register_exactly_once() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let company_id = app.seed_company("Acme").await;
        let representative = CallerFixture::legal_representative(company_id);
        let email = unique_email("race");

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let router = app.router.clone();
                let request = json_request(
                    Method::POST,
                    "/send_invitation",
                    Some(&representative.token),
                    Some(json!({ "email": email, "companyId": company_id })),
                );
                tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                StatusCode::CONFLICT => conflicts += 1,
                other => panic!("unexpected status {}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 9);
        assert_eq!(app.invitation_rows(&email).await, 1);
        assert_eq!(app.email.get_emails_for_recipient(&email).len(), 1);
    }

    #[tokio::test]
    async fn test_pending_pair_is_unique_until_consumed() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let store = &app.repos.invitations;
        let email = unique_email("pair");
        let invitation = NewInvitation::new(&email, 7, Uuid::new_v4()).unwrap();

        let first = match store.insert_unique(&invitation).await.unwrap() {
            InsertOutcome::Inserted(row) => row,
            InsertOutcome::Duplicate => panic!("first insert reported a duplicate"),
        };
        assert_eq!(first.email, email);
        assert_eq!(
            store.insert_unique(&invitation).await.unwrap(),
            InsertOutcome::Duplicate
        );

        // Another company is a different pair
        let elsewhere = NewInvitation::new(&email, 8, Uuid::new_v4()).unwrap();
        assert!(matches!(
            store.insert_unique(&elsewhere).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));

        let consumed = store.consume(&email, 7).await.unwrap().unwrap();
        assert_eq!(consumed.id, first.id);
        assert!(consumed.consumed_at.is_some());
        assert!(store.get_pending(&email, 7).await.unwrap().is_none());

        assert!(matches!(
            store.insert_unique(&invitation).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert_eq!(app.invitation_rows(&email).await, 3);
    }
}

mod test_certificates {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_uploads_are_all_listed_in_order() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let company_id = app.seed_company("Acme").await;
        let member = CallerFixture::member(company_id);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = app.router.clone();
                let request = CertificateForm::pdf(100 + i).request(&member.token);
                tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
        }

        let party = app.repos.parties.get(company_id).await.unwrap().unwrap();
        assert_eq!(party.certificate_ids.len(), 8);
        assert_eq!(app.certificate_rows(company_id).await, 8);

        let listed: Vec<i64> = app
            .repos
            .certificates
            .list_by_party(company_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, party.certificate_ids);
    }

    #[tokio::test]
    async fn test_list_follows_party_order_not_id_order() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let company_id = app.seed_company("Acme").await;
        let store = &app.repos.certificates;

        let first = store
            .attach(company_id, &upload("first"))
            .await
            .unwrap()
            .unwrap();
        let second = store
            .attach(company_id, &upload("second"))
            .await
            .unwrap()
            .unwrap();

        sqlx::query("UPDATE parties SET certificate_ids = $2 WHERE id = $1")
            .bind(company_id)
            .bind(vec![second.id, first.id])
            .execute(&app.pool)
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_by_party(company_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_replayed_attach_creates_one_certificate() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let company_id = app.seed_company("Acme").await;
        let store = &app.repos.certificates;
        let certificate = upload("once");

        let first = store
            .attach(company_id, &certificate)
            .await
            .unwrap()
            .unwrap();
        let replayed = store
            .attach(company_id, &certificate)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(replayed.id, first.id);
        assert_eq!(replayed.document.content, certificate.document.content);
        assert_eq!(app.certificate_rows(company_id).await, 1);

        let party = app.repos.parties.get(company_id).await.unwrap().unwrap();
        assert_eq!(party.certificate_ids, vec![first.id]);
    }

    #[tokio::test]
    async fn test_attach_to_missing_company_writes_nothing() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let missing = common::postgres::unique_party_id();

        let attached = app
            .repos
            .certificates
            .attach(missing, &upload("x"))
            .await
            .unwrap();
        assert!(attached.is_none());
        assert_eq!(app.certificate_rows(missing).await, 0);
    }

    #[tokio::test]
    async fn test_cannot_remove_another_companys_certificate() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let owner_id = app.seed_company("Acme").await;
        let intruder_id = app.seed_company("Globex").await;
        let owner = CallerFixture::member(owner_id);
        let intruder = CallerFixture::member(intruder_id);

        let response = app.send(CertificateForm::pdf(512).request(&owner.token)).await;
        assert_eq!(response.status, StatusCode::CREATED);
        let id = response.json()["id"].as_i64().unwrap();

        let response = app
            .send(json_request(
                Method::DELETE,
                &format!("/company-settings/certificate/{}", id),
                Some(&intruder.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let party = app.repos.parties.get(owner_id).await.unwrap().unwrap();
        assert_eq!(party.certificate_ids, vec![id]);
        assert_eq!(app.certificate_rows(owner_id).await, 1);

        let response = app
            .send(json_request(
                Method::DELETE,
                &format!("/company-settings/certificate/{}", id),
                Some(&owner.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(app.certificate_rows(owner_id).await, 0);
        assert_eq!(
            app.repos.certificates.detach(owner_id, id).await.unwrap(),
            DetachOutcome::NotReferenced
        );
    }
}

mod test_verification {
    use super::*;

    #[tokio::test]
    async fn test_save_never_downgrades_verification() {
        let Some(app) = PgTestApp::connect().await else {
            return;
        };
        let company_id = app.seed_company("Acme").await;
        let admin = CallerFixture::platform_manager();

        let response = app
            .send(json_request(
                Method::POST,
                &format!("/admin/verify_company?companyId={}", company_id),
                Some(&admin.token),
                None,
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let mut stale: Party = app.repos.parties.get(company_id).await.unwrap().unwrap();
        stale.verification_status = VerificationStatus::Unverified;
        stale.name = "Acme Renamed".to_string();

        let saved = app.repos.parties.save(&stale).await.unwrap();
        assert_eq!(saved.verification_status, VerificationStatus::Verified);
        assert_eq!(saved.name, "Acme Renamed");
    }
}
