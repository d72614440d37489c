use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medicare_hms::config::BackendSettings;
use medicare_hms::hosted::HostedApi;
use medicare_hms::models::{Collection, SortKey};
use medicare_hms::notify::{Email, HttpNotifier, Notifier};
use medicare_hms::store::{EntityStore, HttpEntityStore};
use medicare_hms::{NotifyError, StoreError};

fn settings(server: &MockServer) -> BackendSettings {
    BackendSettings {
        base_url: format!("{}/api", server.uri()),
        app_id: "medicare".into(),
        api_key: "secret".into(),
        ..BackendSettings::default()
    }
}

#[tokio::test]
async fn list_sends_sort_key_and_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/medicare/entities/TriageCase"))
        .and(query_param("sort", "-priority_score"))
        .and(header("api_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "b", "priority_score": 9 },
            { "id": "a", "priority_score": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpEntityStore::new(&settings(&server)).unwrap();
    let records = store
        .list(Collection::TriageCase, Some(SortKey::parse("-priority_score")))
        .await
        .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[tokio::test]
async fn create_posts_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/apps/medicare/entities/ComplaintTicket"))
        .and(body_json(json!({ "ticket_id": "TCK1", "status": "submitted" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "c1", "ticket_id": "TCK1", "status": "submitted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpEntityStore::new(&settings(&server)).unwrap();
    let created = store
        .create(Collection::ComplaintTicket, json!({ "ticket_id": "TCK1", "status": "submitted" }))
        .await
        .unwrap();
    assert_eq!(created["id"], "c1");
}

#[tokio::test]
async fn update_puts_the_patch_to_the_record_url() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/apps/medicare/entities/LaundryRequest/l1"))
        .and(body_json(json!({ "status": "picked_up" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "l1", "status": "picked_up" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpEntityStore::new(&settings(&server)).unwrap();
    let updated = store
        .update(Collection::LaundryRequest, "l1", json!({ "status": "picked_up" }))
        .await
        .unwrap();
    assert_eq!(updated["status"], "picked_up");
}

#[tokio::test]
async fn non_success_becomes_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/medicare/entities/Prescription"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = HttpEntityStore::new(&settings(&server)).unwrap();
    let err = store.list(Collection::Prescription, None).await.unwrap_err();
    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn missing_record_on_update_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpEntityStore::new(&settings(&server)).unwrap();
    let err = store
        .update(Collection::TriageCase, "gone", json!({ "status": "completed" }))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { collection: Collection::TriageCase, .. }));
}

#[tokio::test]
async fn notifier_posts_to_send_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/apps/medicare/integration-endpoints/Core/SendEmail"))
        .and(header("api_key", "secret"))
        .and(body_json(json!({ "to": "pat@example.org", "subject": "Hi", "body": "<p>x</p>" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(HostedApi::new(&settings(&server)).unwrap());
    notifier
        .send_email(Email {
            to: "pat@example.org".into(),
            subject: "Hi".into(),
            body: "<p>x</p>".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn notifier_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad address"))
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(HostedApi::new(&settings(&server)).unwrap());
    let err = notifier
        .send_email(Email {
            to: "pat@example.org".into(),
            subject: "Hi".into(),
            body: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Rejected { status: 422, .. }));
}
