//! Query and mutation tests against a mock backend.

use std::time::Duration;

use eventdesk::api::paths::LOCATIONS;
use eventdesk::http::{FilePart, Params};
use eventdesk::types::{EventPage, EventPayload, Location, LocationForm};
use eventdesk::{
    AccessToken, ApiClient, BackendKind, BaseUrl, ClientConfig, RefetchOnMount, RefreshToken,
};
use reqwest::Method;
use serde_json::{Value, json};
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let base = BaseUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    let client = ApiClient::new(ClientConfig::new(base)).unwrap();
    client
        .session()
        .set_credentials(AccessToken::new("a1"), RefreshToken::new("r1"));
    client
}

fn locations_body() -> Value {
    json!({"data": [{"id": 1, "name": "Lekki", "address": "12 Admiralty Way", "membersCount": 3}]})
}

#[tokio::test]
async fn test_query_selects_data_and_sends_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory/organizer/events/"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "results": [{"id": 42, "event_name": "Night Market"}],
                "count": 11,
                "next": null,
                "previous": "https://api.example.com/inventory/organizer/events/?page=1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = Params::from([("page".to_string(), "2".to_string())]);
    let page: EventPage = client
        .events()
        .organizer_events(params)
        .mount()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(page.count, 11);
    assert_eq!(page.results[0].title(), "Night Market");
}

#[tokio::test]
async fn test_select_data_falls_back_to_whole_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Lekki"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locations = client.locations().list().mount().await.unwrap().unwrap();

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "Lekki");
}

#[tokio::test]
async fn test_disabled_query_does_not_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory/organizer/discount-codes/event/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let codes = client.discount_codes().for_event(7, false).mount().await.unwrap();

    assert!(codes.is_none());
}

#[tokio::test]
async fn test_default_policy_refetches_on_every_mount() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locations_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client.locations().list();
    query.mount().await.unwrap();
    query.mount().await.unwrap();
}

#[tokio::test]
async fn test_fresh_cache_is_served_without_fetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locations_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client
        .query::<Vec<Location>>(LOCATIONS)
        .select_data(true)
        .stale_time(Duration::from_secs(60));

    let first = query.mount().await.unwrap().unwrap();
    let second = query.mount().await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(second[0].members_count, Some(3));

    // A disabled view of the same key still sees the cached data.
    let disabled = client
        .query::<Vec<Location>>(LOCATIONS)
        .select_data(true)
        .enabled(false);
    assert_eq!(disabled.mount().await.unwrap().unwrap().len(), 1);
}

#[tokio::test]
async fn test_never_policy_uses_any_cached_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory/organizer/events/statistics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": {"total": 4, "active": 1, "upcoming": 2, "past": 1},
            "registrations": {"total": 30, "successful": 25, "pending": 3, "failed": 2},
            "revenue": {"total": "125000.00", "total_orders": 25, "total_customers": 22}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client
        .events()
        .dashboard_stats()
        .refetch_on_mount(RefetchOnMount::Never);

    let stats = query.mount().await.unwrap().unwrap();
    assert_eq!(stats.events.total, 4);
    let again = query.mount().await.unwrap().unwrap();
    assert_eq!(again.revenue.total, "125000.00");
}

#[tokio::test]
async fn test_refetch_ignores_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locations_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client
        .locations()
        .list()
        .refetch_on_mount(RefetchOnMount::Never);

    query.mount().await.unwrap();
    query.refetch().await.unwrap();
}

#[tokio::test]
async fn test_failed_query_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Database unavailable"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client.locations().list();
    let err = query.mount().await.unwrap_err();

    assert_eq!(err.user_message(), "Database unavailable");
    assert!(query.cached().unwrap().is_none());
}

#[tokio::test]
async fn test_mutation_invalidates_dependent_queries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stores/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locations_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/stores/locations/"))
        .and(body_json(json!({"name": "Ikeja", "address": "1 Allen Avenue"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2, "name": "Ikeja"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = client.locations().list();
    query.mount().await.unwrap();
    assert!(query.cached().unwrap().is_some());

    let created = client
        .locations()
        .create(&LocationForm {
            name: "Ikeja".into(),
            address: "1 Allen Avenue".into(),
        })
        .await
        .unwrap();

    assert_eq!(created["id"], 2);
    assert!(query.cached().unwrap().is_none());
}

#[tokio::test]
async fn test_mutation_sends_one_request_with_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/inventory/organizer/code-activation/9/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.discount_codes().delete(9).await.unwrap();
    assert!(result.is_null());
}

#[tokio::test]
async fn test_deactivate_posts_code_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/inventory/organizer/organizer/code-activation/"))
        .and(body_json(json!({"code": 9})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "inactive"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.discount_codes().deactivate(9).await.unwrap();
}

#[tokio::test]
async fn test_generic_mutation_under_v2_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/stores/locations/3/"))
        .and(body_json(json!({"name": "Victoria Island"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let base = BaseUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    let client = ApiClient::new(ClientConfig::new(base).with_backend(BackendKind::V2)).unwrap();

    let path = client.resource_path("/stores/locations/3/");
    let body: Value = client
        .mutation(Method::PATCH, path)
        .send(&json!({"name": "Victoria Island"}))
        .await
        .unwrap();

    assert_eq!(body["id"], 3);
}

fn night_market() -> EventPayload {
    EventPayload {
        organizer: json!(7),
        event_name: "Night Market".into(),
        location: "Lekki".into(),
        description: "Food and crafts".into(),
        capacity: "200".into(),
        start_date: "2026-11-01".into(),
        end_date: "2026-11-02".into(),
        participant_fee: 5000.0,
        event_instructions: None,
    }
}

fn flier() -> FilePart {
    FilePart::new("flier.png", b"PNG-bytes".to_vec()).with_content_type("image/png")
}

#[tokio::test]
async fn test_create_event_with_image_sends_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/inventory/organizer/events/"))
        .and(header("authorization", "Bearer a1"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"event_flier\"; filename=\"flier.png\""))
        .and(body_string_contains("image/png"))
        .and(body_string_contains("name=\"event_name\""))
        .and(body_string_contains("Night Market"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .events()
        .create_with_image(&night_market(), flier())
        .await
        .unwrap();

    assert_eq!(created["id"], 42);
}

#[tokio::test]
async fn test_update_event_with_image_is_replayed_after_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/inventory/organizer/events/42/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a2",
            "refresh": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/inventory/organizer/events/42/"))
        .and(header("authorization", "Bearer a2"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"event_flier\""))
        .and(body_string_contains("Late Night Market"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let updated = client
        .events()
        .update_with_image(42, &json!({"event_name": "Late Night Market"}), flier())
        .await
        .unwrap();

    assert_eq!(updated["id"], 42);
}

#[tokio::test]
async fn test_change_password_email_and_token_reset() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/account/change_password/"))
        .and(body_json(json!({"email": "ada@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "sent"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/account/reset_password/"))
        .and(body_json(json!({"token": "t1", "password": "n3w-pass"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "reset"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let account = client.account();

    let sent = account
        .send_change_password_email(&json!({"email": "ada@example.com"}))
        .await
        .unwrap();
    assert_eq!(sent["detail"], "sent");

    let reset = account
        .reset_password_with_token(&json!({"token": "t1", "password": "n3w-pass"}))
        .await
        .unwrap();
    assert_eq!(reset["detail"], "reset");
}
