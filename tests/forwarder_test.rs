use reqwest::header;

use loyalty_gateway::kafka::EventType;
use test_utils::{
    closed_address, spawn_gateway, spawn_gateway_with, TestGateway, TestOptions,
    LOGIN_BULKY_PROFILE,
};

#[tokio::test]
async fn test_cookie_survives_the_hop() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .get(app.url("/api/v1/user/u42"))
        .header(header::ACCEPT, "application/json")
        .header(header::COOKIE, "Authorization=abc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "u42");
    assert_eq!(body["cookie"], "Authorization=abc");
}

#[tokio::test]
async fn test_request_id_is_added() {
    let app = spawn_gateway().await;

    let body: serde_json::Value = app
        .client
        .get(app.url("/api/v1/user/u42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!body["request_id"].as_str().unwrap().is_empty());

    let body: serde_json::Value = app
        .client
        .get(app.url("/api/v1/user/u42"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["request_id"], "trace-me");
}

#[tokio::test]
async fn test_every_set_cookie_is_relayed() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .get(app.url("/api/v1/user/u42"))
        .send()
        .await
        .unwrap();

    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(cookies, vec!["a=1; Path=/", "b=2; Path=/; HttpOnly"]);
}

#[tokio::test]
async fn test_backend_error_is_relayed_as_is() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .get(app.url("/api/v1/user/missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "user not found");
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .post(app.url("/api/v1/login"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(TestGateway::credentials())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("Authorization="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_register_emits_user_registered() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .post(app.url("/api/v1/register"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(r#"{"login":"alice","password":"Secret123","email":"alice@example.com"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "u-new");

    let events = app.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::UserRegistered);
    assert_eq!(events[0].user_id, "u-new");
    assert_eq!(events[0].object_id, "u-new");
}

#[tokio::test]
async fn test_failed_register_emits_nothing() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .post(app.url("/api/v1/register"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(TestGateway::credentials())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
    assert!(app.events.events().is_empty());
}

#[tokio::test]
async fn test_large_register_response_is_relayed_without_event() {
    let app = spawn_gateway().await;

    let response = app
        .client
        .post(app.url("/api/v1/register"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(format!(
            r#"{{"login":"{}","password":"Secret123"}}"#,
            LOGIN_BULKY_PROFILE
        ))
        .send()
        .await
        .unwrap();

    // The user exists on the backend, so the caller still gets the 201
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "u-bulky");
    assert_eq!(body["bio"].as_str().unwrap().len(), 2 * 1024 * 1024);

    assert!(app.events.events().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let app = spawn_gateway_with(TestOptions {
        identity_http_url: Some(closed_address().await),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(app.url("/api/v1/login"))
        .body(TestGateway::credentials())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_code"], "BAD_GATEWAY");
}

#[tokio::test]
async fn test_health() {
    let app = spawn_gateway().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}
