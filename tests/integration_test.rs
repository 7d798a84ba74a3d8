mod common;

use serde_json::Value;

#[tokio::test]
async fn health_check_reports_database() {
    let app = common::spawn_app().await;
    let resp = app.client.get(&app.addr).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = common::spawn_app().await;
    let resp = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["paths"]["/api/v1/posts/{id}/upvote"].is_object());
}

#[tokio::test]
async fn first_visit_is_issued_a_session_cookie() {
    let app = common::spawn_app().await;
    let resp = app.client.get(app.url("/posts")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let cookie = resp
        .headers()
        .get("set-cookie")
        .expect("session cookie issued")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("user_session=user_"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn presented_session_is_not_reissued() {
    let app = common::spawn_app().await;
    let resp = app
        .client
        .get(app.url("/posts"))
        .header("cookie", "user_session=user_returning")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("set-cookie").is_none());

    let resp = app
        .client
        .get(app.url("/posts"))
        .header("x-session-id", "user_headeronly")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = common::spawn_app().await;
    let resp = app.client.get(app.url("/stats")).send().await.unwrap();
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(resp.headers().get("content-security-policy").is_some());
}
