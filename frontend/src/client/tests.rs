use std::cell::Cell;
use std::rc::Rc;

use oms_shared::Product;
use oms_shared::protocol::{CurrentUserRequest, HttpMethod, ListProductsRequest};
use serde_json::json;

use super::*;
use crate::error::ApiErrorKind;
use crate::session::SessionState;
use crate::web::route::{AppRoute, GuardDecision};
use crate::web::{MemoryStore, MockTransport};

// =========================================================
// 测试辅助
// =========================================================

const BASE: &str = "http://api.test";

fn setup(entries: &[(&str, &str)]) -> (ApiClient<Rc<MockTransport>>, Rc<MockTransport>, Session) {
    let transport = MockTransport::new();
    let session = Session::new(Rc::new(MemoryStore::with(entries)), "token");
    let client = ApiClient::new(&format!("{}/", BASE), transport.clone(), session.clone());
    (client, transport, session)
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

// =========================================================
// 请求拦截
// =========================================================

#[tokio::test]
async fn attaches_bearer_token_when_session_exists() {
    let (client, transport, _) = setup(&[("token", "jwt-1")]);
    transport.mock(HttpMethod::Get, &url("/products"), 200, json!([]));

    let products: Vec<Product> = client.send(&ListProductsRequest).await.unwrap();

    assert!(products.is_empty());
    let req = transport.last_request().unwrap();
    assert_eq!(req.url, url("/products"));
    assert_eq!(req.header("Authorization"), Some("Bearer jwt-1"));
}

#[tokio::test]
async fn sends_unauthenticated_without_token() {
    let (client, transport, _) = setup(&[]);
    transport.mock(HttpMethod::Get, &url("/products"), 200, json!([]));

    let _: Vec<Product> = client.get("/products").await.unwrap();

    assert_eq!(transport.last_request().unwrap().header("Authorization"), None);
}

#[tokio::test]
async fn post_serializes_json_body() {
    let (client, transport, _) = setup(&[("token", "jwt")]);
    transport.mock(HttpMethod::Post, &url("/products"), 201, json!({"id": 9}));

    let _: serde::de::IgnoredAny = client
        .post("/products", &json!({"name": "筆", "price": 12.5}))
        .await
        .unwrap();

    let req = transport.last_request().unwrap();
    assert_eq!(req.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["price"], json!(12.5));
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let (client, transport, _) = setup(&[("token", "jwt")]);
    transport.mock_raw(HttpMethod::Delete, &url("/orders/3"), 204, "");

    let result: ApiResult<()> = client.delete("/orders/3").await;
    assert!(result.is_ok());
}

// =========================================================
// 响应拦截: 401
// =========================================================

#[tokio::test]
async fn unauthorized_clears_session_through_handler() {
    let (client, transport, session) = setup(&[("token", "stale")]);
    transport.mock(HttpMethod::Get, &url("/orders"), 401, json!({"msg": "Token has expired"}));

    let calls = Rc::new(Cell::new(0));
    let handler_session = session.clone();
    let handler_calls = calls.clone();
    client.on_unauthorized(Rc::new(move |_err| {
        handler_calls.set(handler_calls.get() + 1);
        handler_session.sign_out();
    }));

    let err = client.get::<serde_json::Value>("/orders").await.unwrap_err();

    // 调用方仍然拿到错误
    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Token has expired");
    assert_eq!(calls.get(), 1);
    assert_eq!(session.token(), None);
    assert_eq!(
        AppRoute::Orders.guard(session.state()),
        GuardDecision::Redirect(AppRoute::Login)
    );
}

#[tokio::test]
async fn unauthorized_without_handler_still_clears_session() {
    let (client, transport, session) = setup(&[("token", "stale")]);
    transport.mock(HttpMethod::Get, &url("/products"), 401, json!({}));

    let err = client.get::<serde_json::Value>("/products").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(session.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn quiet_identity_check_does_not_report() {
    let (client, transport, session) = setup(&[("token", "stale")]);
    transport.mock(HttpMethod::Get, &url("/auth/me"), 401, json!({}));

    let calls = Rc::new(Cell::new(0));
    let handler_calls = calls.clone();
    client.on_unauthorized(Rc::new(move |_| handler_calls.set(handler_calls.get() + 1)));

    let err = client
        .send_with(&CurrentUserRequest, Reporting::Quiet)
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(calls.get(), 0);
    // 静默请求不动会话，由调用方决定
    assert_eq!(session.token().as_deref(), Some("stale"));
}

// =========================================================
// 响应拦截: 其他分类
// =========================================================

#[tokio::test]
async fn rejected_write_keeps_session_and_message() {
    let (client, transport, session) = setup(&[("token", "jwt")]);
    transport.mock(
        HttpMethod::Post,
        &url("/orders"),
        400,
        json!({"description": "庫存不足"}),
    );

    let err = client
        .post::<_, serde_json::Value>("/orders", &json!({"items": []}))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Rejected);
    assert_eq!(err.message(), "庫存不足");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn network_failure_is_classified() {
    let (client, transport, session) = setup(&[("token", "jwt")]);
    transport.fail_network();

    let err = client.get::<serde_json::Value>("/products").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Network);
    assert_eq!(err.status, None);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn undecodable_success_body_is_decode_error() {
    let (client, transport, _) = setup(&[("token", "jwt")]);
    transport.mock_raw(HttpMethod::Get, &url("/products"), 200, "<html>");

    let err = client.send(&ListProductsRequest).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Decode);
    assert_eq!(err.status, Some(200));
}
