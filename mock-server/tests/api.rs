use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "secret";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", KEY)
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_is_forbidden() {
    let resp = app(KEY)
        .oneshot(Request::builder().uri("/check?phoneNumber=1").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await, json!({"error": "Forbidden"}));
}

#[tokio::test]
async fn wrong_api_key_is_forbidden() {
    let resp = app(KEY)
        .oneshot(
            Request::builder()
                .uri("/dump-csv")
                .header("x-api-key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- add ---

#[tokio::test]
async fn add_returns_sanitized_number() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/add", r#"{"phoneNumber":"+1 (222) 222-2222"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"phone_number": "2222222222"}));
}

#[tokio::test]
async fn add_without_number_returns_400() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/add", r#"{}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- check ---

#[tokio::test]
async fn check_unknown_number_is_not_listed() {
    let resp = app(KEY)
        .oneshot(get_request("/check?phoneNumber=222-222-2222"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"phone_number": "2222222222", "in_dnc_list": false})
    );
}

#[tokio::test]
async fn check_without_number_returns_400() {
    let resp = app(KEY).oneshot(get_request("/check")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- remove ---

#[tokio::test]
async fn remove_unknown_number_returns_404() {
    let resp = app(KEY)
        .oneshot(json_request("DELETE", "/remove", r#"{"phone_number":"1234567890"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- retrieve ---

#[tokio::test]
async fn retrieve_empty_list_uses_defaults() {
    let resp = app(KEY).oneshot(get_request("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"phone_numbers": [], "page": 1, "limit": 100, "total": 0})
    );
}

// --- batch ---

#[tokio::test]
async fn batch_without_list_returns_400() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/batch-scan", r#"{"phone":"1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full lifecycle ---

#[tokio::test]
async fn dnc_lifecycle() {
    use tower::Service;

    let mut app = app(KEY).into_service();

    // batch add two numbers, one of them twice
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/batch-add",
            r#"{"phone_numbers":["1234567890","987-654-3210","+1 123 456 7890"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"added_phone_numbers": ["1234567890", "9876543210"]})
    );

    // adding an existing number conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/add", r#"{"phoneNumber":"123-456-7890"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // webhook on an existing number is not an error
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/webhook/ghl", r#"{"phone":"9876543210"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"message": "Phone number already exists"})
    );

    // check accepts the server's historical snake_case parameter
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/check?phone_number=%2B11234567890"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["in_dnc_list"], true);

    // batch scan dedupes equivalent formats
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/batch-scan",
            r#"{"phone_numbers":["1234567890","+1 (123) 456-7890","5555555555"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"matched_phone_numbers": ["1234567890"]})
    );

    // second page of size one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/?page=2&limit=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"phone_numbers": ["9876543210"], "page": 2, "limit": 1, "total": 2})
    );

    // csv export
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/dump-csv"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"phone_number\n1234567890\n9876543210\n");

    // remove
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("DELETE", "/remove", r#"{"phone_number":"1234567890"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"message": "Phone number removed", "phone_number": "1234567890"})
    );

    // remove again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("DELETE", "/remove", r#"{"phone_number":"1234567890"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
