use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use marketplace_core::Store;
use marketplace_http::router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("marketplace.sqlite3")).unwrap();
        Self {
            _dir: dir,
            router: router(store),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.raw(request).await
    }

    async fn raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

fn ann_replacement() -> Value {
    json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "age": 35,
        "email": "a@x.com",
        "role": "customer",
        "phone": null
    })
}

fn ann() -> Value {
    json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "a@x.com",
        "role": "customer"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn customer_order_offer_flow() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::POST, "/users", Some(ann())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1}));

    let (status, body) = app
        .send(
            Method::POST,
            "/orders",
            Some(json!({"name": "Paint walls", "customer_id": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1}));

    let (status, body) = app
        .send(
            Method::POST,
            "/offers",
            Some(json!({"order_id": 1, "executor_id": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1}));

    let (status, body) = app
        .send(
            Method::POST,
            "/offers",
            Some(json!({"order_id": 99, "executor_id": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "foreign_key_error");

    let (status, body) = app.send(Method::GET, "/offers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_user_returns_record() {
    let app = TestApp::new();
    app.send(Method::POST, "/users", Some(ann())).await;

    let (status, body) = app.send(Method::GET, "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ann");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["age"], Value::Null);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.send(Method::POST, "/users", Some(ann())).await;

    let (status, body) = app.send(Method::POST, "/users", Some(ann())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "unique_violation");
}

#[tokio::test]
async fn missing_required_field_is_validation_error() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            Some(json!({"first_name": "Ann", "role": "customer"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("last_name"));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/orders/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");

    let (status, _) = app
        .send(Method::PUT, "/users/42", Some(ann_replacement()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, "/offers/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_invalid_request() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");

    let (status, body) = app
        .send(Method::POST, "/users", Some(json!({"first_name": 5})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");
}

#[tokio::test]
async fn put_replaces_and_patch_merges() {
    let app = TestApp::new();
    app.send(Method::POST, "/users", Some(ann())).await;
    app.send(
        Method::POST,
        "/orders",
        Some(json!({
            "name": "Paint walls",
            "price": 300,
            "address": "1 Main St",
            "customer_id": 1
        })),
    )
    .await;

    let (status, body) = app
        .send(Method::PATCH, "/orders/1", Some(json!({"price": 350})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 350);
    assert_eq!(body["address"], "1 Main St");
    assert_eq!(body["customer_id"], 1);

    let (status, body) = app
        .send(
            Method::PUT,
            "/orders/1",
            Some(json!({
                "name": "Paint ceiling",
                "description": null,
                "start_date": "2024-05-01",
                "end_date": null,
                "address": null,
                "price": null,
                "customer_id": null,
                "executor_id": null
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paint ceiling");
    assert_eq!(body["start_date"], "2024-05-01");
    assert_eq!(body["price"], Value::Null);
    assert_eq!(body["customer_id"], Value::Null);
}

#[tokio::test]
async fn put_with_omitted_key_is_rejected_and_keeps_record() {
    let app = TestApp::new();
    let created = json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "age": 30,
        "email": "a@x.com",
        "role": "customer"
    });
    app.send(Method::POST, "/users", Some(created)).await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/users/1",
            Some(json!({"first_name": "Ann", "last_name": "Lee", "role": "customer"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");

    let (_, body) = app.send(Method::GET, "/users/1", None).await;
    assert_eq!(body["age"], 30);
    assert_eq!(body["email"], "a@x.com");

    let (status, body) = app
        .send(Method::PUT, "/users/1", Some(ann_replacement()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 35);
}

#[tokio::test]
async fn order_with_unknown_customer_is_rejected_without_write() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/orders",
            Some(json!({"name": "Paint walls", "customer_id": 7})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "foreign_key_error");

    let (_, body) = app.send(Method::GET, "/orders", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn delete_returns_id_and_removes_record() {
    let app = TestApp::new();
    app.send(Method::POST, "/users", Some(ann())).await;

    let (status, body) = app.send(Method::DELETE, "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1}));

    let (status, _) = app.send(Method::GET, "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
