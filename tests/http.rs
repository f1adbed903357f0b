mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use restaurant_manager::{app, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

const NS: &str = "/easy-restaurant-manage/v1";

async fn router() -> Router {
    app(common::state().await, &Settings::default())
}

async fn call(router: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(format!("{}{}", NS, path))
        .header("content-type", "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn starters() -> Value {
    json!({"name": "Starters", "description": "Small plates", "branch_id": "1"})
}

#[tokio::test]
async fn create_then_get() {
    let router = router().await;
    let payload = json!({"name": "Drinks", "description": "Cold drinks", "branch_id": "1"});
    let (status, body) = call(&router, Method::POST, "/postCategory", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category created successfully");
    let id = body["category_data"]["id"].as_i64().unwrap();
    assert!(id > 0);

    let (status, body) = call(&router, Method::GET, &format!("/get-category/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category retrieved successfully");
    assert_eq!(body["category_data"]["name"], "Drinks");
    assert_eq!(body["category_data"]["description"], "Cold drinks");
    assert_eq!(body["category_data"]["branch_id"], 1);
}

#[tokio::test]
async fn invalid_body_returns_validation_envelope() {
    let router = router().await;
    let (status, body) = call(
        &router,
        Method::POST,
        "/postCategory",
        Some(json!({"name": "", "description": "ok", "branch_id": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "success": false,
            "data": {
                "message": "Validation failed",
                "errors": {"name": ["Category name is required."]}
            }
        })
    );

    let (_, list) = call(&router, Method::GET, "/get-categories", None).await;
    assert_eq!(list["categories_data"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_validated_as_empty() {
    let router = router().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{}/postCategory", NS))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let errors = body["data"]["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
}

#[tokio::test]
async fn update_returns_refreshed_category() {
    let router = router().await;
    call(&router, Method::POST, "/postCategory", Some(starters())).await;
    let (status, body) = call(
        &router,
        Method::PUT,
        "/update-category/1",
        Some(json!({"name": "Appetizers", "description": "Before mains", "branch_id": "2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category updated successfully");
    assert_eq!(body["category_data"]["name"], "Appetizers");
    assert_eq!(body["category_data"]["branch_id"], 2);

    let (status, body) = call(&router, Method::PUT, "/update-category/9", Some(starters())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Failed to update category"}));
}

#[tokio::test]
async fn delete_removes_category() {
    let router = router().await;
    call(&router, Method::POST, "/postCategory", Some(starters())).await;
    let (status, body) = call(&router, Method::DELETE, "/delete-category/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Category deleted successfully"}));

    let (status, body) = call(&router, Method::DELETE, "/delete-category/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Failed to delete category"}));
}

#[tokio::test]
async fn missing_or_invalid_id_fails_to_get() {
    let router = router().await;
    for path in ["/get-category/42", "/get-category/abc"] {
        let (status, body) = call(&router, Method::GET, path, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to get category"}));
    }
}

#[tokio::test]
async fn list_with_and_without_pagination() {
    let router = router().await;
    for i in 1..=3 {
        let body = json!({"name": format!("Category {}", i), "description": "d", "branch_id": "1"});
        call(&router, Method::POST, "/postCategory", Some(body)).await;
    }

    let (status, body) = call(&router, Method::GET, "/get-categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Categories retrieved successfully");
    assert_eq!(body["categories_data"].as_array().unwrap().len(), 3);
    assert!(body.get("pagination").is_none());

    let (_, body) = call(&router, Method::GET, "/get-categories?per_page=2&page=2", None).await;
    assert_eq!(body["categories_data"].as_array().unwrap().len(), 1);
    assert_eq!(body["categories_data"][0]["name"], "Category 3");
    assert_eq!(
        body["pagination"],
        json!({"total": 3, "per_page": 2, "current_page": 2, "last_page": 2})
    );
}

#[tokio::test]
async fn health_and_ready_at_root() {
    let router = router().await;
    for path in ["/health", "/ready"] {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
