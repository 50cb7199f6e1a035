//! Extractors that report malformed input as [`AppError::Validation`] (422)
//! instead of axum's default plain-text rejections.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        #[serde(default)]
        skip: u32,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/items",
                post(|ValidJson(payload): ValidJson<Payload>| async move { payload.name }).get(
                    |ValidQuery(paging): ValidQuery<Paging>| async move { paging.skip.to_string() },
                ),
            )
            .route(
                "/items/{id}",
                get(|ValidPath(id): ValidPath<i64>| async move { id.to_string() }),
            )
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn missing_body_field_is_422() {
        let request = Request::post("/items")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"other": 1}"#))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"][0], "body");
        assert_eq!(body["detail"][0]["type"], "value_error");
    }

    #[tokio::test]
    async fn broken_json_is_422() {
        let request = Request::post("/items")
            .header("content-type", "application/json")
            .body(Body::from("{"))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["type"], "json_invalid");
    }

    #[tokio::test]
    async fn negative_query_value_is_422() {
        let request = Request::get("/items?skip=-1").body(Body::empty()).unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"][0], "query");
    }

    #[tokio::test]
    async fn non_integer_path_is_422() {
        let request = Request::get("/items/abc").body(Body::empty()).unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"][0], "path");
    }

    #[tokio::test]
    async fn valid_input_passes_through() {
        let request = Request::get("/items/42").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
