//! Router construction
//!
//! All routes live under `/api`. Layers (outermost first): CORS, request
//! tracing, handler.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::error::{Error, Result};

/// Build the API router over a shared context
pub fn build_router(ctx: AppContext, server: &ServerConfig) -> Result<Router> {
    let cors = cors_layer(&server.cors_origins)?;

    let router = Router::new()
        .route("/api", get(handlers::info))
        .route("/api/", get(handlers::info))
        .route("/api/symptoms", get(handlers::symptoms))
        .route("/api/conditions", get(handlers::conditions))
        .route("/api/predict", post(handlers::predict))
        .route("/api/analytics", get(handlers::analytics))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| Error::Config(format!("Invalid CORS origin: {}", o)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::FixedClassifier;
    use crate::context::tests::{test_context, test_context_with};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ctx: AppContext) -> Router {
        build_router(ctx, &ServerConfig::default()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn predict_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn info_reports_version() {
        let (ctx, _tmp) = test_context().await;
        let (status, json) = send(app(ctx), get_request("/api/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "AI Symptom Checker API is running!");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn symptoms_listed_in_id_order() {
        let (ctx, _tmp) = test_context().await;
        let (status, json) = send(app(ctx), get_request("/api/symptoms")).await;

        assert_eq!(status, StatusCode::OK);
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0]["id"], 1);
        assert_eq!(list[0]["name"], "Fever");
        assert!(list[0]["description"].is_string());
    }

    #[tokio::test]
    async fn conditions_listed() {
        let (ctx, _tmp) = test_context().await;
        let (status, json) = send(app(ctx), get_request("/api/conditions")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 5);
        assert_eq!(json[2]["name"], "Flu");
        assert_eq!(json[2]["severity"], "Moderate");
    }

    #[tokio::test]
    async fn predict_records_and_returns_probabilities() {
        let (ctx, _tmp) = test_context().await;
        let body = json!({"symptoms": [1, 2, 9], "severities": ["Mild", "Severe", "Moderate"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        let predictions = json["predictions"].as_array().unwrap();
        assert!(!predictions.is_empty());
        let total: f64 = predictions
            .iter()
            .map(|p| p["probability"].as_f64().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(json["top_prediction"], "Flu");
        assert!(json["timestamp"].is_string());

        let record_id = json["record_id"].as_i64().unwrap();
        assert_eq!(ctx.db.count_severities(record_id).await.unwrap(), 3);

        let (_, symptoms) = ctx.decrypt_record(record_id).await.unwrap();
        assert_eq!(symptoms, vec![1, 2, 9]);
    }

    #[tokio::test]
    async fn empty_symptoms_rejected() {
        let (ctx, _tmp) = test_context().await;
        let body = json!({"symptoms": [], "severities": []});
        let (status, json) = send(app(ctx), predict_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "At least one symptom is required");
    }

    #[tokio::test]
    async fn mismatched_lengths_rejected_without_writes() {
        let (ctx, _tmp) = test_context().await;
        let body = json!({"symptoms": [1, 2], "severities": ["Mild"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Each symptom must have a severity");
        let stats = ctx.db.get_stats().await.unwrap();
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.severity_count, 0);
    }

    #[tokio::test]
    async fn out_of_range_id_rejected_without_writes() {
        let (ctx, _tmp) = test_context().await;
        let body = json!({"symptoms": [3, 42], "severities": ["Mild", "Mild"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid symptom ID: 42");
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn invalid_severity_rejected_without_writes() {
        let (ctx, _tmp) = test_context().await;
        let body = json!({"symptoms": [1, 2], "severities": ["Mild", "Extreme"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid severity: Extreme");
        let stats = ctx.db.get_stats().await.unwrap();
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.severity_count, 0);
    }

    #[tokio::test]
    async fn missing_fields_rejected() {
        let (ctx, _tmp) = test_context().await;
        let (status, json) = send(app(ctx), predict_request(json!({"symptoms": [1]}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing symptoms or severities");
    }

    #[tokio::test]
    async fn malformed_body_rejected() {
        let (ctx, _tmp) = test_context().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(app(ctx.clone()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Request body is not valid JSON");

        let body = json!({"symptoms": ["fever"], "severities": ["Mild"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing symptoms or severities");
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn non_object_bodies_are_missing_fields() {
        let (ctx, _tmp) = test_context().await;
        let bodies = [
            json!(null),
            json!([]),
            json!(42),
            json!([[1, 2, 9], ["Mild", "Severe", "Moderate"]]),
        ];

        for body in bodies {
            let (status, json) = send(app(ctx.clone()), predict_request(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
            assert_eq!(json["error"], "Missing symptoms or severities", "body {}", body);
        }
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn missing_content_type_rejected_without_detail() {
        let (ctx, _tmp) = test_context().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .body(Body::from(r#"{"symptoms":[1],"severities":["Mild"]}"#))
            .unwrap();
        let (status, json) = send(app(ctx), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Expected Content-Type: application/json");
    }

    #[tokio::test]
    async fn classifier_failure_returns_generic_500() {
        let clf = FixedClassifier::new(&[("Flu", 0.5), ("Cold", 0.5)], 4);
        let (ctx, _tmp) = test_context_with(Arc::new(clf)).await;
        let body = json!({"symptoms": [1], "severities": ["Mild"]});
        let (status, json) = send(app(ctx.clone()), predict_request(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Prediction failed");
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn analytics_counts_reported_symptoms() {
        let (ctx, _tmp) = test_context().await;
        let router = app(ctx);

        let first = json!({"symptoms": [1, 2], "severities": ["Mild", "Mild"]});
        let second = json!({"symptoms": [2, 5], "severities": ["Severe", "Moderate"]});
        assert_eq!(send(router.clone(), predict_request(first)).await.0, StatusCode::OK);
        assert_eq!(send(router.clone(), predict_request(second)).await.0, StatusCode::OK);

        let (status, json) = send(router, get_request("/api/analytics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                {"symptom": "Cough", "count": 2},
                {"symptom": "Fever", "count": 1},
                {"symptom": "Nausea", "count": 1}
            ])
        );
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let (ctx, _tmp) = test_context().await;
        let req = Request::builder()
            .method("GET")
            .uri("/api/symptoms")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app(ctx).oneshot(req).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }

    #[test]
    fn invalid_cors_origin_is_config_error() {
        assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
        assert!(matches!(
            cors_layer(&["bad\norigin".to_string()]),
            Err(Error::Config(_))
        ));
    }
}
