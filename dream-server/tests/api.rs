//! End-to-end tests driving the router in-process

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dream_server::{create_router, AnalysisPool, AppState, Config, HistoryStore, ModelState};

const BOUNDARY: &str = "dream-test-boundary";

fn test_config() -> Config {
    Config {
        worker_threads: 2,
        rate_limit_per_minute: 0,
        ..Config::default()
    }
}

fn app_with(config: Config) -> Router {
    let analysis = AnalysisPool::from_config(&config);
    let store = HistoryStore::in_memory(config.history_capacity);
    create_router(AppState::new(config, analysis, store))
}

fn app() -> Router {
    app_with(test_config())
}

fn sine(freq_hz: f64, samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / 250.0).sin())
        .collect()
}

fn sine_csv(freq_hz: f64, samples: usize) -> String {
    sine(freq_hz, samples)
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(",")
}

fn multipart_request(file: &[u8], user: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"signal.csv\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(b"\r\n");
    if let Some(user) = user {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user\"\r\n\r\n{user}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_predict_alpha_sine() {
    let app = app();
    let (status, body) = send(&app, multipart_request(sine_csv(10.0, 500).as_bytes(), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dream"], "Lucid Dream");

    let bands = body["bands"].as_object().unwrap();
    assert_eq!(bands.len(), 4);
    for key in ["delta", "theta", "alpha", "beta"] {
        let value = bands[key].as_f64().unwrap();
        assert!(value.is_finite() && value >= 0.0, "{key} = {value}");
    }
    let alpha = bands["alpha"].as_f64().unwrap();
    assert!(alpha > bands["delta"].as_f64().unwrap());
    assert!(alpha > bands["theta"].as_f64().unwrap());
    assert!(alpha > bands["beta"].as_f64().unwrap());

    assert_eq!(body["signal"].as_array().unwrap().len(), 200);
}

#[tokio::test]
async fn test_confidence_is_rounded_top_probability() {
    let app = app();
    let (status, body) = send(&app, multipart_request(sine_csv(6.0, 1000).as_bytes(), None)).await;
    assert_eq!(status, StatusCode::OK);

    let probs: Vec<f64> = body["probabilities"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(probs.len(), 4);
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-6);

    let top = probs.iter().cloned().fold(f64::MIN, f64::max);
    let expected = (top * 10_000.0).round() / 100.0;
    assert!((body["confidence"].as_f64().unwrap() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = app();
    let (status, body) = send(&app, multipart_request(b"", None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_or_unparsable_input");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_short_signal_is_unprocessable() {
    let app = app();
    let (status, body) = send(&app, multipart_request(b"1,2,3,4,5,6,7,8,9,10", None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_samples");
}

#[tokio::test]
async fn test_oversized_upload() {
    let config = Config {
        max_upload_bytes: 1024,
        ..test_config()
    };
    let app = app_with(config);
    let (status, _) = send(&app, multipart_request(sine_csv(10.0, 2000).as_bytes(), None)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = app();
    let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user\"\r\n\r\nbob\r\n--{BOUNDARY}--\r\n");
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_concurrent_identical_uploads_agree() {
    let app = app();
    let csv = sine_csv(20.0, 750);

    let (a, b) = tokio::join!(
        send(&app, multipart_request(csv.as_bytes(), None)),
        send(&app, multipart_request(csv.as_bytes(), None)),
    );

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_history_lists_predictions_newest_first() {
    let app = app();

    let (status, _) = send(&app, multipart_request(sine_csv(10.0, 500).as_bytes(), Some("alice"))).await;
    assert_eq!(status, StatusCode::OK);

    // Persistence runs detached from the request
    let mut items = Vec::new();
    for _ in 0..50 {
        let (status, body) = send(&app, get("/history/?limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        items = body.as_array().cloned().unwrap_or_default();
        if !items.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item["user"], "alice");
    assert_eq!(item["dream"], "Lucid Dream");
    assert_eq!(item["dominant_band"], "alpha");
    let confidence = item["confidence"].as_f64().unwrap();
    assert!(confidence > 0.0 && confidence <= 1.0);
    assert_eq!(item["fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_history_limit_is_validated() {
    let app = app();
    let (status, body) = send(&app, get("/history?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(&app, get("/history?limit=101")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_ok() {
    let app = app();
    for uri in ["/health", "/health/"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["db"], true);
        assert_eq!(body["model"], true);
        assert_eq!(body["model_version"], "spectral-softmax-v1");
    }
}

#[tokio::test]
async fn test_unavailable_model() {
    let config = test_config();
    let analysis = AnalysisPool::new(ModelState::Unavailable("weights missing".into()), &config);
    let store = HistoryStore::in_memory(config.history_capacity);
    let app = create_router(AppState::new(config, analysis, store));

    let (status, body) = send(&app, get("/health/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db"], true);
    assert_eq!(body["model"], false);

    let (status, body) = send(&app, multipart_request(sine_csv(10.0, 500).as_bytes(), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "model_unavailable");
    assert!(!body["detail"].as_str().unwrap().contains("weights missing"));

    // Band analysis does not need the classifier
    let (status, _) = send(
        &app,
        post_json("/eeg/analyze", serde_json::json!({ "signal": sine(10.0, 500) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit() {
    let config = Config {
        rate_limit_per_minute: 2,
        ..test_config()
    };
    let app = app_with(config);

    let response = app.clone().oneshot(get("/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "2");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "1");

    let (status, _) = send(&app, get("/history")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/history")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    // Health checks stay reachable
    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_eeg_analyze() {
    let app = app();
    let signal = sine(10.0, 500);

    let (status, body) = send(&app, post_json("/eeg/analyze", serde_json::json!({ "signal": signal }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dominant_band"], "alpha");
    assert_eq!(body["quality"], "good");
    for key in ["mean", "std", "min", "max", "median"] {
        assert!(body["statistics"][key].is_number(), "missing {key}");
    }

    let (status, body) = send(&app, post_json("/eeg/analyze", serde_json::json!({ "signal": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // Nyquist below the beta band
    let (status, _) = send(
        &app,
        post_json("/eeg/analyze", serde_json::json!({ "signal": signal, "sampling_rate": 20.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app();
    let (status, body) = send(&app, get("/dream-image/generate")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_pool_outlives_requests() {
    let pool = AnalysisPool::from_config(&test_config());
    let value = pool.run(|| Ok(7)).await;
    assert_eq!(tokio_test::assert_ok!(value), 7);
}

#[tokio::test]
async fn test_health_flags_are_booleans() {
    let app = app();
    let (_, body) = send(&app, get("/health/")).await;
    assert!(body["db"].is_boolean());
    assert!(body["model"].is_boolean());
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let app = app();
    let (status, body) = send(&app, get("/history/?limit=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_query");
    assert_eq!(body["status"], 400);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_json_error() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/eeg/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"signal\": [1.0, 2.0"))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_json");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_non_multipart_predict_is_json_error() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(sine_csv(10.0, 500)))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_multipart");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_bypass_limit() {
    let config = Config {
        rate_limit_per_minute: 1,
        ..test_config()
    };
    let app = app_with(config);

    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = Request::builder()
            .uri("/history")
            .header("x-forwarded-for", format!("203.0.113.{i}"))
            .body(Body::empty())
            .unwrap();
        statuses.push(app.clone().oneshot(req).await.unwrap().status());
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(statuses[1..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_trusted_forwarded_for_keys_per_client() {
    let config = Config {
        rate_limit_per_minute: 1,
        trust_forwarded_for: true,
        ..test_config()
    };
    let app = app_with(config);

    for i in 0..3 {
        let req = Request::builder()
            .uri("/history")
            .header("x-forwarded-for", format!("203.0.113.{i}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_sampling_rate_below_beta_nyquist_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/eeg/analyze", serde_json::json!({ "signal": sine(10.0, 500), "sampling_rate": 50.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("sampling_rate"));

    let (status, _) = send(
        &app,
        post_json("/eeg/analyze", serde_json::json!({ "signal": sine(10.0, 500), "sampling_rate": 60.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
