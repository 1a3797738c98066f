use std::sync::Arc;

use super::*;
use axum::{
    extract::State,
    http::{HeaderMap as AxumHeaders, StatusCode},
    routing::post,
    Json, Router,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

type Captured = (Option<String>, RecommendationRequest);

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<Captured>>>>,
}

fn criteria() -> QueryCriteria {
    QueryCriteria {
        education_level: "B.Tech".into(),
        annual_income: 250_000,
        category: "General".into(),
        region: None,
        free_text_interest: None,
    }
}

fn config_for(endpoint: String) -> HttpClientConfig {
    HttpClientConfig {
        endpoint,
        api_key: Some("test-key".into()),
        model: Some("test-model".into()),
        timeout_secs: 1,
    }
}

async fn handle_recommendation(
    State(state): State<ServerState>,
    headers: AxumHeaders,
    Json(payload): Json<RecommendationRequest>,
) -> Json<serde_json::Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send((auth, payload));
    }
    Json(serde_json::json!({ "text": "[{\"title\": \"Pragati\"}]" }))
}

async fn serve(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_recording_server() -> Result<(String, oneshot::Receiver<Captured>)> {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/recommendations", post(handle_recommendation))
        .with_state(state);
    Ok((serve(app).await?, rx))
}

#[tokio::test]
async fn posts_prompt_and_unwraps_text_envelope() {
    let (server_url, captured_rx) = spawn_recording_server().await.expect("spawn server");
    let client = HttpRecommendationClient::new(config_for(format!("{server_url}/recommendations")))
        .expect("client");

    let raw = client
        .query(&criteria(), QueryKind::Scholarship)
        .await
        .expect("query");
    assert_eq!(raw, "[{\"title\": \"Pragati\"}]");

    let (auth, request) = captured_rx.await.expect("captured request");
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(request.kind, QueryKind::Scholarship);
    assert_eq!(request.criteria, criteria());
    assert_eq!(request.model.as_deref(), Some("test-model"));
    assert!(request.prompt.contains("- Education: B.Tech"));
}

#[tokio::test]
async fn bare_success_body_is_passed_through() {
    let app = Router::new().route(
        "/recommendations",
        post(|| async { "Try NPTEL and SWAYAM." }),
    );
    let server_url = serve(app).await.expect("spawn server");
    let client = HttpRecommendationClient::new(config_for(format!("{server_url}/recommendations")))
        .expect("client");

    let raw = client
        .query(&criteria(), QueryKind::Course)
        .await
        .expect("query");
    assert_eq!(raw, "Try NPTEL and SWAYAM.");
}

#[tokio::test]
async fn error_status_maps_to_backend_error_with_body_message() {
    let app = Router::new().route(
        "/recommendations",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "error": { "code": 429, "message": "quota exceeded" } })),
            )
        }),
    );
    let server_url = serve(app).await.expect("spawn server");
    let client = HttpRecommendationClient::new(config_for(format!("{server_url}/recommendations")))
        .expect("client");

    let err = client
        .query(&criteria(), QueryKind::Advice)
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ClientError::Backend {
            code: 429,
            message: "quota exceeded".into()
        }
    );
}

#[tokio::test]
async fn error_status_with_plain_body_keeps_text() {
    let app = Router::new().route(
        "/recommendations",
        post(|| async { (StatusCode::BAD_GATEWAY, " upstream model offline \n") }),
    );
    let server_url = serve(app).await.expect("spawn server");
    let client = HttpRecommendationClient::new(config_for(format!("{server_url}/recommendations")))
        .expect("client");

    let err = client
        .query(&criteria(), QueryKind::Course)
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ClientError::Backend {
            code: 502,
            message: "upstream model offline".into()
        }
    );
}

#[tokio::test]
async fn slow_backend_reports_timeout() {
    let app = Router::new().route(
        "/recommendations",
        post(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
            "too late"
        }),
    );
    let server_url = serve(app).await.expect("spawn server");
    let client = HttpRecommendationClient::new(config_for(format!("{server_url}/recommendations")))
        .expect("client");

    let err = client
        .query(&criteria(), QueryKind::Advice)
        .await
        .expect_err("must time out");
    assert_eq!(err, ClientError::Timeout);
}

#[tokio::test]
async fn refused_connection_reports_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpRecommendationClient::new(config_for(format!("http://{addr}/recommendations")))
        .expect("client");
    let err = client
        .query(&criteria(), QueryKind::Scholarship)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Network(_)), "unexpected error: {err:?}");
}

#[test]
fn rejects_invalid_endpoint() {
    let err = HttpRecommendationClient::new(config_for("not a url".into()))
        .err()
        .expect("must fail");
    assert!(err.to_string().contains("invalid recommendation endpoint"));
}
