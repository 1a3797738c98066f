use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::post, Json, Router};
use query_core::{
    HttpClientConfig, HttpRecommendationClient, OfflineRecommendationClient, QueryOrchestrator,
};
use shared::{
    domain::{QueryKind, QueryResult, RawCriteria, RequestState},
    error::ErrorKind,
};
use tokio::net::TcpListener;

async fn settled(orchestrator: &QueryOrchestrator) -> RequestState {
    let mut rx = orchestrator.subscribe_state();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(RequestState::is_settled))
        .await
        .expect("settled in time")
        .expect("state channel open")
        .clone();
    state
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/recommendations")
}

#[tokio::test]
async fn offline_scholarship_search_reaches_succeeded() {
    let orchestrator = QueryOrchestrator::new(Arc::new(OfflineRecommendationClient::new()));

    let handle = orchestrator
        .submit(
            &RawCriteria::default()
                .with_education(" B.Tech ")
                .with_income("2,50,000")
                .with_category("General"),
            QueryKind::Scholarship,
        )
        .await;

    let RequestState::Succeeded(settled_handle, QueryResult::ScholarshipList(items)) =
        settled(&orchestrator).await
    else {
        panic!("expected scholarship list");
    };
    assert_eq!(settled_handle, handle);
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.deadline.is_some()));
}

#[tokio::test]
async fn http_backend_structured_answer_flows_to_course_list() {
    let endpoint = serve(Router::new().route(
        "/recommendations",
        post(|| async {
            Json(serde_json::json!({
                "text": "```json\n[{\"title\": \"Python Programming\", \"provider\": \"Coursera\", \"is_free\": true, \"certificate_offered\": true}, {\"title\": \"Web Development\", \"provider\": \"freeCodeCamp\", \"is_free\": true, \"certificate_offered\": false}]\n```"
            }))
        }),
    ))
    .await;
    let client = HttpRecommendationClient::new(HttpClientConfig {
        endpoint,
        ..HttpClientConfig::default()
    })
    .expect("client");
    let orchestrator = QueryOrchestrator::new(Arc::new(client));

    orchestrator
        .submit(
            &RawCriteria::default().with_interest("technology"),
            QueryKind::Course,
        )
        .await;

    let RequestState::Succeeded(_, QueryResult::CourseList(items)) = settled(&orchestrator).await
    else {
        panic!("expected course list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].provider, "freeCodeCamp");
    assert!(!items[1].certificate_offered);
}

#[tokio::test]
async fn http_rate_limit_surfaces_and_clears() {
    let endpoint = serve(Router::new().route(
        "/recommendations",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "message": "slow down" })),
            )
        }),
    ))
    .await;
    let client = HttpRecommendationClient::new(HttpClientConfig {
        endpoint,
        ..HttpClientConfig::default()
    })
    .expect("client");
    let orchestrator = QueryOrchestrator::new(Arc::new(client));

    let handle = orchestrator
        .submit(
            &RawCriteria::default().with_education("B.Com"),
            QueryKind::Scholarship,
        )
        .await;
    let state = settled(&orchestrator).await;
    assert_eq!(
        state,
        RequestState::Failed(
            handle,
            ErrorKind::BackendError {
                code: 429,
                message: "slow down".into()
            }
        )
    );

    orchestrator.clear_error().await;
    assert_eq!(orchestrator.state(), RequestState::Idle);
}
