//! 헬스 체크 엔드포인트.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// 헬스 체크 라우터를 생성합니다.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

/// 기본 헬스 체크.
///
/// # 엔드포인트
///
/// `GET /health`
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 준비 상태 체크.
///
/// 캐시 크기와 연결된 WebSocket 세션 수를 함께 보고합니다.
///
/// # 엔드포인트
///
/// `GET /health/ready`
async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": state.version,
        "uptime_secs": state.uptime_secs(),
        "cached_tickers": state.store.len().await,
        "ws_clients": state.dispatcher.client_count().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        health_router().with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_readiness_check() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["cached_tickers"], 0);
        assert_eq!(json["ws_clients"], 0);
    }
}
