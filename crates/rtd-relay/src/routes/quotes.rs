//! 시세 조회 엔드포인트.
//!
//! 캐시는 읽기 전용으로 노출됩니다. 쓰기는 `/ingest`와 `/update`만
//! 수행합니다.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use rtd_core::error::RtdError;
use rtd_core::types::normalize_ticker;

use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 시세 조회 라우터를 생성합니다.
pub fn quotes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickers", get(list_tickers))
        .route("/latest", get(latest))
        .route("/requested", get(requested))
}

/// `/latest` 쿼리 파라미터.
#[derive(Debug, Deserialize)]
struct LatestQuery {
    ticker: Option<String>,
}

/// 캐시에 있는 티커 목록 (정렬됨).
///
/// # 엔드포인트
///
/// `GET /tickers`
async fn list_tickers(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store.tickers().await)
}

/// 최신 틱 조회.
///
/// `ticker` 파라미터가 없으면 전체 캐시를, 있으면 해당 티커의 틱
/// 하나를 반환합니다. 모르는 티커는 404입니다.
///
/// # 엔드포인트
///
/// `GET /latest`
/// `GET /latest?ticker=BBAS3`
async fn latest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestQuery>,
) -> ApiResult<Response> {
    match query.ticker {
        None => Ok(Json(state.store.snapshot().await).into_response()),
        Some(raw) => {
            let ticker = normalize_ticker(&raw);
            match state.store.get(&ticker).await {
                Some(tick) => Ok(Json(tick).into_response()),
                None => Err(api_error(RtdError::NotFound(ticker))),
            }
        }
    }
}

/// 마지막으로 요청된 티커.
///
/// 브리지가 폴링하는 레지스터입니다. 아직 아무 요청도 없었다면
/// `ticker`는 null입니다.
///
/// # 엔드포인트
///
/// `GET /requested`
async fn requested(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "ticker": state.store.requested().await }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rtd_core::domain::Tick;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_latest_unknown_ticker_returns_404() {
        let app = quotes_router().with_state(Arc::new(create_test_state()));

        let response = app.oneshot(get_request("/latest?ticker=XXXX")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_latest_single_ticker_is_case_insensitive() {
        let state = create_test_state();
        state
            .store
            .insert(Tick::new("BBAS3", dec!(10.5), None))
            .await;
        let app = quotes_router().with_state(Arc::new(state));

        let response = app.oneshot(get_request("/latest?ticker=bbas3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["ticker"], "BBAS3");
        assert_eq!(json["price"], 10.5);
    }

    #[tokio::test]
    async fn test_latest_without_param_returns_full_map() {
        let state = create_test_state();
        state
            .store
            .insert(Tick::new("BBAS3", dec!(10.5), None))
            .await;
        state
            .store
            .insert(Tick::new("PETR4", dec!(30.0), None))
            .await;
        let app = quotes_router().with_state(Arc::new(state));

        let response = app.oneshot(get_request("/latest")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["BBAS3"]["price"], 10.5);
        assert_eq!(json["PETR4"]["price"], 30.0);
    }

    #[tokio::test]
    async fn test_tickers_sorted_and_deduplicated() {
        let state = create_test_state();
        state
            .store
            .insert(Tick::new("PETR4", dec!(30.0), None))
            .await;
        state
            .store
            .insert(Tick::new("PETR4", dec!(31.5), None))
            .await;
        state
            .store
            .insert(Tick::new("BBAS3", dec!(10.5), None))
            .await;
        let app = quotes_router().with_state(Arc::new(state));

        let response = app.oneshot(get_request("/tickers")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!(["BBAS3", "PETR4"]));
    }

    #[tokio::test]
    async fn test_requested_register() {
        let state = create_test_state();
        let app = quotes_router().with_state(Arc::new(state.clone()));

        let response = app
            .clone()
            .oneshot(get_request("/requested"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert!(json["ticker"].is_null());

        state.store.set_requested("petr4").await;
        let response = app.oneshot(get_request("/requested")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["ticker"], "PETR4");
    }
}
