//! 틱 수신 엔드포인트.
//!
//! 브리지(또는 신뢰된 퍼블리셔)가 호출하는 쓰기 경로입니다. 두
//! 엔드포인트 모두 `x-ingest-token` 헤더를 요구합니다. 토큰 검증이
//! 캐시 변경보다 먼저 수행되므로 거부된 요청은 어떤 상태도 바꾸지
//! 않습니다.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rtd_core::domain::{SheetRecord, Tick};
use rtd_core::error::RtdError;
use rtd_core::types::{is_valid_ticker, normalize_ticker};

use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 수신 라우터를 생성합니다.
pub fn ingest_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/update", post(update))
}

/// `/ingest` 요청 본문.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub ticker: String,
    pub price: Decimal,
    /// 생략하면 서버 수신 시각을 사용합니다.
    pub ts: Option<DateTime<Utc>>,
}

/// `/ingest` 응답 본문.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub ticker: String,
    pub price: Decimal,
    pub ts: DateTime<Utc>,
}

/// `x-ingest-token` 헤더를 검증합니다.
fn check_token(headers: &HeaderMap, state: &AppState) -> Result<(), RtdError> {
    let token = headers
        .get("x-ingest-token")
        .and_then(|value| value.to_str().ok());

    match token {
        Some(token) if token == state.ingest_token => Ok(()),
        _ => Err(RtdError::Auth("invalid ingest token".to_string())),
    }
}

/// 틱 수신.
///
/// 캐시에 반영하고, 요청 레지스터를 갱신하고, 구독자에게
/// 브로드캐스트합니다. 브로드캐스트는 fire-and-forget이며 실패해도
/// 이 응답에는 영향을 주지 않습니다.
///
/// # 엔드포인트
///
/// `POST /ingest`
async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    check_token(&headers, &state).map_err(api_error)?;

    let ticker = normalize_ticker(&request.ticker);
    if !is_valid_ticker(&ticker) {
        return Err(api_error(RtdError::Validation(format!(
            "invalid ticker: {:?}",
            request.ticker
        ))));
    }

    let tick = Tick::new(&ticker, request.price, request.ts);
    info!(ticker = %tick.ticker, price = %tick.price, "Tick ingested");

    state.store.insert(tick.clone()).await;
    state.store.set_requested(&ticker).await;

    // 구독자 전달은 응답과 분리
    let dispatcher = state.dispatcher.clone();
    let broadcast_tick = tick.clone();
    tokio::spawn(async move {
        let delivered = dispatcher
            .broadcast(&broadcast_tick.ticker, &broadcast_tick)
            .await;
        debug!(ticker = %broadcast_tick.ticker, delivered, "Tick broadcast");
    });

    Ok(Json(IngestResponse {
        ok: true,
        ticker: tick.ticker,
        price: tick.price,
        ts: tick.ts,
    }))
}

/// 시트 레코드 부분 업데이트.
///
/// 보낸 필드만 공유 레코드에 병합합니다. `ticker`와 `preco`가 함께
/// 오면 틱 캐시에도 반영되어 `/ingest`와 같은 경로로 구독자에게
/// 전달됩니다.
///
/// # 엔드포인트
///
/// `POST /update`
async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SheetRecord>,
) -> ApiResult<Json<SheetRecord>> {
    check_token(&headers, &state).map_err(api_error)?;

    let mut update = request;
    if let Some(raw) = &update.ticker {
        let ticker = normalize_ticker(raw);
        if !is_valid_ticker(&ticker) {
            return Err(api_error(RtdError::Validation(format!(
                "invalid ticker: {:?}",
                raw
            ))));
        }
        update.ticker = Some(ticker);
    }

    let merged = state.store.merge_sheet(&update).await;

    if let Some(ticker) = &update.ticker {
        state.store.set_requested(ticker).await;

        if let Some(price) = update.price {
            let tick = Tick::new(ticker, price, None);
            state.store.insert(tick.clone()).await;

            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.broadcast(&tick.ticker, &tick).await;
            });
        }
    }

    debug!(?merged, "Sheet record merged");
    Ok(Json(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("x-ingest-token", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_normalizes_and_caches() {
        let state = create_test_state();
        let app = ingest_router().with_state(Arc::new(state.clone()));

        let response = app
            .oneshot(post_json(
                "/ingest",
                Some("test-token"),
                serde_json::json!({ "ticker": "bbas3", "price": 10.5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["ticker"], "BBAS3");

        let tick = state.store.get("BBAS3").await.unwrap();
        assert_eq!(tick.price, dec!(10.5));
        assert_eq!(state.store.requested().await.as_deref(), Some("BBAS3"));
    }

    #[tokio::test]
    async fn test_ingest_rejects_bad_token_without_mutation() {
        let state = create_test_state();
        let app = ingest_router().with_state(Arc::new(state.clone()));

        let response = app
            .oneshot(post_json(
                "/ingest",
                Some("wrong"),
                serde_json::json!({ "ticker": "BBAS3", "price": 10.5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");

        // 거부된 요청은 캐시를 건드리지 않음
        assert!(state.store.get("BBAS3").await.is_none());
        assert_eq!(state.store.requested().await, None);
    }

    #[tokio::test]
    async fn test_ingest_missing_token_rejected() {
        let app = ingest_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(post_json(
                "/ingest",
                None,
                serde_json::json!({ "ticker": "BBAS3", "price": 10.5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ingest_rejects_blank_ticker() {
        let app = ingest_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(post_json(
                "/ingest",
                Some("test-token"),
                serde_json::json!({ "ticker": "   ", "price": 10.5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_merges_and_feeds_cache() {
        let state = create_test_state();
        let app = ingest_router().with_state(Arc::new(state.clone()));

        let response = app
            .clone()
            .oneshot(post_json(
                "/update",
                Some("test-token"),
                serde_json::json!({ "ticker": "bbas3", "preco": 10.5 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ticker"], "BBAS3");
        assert_eq!(json["preco"], 10.5);

        // 가격이 포함된 업데이트는 틱 캐시에도 반영됨
        assert_eq!(state.store.get("BBAS3").await.unwrap().price, dec!(10.5));

        // 부분 업데이트는 이전 필드를 유지
        let response = app
            .oneshot(post_json(
                "/update",
                Some("test-token"),
                serde_json::json!({ "strike": "12.00", "delta": 0.42, "negocios": 87 }),
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["ticker"], "BBAS3");
        assert_eq!(json["strike"], "12.00");
        assert_eq!(json["delta"], 0.42);
        assert_eq!(json["negocios"], 87);
    }

    #[tokio::test]
    async fn test_update_requires_token() {
        let app = ingest_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(post_json(
                "/update",
                None,
                serde_json::json!({ "ticker": "BBAS3" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
