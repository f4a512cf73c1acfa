//! API 라우트 정의.

pub mod health;
pub mod ingest;
pub mod quotes;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// 전체 API 라우터를 생성합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::health_router())
        .merge(quotes::quotes_router())
        .merge(ingest::ingest_router())
}
