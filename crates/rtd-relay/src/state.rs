//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 스토어와 디스패처를 소유하고 Axum의 State extractor를
//! 통해 핸들러에 주입됩니다. Arc로 래핑되어 요청 간에 안전하게
//! 공유됩니다.

use std::sync::Arc;

use rtd_core::config::AppConfig;

use crate::store::TickStore;
use crate::websocket::{create_dispatcher, SharedDispatcher};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 틱 캐시 + 시트 레코드 + 요청 레지스터
    pub store: Arc<TickStore>,

    /// WebSocket 구독 디스패처 - 티커별 fan-out
    pub dispatcher: SharedDispatcher,

    /// `/ingest`와 `/update`가 요구하는 공유 시크릿
    pub ingest_token: String,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 설정에서 새로운 AppState를 생성합니다.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(TickStore::new()),
            dispatcher: create_dispatcher(),
            ingest_token: config.auth.ingest_token.clone(),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초)을 반환합니다.
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 고정 토큰 `"test-token"`을 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let mut config = AppConfig::default();
    config.auth.ingest_token = "test-token".to_string();
    AppState::new(&config)
}
