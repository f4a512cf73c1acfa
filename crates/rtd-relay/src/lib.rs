//! HTTP + WebSocket 릴레이 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST 엔드포인트 (`/health`, `/tickers`, `/latest`,
//!   `/requested`, `/ingest`, `/update`)
//! - 티커 구독/브로드캐스트를 위한 WebSocket 서버 (`/ws`)
//! - 프로세스 생존 기간 동안만 유지되는 인메모리 틱 스토어
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`store`]: 인메모리 틱 캐시 + 공유 시트 레코드
//! - [`routes`]: REST API 엔드포인트
//! - [`websocket`]: 구독 디스패처와 WebSocket 핸들러
//! - [`error`]: 통합 API 에러 응답

pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod websocket;

pub use error::{api_error, ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
pub use store::TickStore;
pub use websocket::{
    create_dispatcher, websocket_handler, ClientCommand, Dispatcher, ServerMessage,
    SharedDispatcher, WsError,
};

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
