//! 실시간 틱 스트리밍을 위한 WebSocket 서버.
//!
//! 구독은 티커 단위이며, 프로토콜은 텍스트 프레임만 사용합니다.
//!
//! # 클라이언트 → 서버
//!
//! - `SUB:<ticker>` - 구독 추가 (기존 구독 유지)
//! - `UNSUB:<ticker>` - 해당 구독만 해제
//! - `PING` - 연결 확인
//! - `<ticker>` - `SUB:<ticker>`의 축약형 (첫 메시지가 초기 구독이
//!   되는 기존 동작 유지; 다른 구독을 해제하지는 않음)
//!
//! # 서버 → 클라이언트
//!
//! - 구독한 티커의 틱: `Tick`의 JSON 직렬화
//! - `PONG` - `PING` 응답
//! - `ERR:<reason>` - 잘못된 입력에 대한 응답 (연결은 유지)

pub mod handler;
pub mod messages;
pub mod subscriptions;

pub use handler::websocket_handler;
pub use messages::{ClientCommand, ServerMessage, WsError};
pub use subscriptions::{create_dispatcher, Dispatcher, SessionId, SharedDispatcher};
