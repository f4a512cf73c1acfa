//! WebSocket 메시지 타입.
//!
//! 텍스트 프레임 명령 파싱과 서버 발신 프레임 직렬화.

use thiserror::Error;

use rtd_core::domain::Tick;
use rtd_core::types::{is_valid_ticker, normalize_ticker};

/// WebSocket 에러.
#[derive(Debug, Error)]
pub enum WsError {
    /// 빈 메시지
    #[error("empty message")]
    Empty,
    /// 티커로 해석할 수 없는 토큰
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),
    /// 직렬화 실패
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 클라이언트에서 서버로 보내는 명령.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// 구독 추가 (`SUB:<ticker>` 또는 bare 티커)
    Subscribe(String),
    /// 구독 해제 (`UNSUB:<ticker>`)
    Unsubscribe(String),
    /// 연결 확인
    Ping,
}

impl ClientCommand {
    /// 텍스트 프레임에서 명령을 파싱합니다.
    ///
    /// 접두사가 없는 토큰은 `SUB:`의 축약형으로 해석됩니다.
    /// 과거 변형의 "짧은 토큰이면 기존 구독을 전부 교체" 휴리스틱은
    /// 의도적으로 제거되었습니다. 교체는 명시적 `UNSUB:`/`SUB:`로만
    /// 표현할 수 있습니다.
    pub fn parse(raw: &str) -> Result<Self, WsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WsError::Empty);
        }

        if trimmed.eq_ignore_ascii_case("PING") {
            return Ok(ClientCommand::Ping);
        }

        if let Some(ticker) = trimmed.strip_prefix("SUB:") {
            return Ok(ClientCommand::Subscribe(parse_ticker(ticker)?));
        }

        if let Some(ticker) = trimmed.strip_prefix("UNSUB:") {
            return Ok(ClientCommand::Unsubscribe(parse_ticker(ticker)?));
        }

        Ok(ClientCommand::Subscribe(parse_ticker(trimmed)?))
    }
}

/// 토큰을 정규화하고 티커로 검증합니다.
fn parse_ticker(token: &str) -> Result<String, WsError> {
    let ticker = normalize_ticker(token);
    if is_valid_ticker(&ticker) {
        Ok(ticker)
    } else {
        Err(WsError::InvalidTicker(token.trim().to_string()))
    }
}

/// 서버에서 클라이언트로 보내는 메시지.
#[derive(Debug, Clone)]
pub enum ServerMessage {
    /// `PING` 응답
    Pong,
    /// 잘못된 입력 알림 (연결 유지)
    Error(String),
    /// 구독한 티커의 틱 (catch-up 스냅샷 포함)
    Tick(Tick),
}

impl ServerMessage {
    /// 텍스트 프레임으로 직렬화합니다.
    pub fn to_frame(&self) -> Result<String, WsError> {
        match self {
            ServerMessage::Pong => Ok("PONG".to_string()),
            ServerMessage::Error(reason) => Ok(format!("ERR:{}", reason)),
            ServerMessage::Tick(tick) => Ok(serde_json::to_string(tick)?),
        }
    }
}
