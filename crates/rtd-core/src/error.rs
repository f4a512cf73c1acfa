//! RTD 릴레이 시스템의 에러 타입.
//!
//! 릴레이와 브리지 전반에서 사용되는 에러 분류를 정의합니다.
//! HTTP 상태 코드 매핑은 `rtd-relay` 쪽에서 수행합니다.

use thiserror::Error;

/// 핵심 릴레이 에러.
#[derive(Debug, Error)]
pub enum RtdError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 인증 에러 (공유 시크릿 불일치)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 입력 검증 에러 (필수 필드 누락 등)
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 찾을 수 없음 (캐시에 없는 티커 등)
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 시트 자동화 에러 (연결 끊김, 셀 접근 실패)
    #[error("시트 에러: {0}")]
    Sheet(String),

    /// 외부 데이터 소스가 재시도 한도 내에 안정되지 않음
    #[error("settle 타임아웃: 티커 {ticker}, {attempts}회 시도")]
    SettleTimeout {
        /// 요청한 티커
        ticker: String,
        /// 소진한 재시도 횟수
        attempts: u32,
    },

    /// 네트워크 에러 (릴레이 또는 시트 접근 실패)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 릴레이 작업을 위한 Result 타입.
pub type RtdResult<T> = Result<T, RtdError>;

impl RtdError {
    /// 다음 사이클에서 재시도할 수 있는 에러인지 확인합니다.
    ///
    /// 네트워크/시트/settle 에러는 일시적이므로 루프를 계속 돌리고,
    /// 인증·검증 에러는 설정을 고치기 전까지 반복되므로 재시도 대상이 아닙니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RtdError::Network(_) | RtdError::Sheet(_) | RtdError::SettleTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for RtdError {
    fn from(err: serde_json::Error) -> Self {
        RtdError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for RtdError {
    fn from(err: config::ConfigError) -> Self {
        RtdError::Config(err.to_string())
    }
}
