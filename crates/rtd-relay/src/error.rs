//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공하고,
//! `rtd-core`의 에러 분류를 HTTP 상태 코드로 매핑합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rtd_core::error::RtdError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "ticker XXXX não encontrado",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHORIZED", "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// `RtdError`를 HTTP 응답으로 매핑합니다.
///
/// 분류 체계: Auth → 401, Validation → 422, NotFound → 404,
/// 나머지는 500. Network/Sheet 에러는 원래 HTTP 호출자에게
/// 전파되지 않아야 하므로 여기 도달하면 내부 에러로 취급합니다.
pub fn api_error(err: RtdError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match &err {
        RtdError::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        RtdError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        RtdError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RtdError::SettleTimeout { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "SETTLE_TIMEOUT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}
