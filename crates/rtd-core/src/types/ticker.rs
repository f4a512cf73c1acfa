//! 티커 심볼 정규화 및 검증.
//!
//! 캐시 키와 구독 테이블 키는 항상 정규화된 형태(trim + 대문자)를
//! 사용합니다. 정규화는 한 곳에서만 수행하여 `bbas3`과 `BBAS3`이
//! 서로 다른 키가 되는 일을 막습니다.

/// 티커 최대 길이. B3 옵션 시리즈 코드까지 수용합니다.
pub const MAX_TICKER_LEN: usize = 16;

/// 티커 심볼을 정규화합니다 (공백 제거 + 대문자).
///
/// # 예제
///
/// ```
/// use rtd_core::types::normalize_ticker;
///
/// assert_eq!(normalize_ticker("  bbas3 "), "BBAS3");
/// ```
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 정규화된 티커가 유효한 심볼인지 확인합니다.
///
/// 비어 있거나, 내부 공백을 포함하거나, 프로토콜 구분자(`:`)를
/// 포함하거나, 최대 길이를 넘으면 유효하지 않습니다.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && !ticker.contains(char::is_whitespace)
        && !ticker.contains(':')
}
