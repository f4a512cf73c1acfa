//! 틱 (티커/가격/타임스탬프 관측값).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::normalize_ticker;

/// 한 번의 티커/가격 관측값.
///
/// 생성 후 불변이며, 같은 티커의 다음 틱이 이전 틱을 통째로
/// 대체합니다 (병합 없음, last-write-wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// 정규화된 티커 심볼
    pub ticker: String,
    /// 관측 가격
    pub price: Decimal,
    /// 관측 시각 (RFC 3339)
    pub ts: DateTime<Utc>,
}

impl Tick {
    /// 새 틱을 생성합니다. 티커는 정규화되고 타임스탬프가 없으면
    /// 서버 시각으로 채워집니다.
    pub fn new(ticker: impl AsRef<str>, price: Decimal, ts: Option<DateTime<Utc>>) -> Self {
        Self {
            ticker: normalize_ticker(ticker.as_ref()),
            price,
            ts: ts.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tick_normalizes_ticker() {
        let tick = Tick::new(" bbas3 ", dec!(10.5), None);
        assert_eq!(tick.ticker, "BBAS3");
        assert_eq!(tick.price, dec!(10.5));
    }

    #[test]
    fn test_tick_keeps_explicit_timestamp() {
        let ts = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let tick = Tick::new("PETR4", dec!(30), Some(ts));
        assert_eq!(tick.ts, ts);
    }

    #[test]
    fn test_tick_json_price_is_number() {
        let ts = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let tick = Tick::new("BBAS3", dec!(10.5), Some(ts));
        let json = serde_json::to_string(&tick).unwrap();

        // 가격은 문자열이 아니라 JSON number로 직렬화되어야 함
        assert!(json.contains("\"price\":10.5"));
        assert!(json.contains("\"ticker\":\"BBAS3\""));
    }
}
