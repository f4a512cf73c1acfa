//! 시트 레코드 (스프레드시트 행의 스냅샷).
//!
//! 브리지가 읽는 고정 셀들(티커, 가격, 행사가, 만기, 호가, 그릭스,
//! 체결 건수)을 하나의 레코드로 표현합니다. `/update` 엔드포인트는 이
//! 레코드의 부분 집합을 받아 공유 레코드에 병합합니다. 필드의 wire
//! 이름은 원래 스프레드시트 열 이름(`preco`, `vencimento`, `vol_imp`,
//! `vl_ex`, `negocios`)을 유지합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 스프레드시트 한 행의 (부분) 스냅샷.
///
/// 모든 필드가 선택적입니다. 브리지가 셀을 읽는 도중 일부만 갱신된
/// torn read는 알려진 한계로 받아들입니다 (보정하지 않음).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRecord {
    /// 티커 셀 값
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// 가격 셀 값
    #[serde(rename = "preco", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// 행사가 셀 값
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<String>,
    /// 만기 셀 값
    #[serde(rename = "vencimento", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// 매수 호가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,
    /// 매도 호가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,
    /// 델타
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Decimal>,
    /// 세타
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<Decimal>,
    /// 내재 변동성 셀 값
    #[serde(rename = "vol_imp", skip_serializing_if = "Option::is_none")]
    pub implied_vol: Option<Decimal>,
    /// 행사 가치 셀 값
    #[serde(rename = "vl_ex", skip_serializing_if = "Option::is_none")]
    pub exercise_value: Option<Decimal>,
    /// 체결 건수 셀 값
    #[serde(rename = "negocios", skip_serializing_if = "Option::is_none")]
    pub trades: Option<i64>,
}

impl SheetRecord {
    /// 부분 업데이트를 병합합니다.
    ///
    /// `update`에 존재하는 필드만 덮어쓰고 나머지는 유지합니다.
    pub fn merge(&mut self, update: &SheetRecord) {
        if let Some(ticker) = &update.ticker {
            self.ticker = Some(ticker.clone());
        }
        if let Some(price) = update.price {
            self.price = Some(price);
        }
        if let Some(strike) = &update.strike {
            self.strike = Some(strike.clone());
        }
        if let Some(expiry) = &update.expiry {
            self.expiry = Some(expiry.clone());
        }
        if let Some(bid) = update.bid {
            self.bid = Some(bid);
        }
        if let Some(ask) = update.ask {
            self.ask = Some(ask);
        }
        if let Some(delta) = update.delta {
            self.delta = Some(delta);
        }
        if let Some(theta) = update.theta {
            self.theta = Some(theta);
        }
        if let Some(implied_vol) = update.implied_vol {
            self.implied_vol = Some(implied_vol);
        }
        if let Some(exercise_value) = update.exercise_value {
            self.exercise_value = Some(exercise_value);
        }
        if let Some(trades) = update.trades {
            self.trades = Some(trades);
        }
    }

    /// 외부 데이터 소스가 이 행을 채웠는지 확인합니다.
    ///
    /// 빈 가격 또는 0은 "아직 준비 안 됨" 센티널입니다.
    pub fn is_settled(&self) -> bool {
        self.price.map(|p| !p.is_zero()).unwrap_or(false)
    }
}
