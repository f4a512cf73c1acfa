//! 시트 어댑터 추상화.
//!
//! 실제 RTD 시트는 플랫폼 종속적인 COM 자동화 뒤에 있으므로, 브리지는
//! [`SheetSource`] 트레이트만 바라봅니다. 테스트와 로컬 개발에는
//! [`MockSheet`]를 사용합니다.

use std::str::FromStr;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info};

use rtd_core::domain::SheetRecord;
use rtd_core::error::RtdError;

use crate::config::SheetConfig;
use crate::Result;

/// 시트 어댑터 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// 시뮬레이션 시트 (RTD 없이 동작)
    Mock,
}

impl FromStr for SheetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(SheetKind::Mock),
            other => Err(format!("unknown sheet adapter: {other}")),
        }
    }
}

/// RTD 시트 접근 추상화.
///
/// 계약: `write_ticker` 직후의 `read_snapshot`은 이전 티커의 잔존 값
/// 또는 빈 값을 돌려줄 수 있습니다. 호출자는 [`SheetRecord::is_settled`]
/// 로 정착 여부를 판정하고 재시도해야 합니다.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// 시트에 연결합니다. 연결이 끊긴 뒤 재호출할 수 있습니다.
    async fn connect(&self) -> Result<()>;

    /// 티커 셀에 새 티커를 씁니다.
    async fn write_ticker(&self, ticker: &str) -> Result<()>;

    /// 현재 셀 값들을 읽습니다.
    async fn read_snapshot(&self) -> Result<SheetRecord>;
}

/// Mock 시트 내부 상태.
#[derive(Debug, Default)]
struct MockState {
    ticker: Option<String>,
    /// 정착 전에 남은 read 횟수
    unsettled_reads: u32,
}

/// 시뮬레이션 시트.
///
/// 티커를 쓰면 몇 번의 read 동안 빈 스냅샷을 돌려주어 RTD 정착
/// 지연을 흉내 내고, 그 뒤로는 티커에서 유도한 기준가에 지터를 섞은
/// 전체 행(호가, 그릭스, 체결 건수 포함)을 반환합니다.
#[derive(Debug)]
pub struct MockSheet {
    config: SheetConfig,
    state: Mutex<MockState>,
    /// write 후 정착까지 걸리는 read 횟수
    settle_reads: u32,
}

impl MockSheet {
    /// 기본 정착 지연(2회 read)으로 생성합니다.
    pub fn new(config: SheetConfig) -> Self {
        Self::with_settle_reads(config, 2)
    }

    /// 정착까지의 read 횟수를 지정하여 생성합니다.
    pub fn with_settle_reads(config: SheetConfig, settle_reads: u32) -> Self {
        Self {
            config,
            state: Mutex::new(MockState::default()),
            settle_reads,
        }
    }

    /// 티커에서 유도한 셀 시드. 같은 티커는 항상 같은 값을 냅니다.
    fn cell_seed(ticker: &str) -> u32 {
        ticker.bytes().map(u32::from).sum()
    }

    /// 티커에서 유도한 기준가.
    fn base_price(ticker: &str) -> Decimal {
        Decimal::from(Self::cell_seed(ticker) % 90 + 10)
    }
}

impl Default for MockSheet {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

#[async_trait]
impl SheetSource for MockSheet {
    async fn connect(&self) -> Result<()> {
        info!(
            sheet = %self.config.sheet_name,
            workbook = ?self.config.workbook,
            "Mock sheet opened"
        );
        Ok(())
    }

    async fn write_ticker(&self, ticker: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.ticker = Some(ticker.to_string());
        state.unsettled_reads = self.settle_reads;
        debug!(ticker, cell = %self.config.ticker_cell, "Mock sheet ticker written");
        Ok(())
    }

    async fn read_snapshot(&self) -> Result<SheetRecord> {
        let mut state = self.state.lock().await;
        let Some(ticker) = state.ticker.clone() else {
            return Err(RtdError::Sheet("no ticker written yet".to_string()));
        };

        if state.unsettled_reads > 0 {
            // 아직 정착 전: 티커만 채워진 빈 스냅샷
            state.unsettled_reads -= 1;
            return Ok(SheetRecord {
                ticker: Some(ticker),
                ..Default::default()
            });
        }

        let seed = Self::cell_seed(&ticker);
        let base = Self::base_price(&ticker);
        let jitter_cents: i64 = rand::thread_rng().gen_range(-50..=50);
        let price = base + Decimal::new(jitter_cents, 2);
        let spread = Decimal::new(5, 2);

        debug!(ticker = %ticker, cell = %self.config.price_cell, %price, "Mock sheet settled");

        Ok(SheetRecord {
            ticker: Some(ticker),
            price: Some(price),
            strike: Some((base + Decimal::from(2)).to_string()),
            expiry: Some("2026-09-18".to_string()),
            bid: Some(price - spread),
            ask: Some(price + spread),
            delta: Some(Decimal::new(i64::from(seed % 80 + 10), 2)),
            theta: Some(-Decimal::new(i64::from(seed % 5 + 1), 2)),
            implied_vol: Some(Decimal::new(i64::from(seed % 40 + 20), 2)),
            exercise_value: Some(Decimal::new(i64::from(seed % 30), 2)),
            trades: Some(i64::from(seed * 7 % 5000)),
        })
    }
}
