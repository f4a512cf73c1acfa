//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use crate::sheet::SheetKind;
use crate::Result;
use rtd_core::error::RtdError;

/// 브리지 전체 설정.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// 릴레이 베이스 URL
    pub api_base: String,
    /// `/ingest`, `/update` 호출에 사용하는 공유 시크릿
    pub ingest_token: String,
    /// 시트 어댑터 종류
    pub sheet_kind: SheetKind,
    /// 시트 설정
    pub sheet: SheetConfig,
    /// 폴링 설정
    pub poll: PollConfig,
}

/// 시트 설정.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// 워크북 파일 경로 (mock 어댑터에서는 무시됨)
    pub workbook: Option<String>,
    /// 시트 이름
    pub sheet_name: String,
    /// 티커를 쓰는 셀
    pub ticker_cell: String,
    /// RTD 수식이 가격을 내는 셀
    pub price_cell: String,
    /// 행사가 셀
    pub strike_cell: String,
    /// 만기 셀
    pub expiry_cell: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            workbook: None,
            sheet_name: "RTD".to_string(),
            ticker_cell: "A2".to_string(),
            price_cell: "B2".to_string(),
            strike_cell: "C2".to_string(),
            expiry_cell: "D2".to_string(),
        }
    }
}

/// 폴링 설정.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// 사이클 주기 (초)
    pub interval_secs: u64,
    /// 티커 변경 후 RTD 정착 대기 (초)
    pub settle_delay_secs: u64,
    /// 정착 재시도 횟수
    pub settle_retries: u32,
    /// 재시도 간격 (밀리초)
    pub settle_retry_delay_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            settle_delay_secs: 3,
            settle_retries: 10,
            settle_retry_delay_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// 환경변수에서 설정 로드.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let sheet_kind: SheetKind = std::env::var("SHEET_ADAPTER")
            .unwrap_or_else(|_| "mock".to_string())
            .parse()
            .map_err(RtdError::Config)?;

        Ok(Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            ingest_token: std::env::var("INGEST_TOKEN")
                .unwrap_or_else(|_| "RTD_123456!".to_string()),
            sheet_kind,
            sheet: SheetConfig {
                workbook: std::env::var("EXCEL_FILE").ok(),
                sheet_name: env_var_string("SHEET_NAME", "RTD"),
                ticker_cell: env_var_string("TICKER_CELL", "A2"),
                price_cell: env_var_string("PRICE_CELL", "B2"),
                strike_cell: env_var_string("STRIKE_CELL", "C2"),
                expiry_cell: env_var_string("EXPIRY_CELL", "D2"),
            },
            poll: PollConfig {
                interval_secs: env_var_parse("POLL_INTERVAL_SECS", 5),
                settle_delay_secs: env_var_parse("SETTLE_DELAY_SECS", 3),
                settle_retries: env_var_parse("SETTLE_RETRIES", 10),
                settle_retry_delay_ms: env_var_parse("SETTLE_RETRY_DELAY_MS", 1000),
            },
        })
    }
}

impl PollConfig {
    /// 사이클 주기를 Duration으로 반환.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 정착 대기를 Duration으로 반환.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// 재시도 간격을 Duration으로 반환.
    pub fn settle_retry_delay(&self) -> Duration {
        Duration::from_millis(self.settle_retry_delay_ms)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용).
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 문자열 로드 (없으면 기본값 사용).
fn env_var_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
