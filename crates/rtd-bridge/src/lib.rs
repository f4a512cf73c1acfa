//! RTD 브리지.
//!
//! 릴레이의 요청 레지스터를 폴링하여 시트에 티커를 쓰고, RTD 수식이
//! 정착한 값을 읽어 릴레이로 발행하는 데몬입니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: 환경변수 기반 설정
//! - [`sheet`]: 시트 어댑터 추상화 ([`sheet::SheetSource`])
//! - [`client`]: 릴레이 HTTP 클라이언트 ([`client::RelayEndpoint`])
//! - [`cycle`]: 폴링 사이클 상태 기계

pub mod client;
pub mod config;
pub mod cycle;
pub mod sheet;

pub use client::{RelayClient, RelayEndpoint};
pub use config::BridgeConfig;
pub use cycle::{Bridge, CyclePhase};
pub use sheet::{MockSheet, SheetKind, SheetSource};

/// 브리지 전역 Result 타입.
pub type Result<T> = rtd_core::error::RtdResult<T>;
