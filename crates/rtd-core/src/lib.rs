//! # RTD Core
//!
//! RTD 릴레이 시스템의 공통 타입과 인프라를 제공합니다.
//!
//! 이 크레이트는 릴레이 서버(`rtd-relay`)와 브리지(`rtd-bridge`)가
//! 공유하는 기반을 제공합니다:
//! - 틱 및 시트 레코드 도메인 타입
//! - 티커 정규화
//! - 에러 분류 체계
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
