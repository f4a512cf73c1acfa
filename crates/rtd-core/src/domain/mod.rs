//! 도메인 타입.
//!
//! 릴레이 캐시와 시트 레코드에 사용되는 값 타입을 정의합니다.

pub mod sheet;
pub mod tick;

pub use sheet::*;
pub use tick::*;
