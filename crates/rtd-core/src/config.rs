//! 릴레이 서버 설정 관리.
//!
//! 설정은 세 겹으로 적층됩니다: 하드코딩된 기본값 → `config/default.toml`
//! (있는 경우) → `RTD__` 접두사 환경변수. 브리지는 원본 `.env` 계약을
//! 따르는 별도의 env 기반 설정을 사용합니다 (`rtd-bridge`의 `config` 모듈).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RtdError, RtdResult};

/// 릴레이 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// `/ingest`와 `/update`가 요구하는 공유 시크릿 (`x-ingest-token` 헤더)
    pub ingest_token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // 원본 구현의 개발용 기본값. 운영에서는 반드시 교체.
            ingest_token: "RTD_123456!".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 실패하지 않습니다. 모든 필드에 기본값이 있으므로
    /// 빈 환경에서도 로드가 성공합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> RtdResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("auth.ingest_token", "RTD_123456!")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("RTD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize().map_err(RtdError::from)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> RtdResult<Self> {
        Self::load("config/default.toml")
    }

    /// `host:port` 바인딩 주소 문자열을 반환합니다.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
