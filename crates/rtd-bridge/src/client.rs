//! 릴레이 HTTP 클라이언트.
//!
//! 브리지가 릴레이와 주고받는 세 가지 호출을 트레이트로 묶습니다.
//! 사이클 테스트는 이 트레이트의 인메모리 구현을 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use rtd_core::domain::{SheetRecord, Tick};
use rtd_core::error::RtdError;

use crate::config::BridgeConfig;
use crate::Result;

/// 릴레이 엔드포인트 추상화.
#[async_trait]
pub trait RelayEndpoint: Send + Sync {
    /// 마지막으로 요청된 티커를 조회합니다 (`GET /requested`).
    async fn fetch_requested(&self) -> Result<Option<String>>;

    /// 틱을 발행합니다 (`POST /ingest`).
    async fn publish_tick(&self, tick: &Tick) -> Result<()>;

    /// 시트 레코드를 발행합니다 (`POST /update`).
    async fn publish_record(&self, record: &SheetRecord) -> Result<()>;
}

/// `GET /requested` 응답 본문.
#[derive(Debug, Deserialize)]
struct RequestedResponse {
    ticker: Option<String>,
}

/// reqwest 기반 릴레이 클라이언트.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    ingest_token: String,
}

impl RelayClient {
    /// 설정에서 클라이언트를 생성합니다.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RtdError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            ingest_token: config.ingest_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 응답 상태를 검사하여 에러로 변환합니다.
    fn check_status(status: StatusCode, path: &str) -> Result<()> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(RtdError::Auth(format!(
                "relay rejected ingest token on {path}"
            ))),
            s => Err(RtdError::Network(format!("{path} returned {s}"))),
        }
    }
}

#[async_trait]
impl RelayEndpoint for RelayClient {
    async fn fetch_requested(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.url("/requested"))
            .send()
            .await
            .map_err(|e| RtdError::Network(e.to_string()))?;

        Self::check_status(response.status(), "/requested")?;

        let body: RequestedResponse = response
            .json()
            .await
            .map_err(|e| RtdError::Serialization(e.to_string()))?;

        Ok(body.ticker)
    }

    async fn publish_tick(&self, tick: &Tick) -> Result<()> {
        let response = self
            .client
            .post(self.url("/ingest"))
            .header("x-ingest-token", &self.ingest_token)
            .json(tick)
            .send()
            .await
            .map_err(|e| RtdError::Network(e.to_string()))?;

        Self::check_status(response.status(), "/ingest")?;
        debug!(ticker = %tick.ticker, price = %tick.price, "Tick published");
        Ok(())
    }

    async fn publish_record(&self, record: &SheetRecord) -> Result<()> {
        let response = self
            .client
            .post(self.url("/update"))
            .header("x-ingest-token", &self.ingest_token)
            .json(record)
            .send()
            .await
            .map_err(|e| RtdError::Network(e.to_string()))?;

        Self::check_status(response.status(), "/update")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = BridgeConfig::from_env().unwrap();
        config.api_base = "http://localhost:8000/".to_string();

        let client = RelayClient::new(&config).unwrap();
        assert_eq!(client.url("/ingest"), "http://localhost:8000/ingest");
    }

    #[test]
    fn test_check_status_mapping() {
        assert!(RelayClient::check_status(StatusCode::OK, "/ingest").is_ok());
        assert!(matches!(
            RelayClient::check_status(StatusCode::UNAUTHORIZED, "/ingest"),
            Err(RtdError::Auth(_))
        ));
        assert!(matches!(
            RelayClient::check_status(StatusCode::INTERNAL_SERVER_ERROR, "/ingest"),
            Err(RtdError::Network(_))
        ));
    }
}
