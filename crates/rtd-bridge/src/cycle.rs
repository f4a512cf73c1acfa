//! 폴링 사이클 상태 기계.
//!
//! 매 주기마다 IDLE → WRITE_TICKER → WAIT_SETTLE → READ_VALUES →
//! PUBLISH 순서로 진행합니다. 요청된 티커가 없으면 IDLE에서 끝나고,
//! 티커가 직전 사이클과 같으면 WRITE_TICKER와 WAIT_SETTLE을 건너뜁니다.

use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use rtd_core::domain::Tick;
use rtd_core::error::RtdError;
use rtd_core::types::normalize_ticker;

use crate::client::RelayEndpoint;
use crate::config::PollConfig;
use crate::sheet::SheetSource;
use crate::Result;

/// 사이클 단계 (로깅용).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    WriteTicker,
    WaitSettle,
    ReadValues,
    Publish,
}

/// 시트와 릴레이 사이의 브리지.
pub struct Bridge<S, R> {
    sheet: S,
    relay: R,
    poll: PollConfig,
    /// 직전 사이클에서 시트에 쓴 티커
    last_ticker: Option<String>,
    connected: bool,
}

impl<S: SheetSource, R: RelayEndpoint> Bridge<S, R> {
    /// 새 브리지를 생성합니다.
    pub fn new(sheet: S, relay: R, poll: PollConfig) -> Self {
        Self {
            sheet,
            relay,
            poll,
            last_ticker: None,
            connected: false,
        }
    }

    /// 한 사이클을 실행합니다.
    ///
    /// # Returns
    ///
    /// 발행한 틱. 요청된 티커가 없으면 `None`.
    pub async fn run_cycle(&mut self) -> Result<Option<Tick>> {
        // IDLE: 릴레이에서 요청 티커 폴링
        let Some(requested) = self.relay.fetch_requested().await? else {
            debug!(phase = ?CyclePhase::Idle, "No ticker requested");
            return Ok(None);
        };
        let ticker = normalize_ticker(&requested);

        if !self.connected {
            self.sheet.connect().await?;
            self.connected = true;
            info!("Sheet connected");
        }

        // WRITE_TICKER + WAIT_SETTLE: 티커가 바뀐 경우에만
        if self.last_ticker.as_deref() != Some(&ticker) {
            debug!(phase = ?CyclePhase::WriteTicker, ticker = %ticker, "Writing ticker");
            if let Err(e) = self.sheet.write_ticker(&ticker).await {
                self.connected = false;
                self.last_ticker = None;
                return Err(e);
            }
            self.last_ticker = Some(ticker.clone());

            debug!(phase = ?CyclePhase::WaitSettle, "Waiting for RTD to settle");
            sleep(self.poll.settle_delay()).await;
        }

        // READ_VALUES: 정착할 때까지 제한된 재시도
        let record = self.read_settled(&ticker).await?;

        // PUBLISH
        debug!(phase = ?CyclePhase::Publish, ticker = %ticker, "Publishing snapshot");
        let price = record
            .price
            .ok_or_else(|| RtdError::Sheet("settled record without price".to_string()))?;
        let tick = Tick::new(&ticker, price, None);

        self.relay.publish_tick(&tick).await?;

        // 시트 레코드 발행 실패는 틱 전달에 영향을 주지 않음
        if let Err(e) = self.relay.publish_record(&record).await {
            warn!(ticker = %ticker, "Failed to publish sheet record: {}", e);
        }

        info!(ticker = %tick.ticker, price = %tick.price, "Cycle published");
        Ok(Some(tick))
    }

    /// 정착된 스냅샷을 읽습니다. 한도 내에 정착하지 않으면
    /// `SettleTimeout`으로 포기합니다.
    async fn read_settled(&mut self, ticker: &str) -> Result<rtd_core::domain::SheetRecord> {
        let mut attempts = 0;
        loop {
            let record = match self.sheet.read_snapshot().await {
                Ok(record) => record,
                Err(e) => {
                    // 재연결 후에는 새 시트에 티커를 반드시 다시 씀
                    self.connected = false;
                    self.last_ticker = None;
                    return Err(e);
                }
            };

            if record.is_settled() {
                return Ok(record);
            }

            attempts += 1;
            if attempts >= self.poll.settle_retries {
                // 포기: 다음 사이클에서 처음부터 다시 시도
                self.last_ticker = None;
                return Err(RtdError::SettleTimeout {
                    ticker: ticker.to_string(),
                    attempts,
                });
            }

            debug!(
                phase = ?CyclePhase::ReadValues,
                ticker, attempts, "Snapshot not settled yet"
            );
            sleep(self.poll.settle_retry_delay()).await;
        }
    }

    /// 데몬 루프: Ctrl+C까지 주기적으로 사이클을 실행합니다.
    pub async fn run(&mut self) -> Result<()> {
        info!(interval_secs = self.poll.interval_secs, "Bridge loop started");

        let mut ticker_interval = interval(self.poll.interval());
        ticker_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("종료 신호 수신, 브리지 종료 중...");
                    break;
                }
                _ = ticker_interval.tick() => {
                    match self.run_cycle().await {
                        Ok(Some(tick)) => {
                            debug!(ticker = %tick.ticker, "Cycle complete");
                        }
                        Ok(None) => {}
                        Err(e) if e.is_retryable() => {
                            warn!("Cycle failed, retrying next interval: {}", e);
                        }
                        Err(e) => {
                            error!("Cycle failed: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
