//! 인메모리 틱 스토어.
//!
//! 릴레이의 유일한 상태입니다: 티커별 최신 틱, 공유 시트 레코드,
//! 그리고 브리지가 폴링하는 "요청된 티커" 레지스터. 재시작 시 모두
//! 사라집니다 (영속화는 비목표). 모듈 전역이 아니라 `AppState`를 통해
//! 핸들러에 주입됩니다.

use std::collections::HashMap;

use tokio::sync::RwLock;

use rtd_core::domain::{SheetRecord, Tick};
use rtd_core::types::normalize_ticker;

/// 틱 캐시 + 시트 레코드 + 요청 레지스터.
///
/// 키는 항상 정규화된 티커입니다. 같은 티커에 대한 동시 ingest가
/// 경합하면 마지막 쓰기가 이깁니다 (순서 보장 없음).
#[derive(Debug, Default)]
pub struct TickStore {
    /// 티커 → 최신 틱. 무제한 증가, 축출 없음.
    latest: RwLock<HashMap<String, Tick>>,
    /// `/update`가 병합하는 단일 공유 레코드
    sheet: RwLock<SheetRecord>,
    /// 프런트엔드가 마지막으로 요청한 티커
    requested: RwLock<Option<String>>,
}

impl TickStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 틱을 무조건 덮어씁니다 (타임스탬프 비교 없음).
    pub async fn insert(&self, tick: Tick) {
        let mut latest = self.latest.write().await;
        latest.insert(tick.ticker.clone(), tick);
    }

    /// 티커의 최신 틱을 반환합니다.
    pub async fn get(&self, ticker: &str) -> Option<Tick> {
        let key = normalize_ticker(ticker);
        self.latest.read().await.get(&key).cloned()
    }

    /// 전체 캐시의 스냅샷을 반환합니다.
    pub async fn snapshot(&self) -> HashMap<String, Tick> {
        self.latest.read().await.clone()
    }

    /// 알려진 티커 키를 정렬된 순서로 반환합니다.
    pub async fn tickers(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.latest.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 캐시된 티커 수.
    pub async fn len(&self) -> usize {
        self.latest.read().await.len()
    }

    /// 캐시가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.latest.read().await.is_empty()
    }

    /// 요청된 티커 레지스터를 갱신합니다.
    pub async fn set_requested(&self, ticker: impl AsRef<str>) {
        let mut requested = self.requested.write().await;
        *requested = Some(normalize_ticker(ticker.as_ref()));
    }

    /// 마지막으로 요청된 티커를 반환합니다.
    pub async fn requested(&self) -> Option<String> {
        self.requested.read().await.clone()
    }

    /// 부분 업데이트를 공유 시트 레코드에 병합하고 결과를 반환합니다.
    pub async fn merge_sheet(&self, update: &SheetRecord) -> SheetRecord {
        let mut sheet = self.sheet.write().await;
        sheet.merge(update);
        sheet.clone()
    }

    /// 현재 공유 시트 레코드의 사본을 반환합니다.
    pub async fn sheet(&self) -> SheetRecord {
        self.sheet.read().await.clone()
    }
}
