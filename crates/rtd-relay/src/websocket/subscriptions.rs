//! WebSocket 구독 디스패처.
//!
//! 티커별 구독자 집합과 세션별 발신 채널을 소유하는 fan-out
//! 추상화입니다. 브로드캐스트는 at-most-once입니다: 한 연결로의 전송
//! 실패는 그 연결만 모든 집합에서 제거하고, 나머지 연결로의 전달은
//! 계속됩니다. 전달 실패는 어떤 HTTP 호출자에게도 보이지 않습니다.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use rtd_core::domain::Tick;

use super::messages::ServerMessage;

/// WebSocket 세션 식별자.
pub type SessionId = Uuid;

/// 클라이언트 세션: 발신 채널 + 구독 중인 티커.
#[derive(Debug)]
struct ClientSession {
    tx: mpsc::UnboundedSender<ServerMessage>,
    tickers: HashSet<String>,
}

/// 세션 테이블과 티커 인덱스.
///
/// 두 맵은 항상 함께 갱신되어야 하므로 하나의 락 아래 둡니다.
#[derive(Debug, Default)]
struct Registry {
    sessions: HashMap<SessionId, ClientSession>,
    by_ticker: HashMap<String, HashSet<SessionId>>,
}

impl Registry {
    /// 세션을 테이블과 모든 티커 집합에서 제거합니다.
    fn remove_session(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.remove(id) {
            for ticker in &session.tickers {
                if let Some(subscribers) = self.by_ticker.get_mut(ticker) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        self.by_ticker.remove(ticker);
                    }
                }
            }
        }
    }
}

/// 구독 디스패처.
///
/// 모든 WebSocket 세션의 구독을 관리하고 티커별로 틱을 fan-out합니다.
#[derive(Debug, Default)]
pub struct Dispatcher {
    inner: RwLock<Registry>,
}

impl Dispatcher {
    /// 새로운 디스패처 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 세션을 등록하고 발신 수신기를 반환합니다.
    pub async fn register(&self) -> (SessionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.inner.write().await;
        inner.sessions.insert(
            id,
            ClientSession {
                tx,
                tickers: HashSet::new(),
            },
        );

        (id, rx)
    }

    /// 세션을 제거합니다. 속해 있던 모든 구독자 집합에서 빠집니다.
    pub async fn unregister(&self, id: &SessionId) {
        let mut inner = self.inner.write().await;
        inner.remove_session(id);
    }

    /// 세션에 티커 구독을 추가합니다 (기존 구독 유지).
    ///
    /// # Returns
    ///
    /// 세션이 존재하면 `true`.
    pub async fn subscribe(&self, id: &SessionId, ticker: &str) -> bool {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.sessions.get_mut(id) else {
            return false;
        };
        session.tickers.insert(ticker.to_string());
        inner
            .by_ticker
            .entry(ticker.to_string())
            .or_default()
            .insert(*id);
        true
    }

    /// 세션에서 해당 티커 구독만 해제합니다.
    pub async fn unsubscribe(&self, id: &SessionId, ticker: &str) {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.sessions.get_mut(id) {
            session.tickers.remove(ticker);
        }
        let now_empty = match inner.by_ticker.get_mut(ticker) {
            Some(subscribers) => {
                subscribers.remove(id);
                subscribers.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.by_ticker.remove(ticker);
        }
    }

    /// 특정 세션으로 메시지를 보냅니다 (PONG, catch-up 스냅샷).
    ///
    /// 모든 발신이 세션 채널 하나를 거치므로 catch-up과 브로드캐스트의
    /// 순서가 유지됩니다.
    pub async fn send_to(&self, id: &SessionId, message: ServerMessage) -> bool {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(id)
            .map(|s| s.tx.send(message).is_ok())
            .unwrap_or(false)
    }

    /// 틱을 해당 티커의 구독자 전원에게 전달합니다.
    ///
    /// 전송에 실패한 세션은 모든 집합에서 제거되며, 나머지 세션으로의
    /// 전달은 중단되지 않습니다.
    ///
    /// # Returns
    ///
    /// 전달에 성공한 세션 수.
    pub async fn broadcast(&self, ticker: &str, tick: &Tick) -> usize {
        let mut inner = self.inner.write().await;

        let subscribers: Vec<SessionId> = match inner.by_ticker.get(ticker) {
            Some(ids) => ids.iter().copied().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut dead: Vec<SessionId> = Vec::new();

        for id in subscribers {
            match inner.sessions.get(&id) {
                Some(session) if session.tx.send(ServerMessage::Tick(tick.clone())).is_ok() => {
                    delivered += 1;
                }
                _ => dead.push(id),
            }
        }

        for id in dead {
            debug!(session = %id, ticker, "Pruning dead subscriber");
            inner.remove_session(&id);
        }

        delivered
    }

    /// 연결된 세션 수.
    pub async fn client_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// 특정 티커의 구독자 수.
    pub async fn subscriber_count(&self, ticker: &str) -> usize {
        self.inner
            .read()
            .await
            .by_ticker
            .get(ticker)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

/// 공유 가능한 디스패처 타입.
pub type SharedDispatcher = Arc<Dispatcher>;

/// 새로운 공유 디스패처 생성.
pub fn create_dispatcher() -> SharedDispatcher {
    Arc::new(Dispatcher::new())
}
