//! WebSocket 연결 handler.
//!
//! Axum WebSocket 엔드포인트 및 텍스트 프레임 명령 처리.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::messages::{ClientCommand, ServerMessage};
use super::subscriptions::SessionId;
use crate::state::AppState;

/// WebSocket 업그레이드 핸들러.
///
/// # 엔드포인트
///
/// `GET /ws`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (session_id, mut outbound_rx) = state.dispatcher.register().await;
    info!(session = %session_id, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();

    // 발신 태스크: 세션 채널 → 소켓.
    // 세션이 unregister되면 채널이 닫혀 태스크도 종료됩니다.
    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            match message.to_frame() {
                Ok(frame) => {
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize outbound frame: {}", e);
                }
            }
        }
    });

    // 수신 루프: 소켓 → 명령 처리.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(msg) => {
                if !handle_message(&state, &session_id, msg).await {
                    break;
                }
            }
            Err(e) => {
                warn!(session = %session_id, "WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // 세션 정리: 모든 구독자 집합에서 제거
    state.dispatcher.unregister(&session_id).await;
    send_task.abort();

    info!(session = %session_id, "WebSocket disconnected");
}

/// 수신 프레임 처리.
///
/// # Returns
///
/// `true`면 연결 유지, `false`면 연결 종료.
async fn handle_message(state: &AppState, session_id: &SessionId, msg: Message) -> bool {
    match msg {
        Message::Text(text) => {
            match ClientCommand::parse(text.as_str()) {
                Ok(command) => {
                    process_command(state, session_id, command).await;
                }
                Err(e) => {
                    warn!(session = %session_id, "Invalid command: {}", e);
                    // 잘못된 입력은 알리되 연결은 유지
                    state
                        .dispatcher
                        .send_to(session_id, ServerMessage::Error(e.to_string()))
                        .await;
                }
            }
            true
        }
        Message::Binary(_) => {
            warn!(session = %session_id, "Binary frames not supported");
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            debug!(session = %session_id, "Close frame received");
            false
        }
    }
}

/// 파싱된 명령 처리.
async fn process_command(state: &AppState, session_id: &SessionId, command: ClientCommand) {
    match command {
        ClientCommand::Subscribe(ticker) => {
            state.dispatcher.subscribe(session_id, &ticker).await;
            debug!(session = %session_id, ticker = %ticker, "Subscribed");

            // 캐시된 값이 있으면 catch-up 스냅샷 한 건 전송
            if let Some(tick) = state.store.get(&ticker).await {
                state
                    .dispatcher
                    .send_to(session_id, ServerMessage::Tick(tick))
                    .await;
            }
        }

        ClientCommand::Unsubscribe(ticker) => {
            state.dispatcher.unsubscribe(session_id, &ticker).await;
            debug!(session = %session_id, ticker = %ticker, "Unsubscribed");
        }

        ClientCommand::Ping => {
            state.dispatcher.send_to(session_id, ServerMessage::Pong).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use rtd_core::domain::Tick;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_subscribe_sends_catchup_snapshot() {
        let state = create_test_state();
        state
            .store
            .insert(Tick::new("BBAS3", dec!(10.5), None))
            .await;

        let (id, mut rx) = state.dispatcher.register().await;
        process_command(&state, &id, ClientCommand::Subscribe("BBAS3".to_string())).await;

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, ServerMessage::Tick(t) if t.price == dec!(10.5)));
    }

    #[tokio::test]
    async fn test_subscribe_without_cached_value_sends_nothing() {
        let state = create_test_state();

        let (id, mut rx) = state.dispatcher.register().await;
        process_command(&state, &id, ClientCommand::Subscribe("BBAS3".to_string())).await;

        // 캐시가 비어 있으면 다음 ingest까지 아무것도 오지 않음
        assert!(rx.try_recv().is_err());
        assert_eq!(state.dispatcher.subscriber_count("BBAS3").await, 1);
    }

    #[tokio::test]
    async fn test_ping_yields_single_pong() {
        let state = create_test_state();

        let (id, mut rx) = state.dispatcher.register().await;
        process_command(&state, &id, ClientCommand::Subscribe("BBAS3".to_string())).await;
        process_command(&state, &id, ClientCommand::Ping).await;

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, ServerMessage::Pong));
        assert!(rx.try_recv().is_err());
        // 상태 변화 없음
        assert_eq!(state.dispatcher.subscriber_count("BBAS3").await, 1);
    }

    #[tokio::test]
    async fn test_unsub_then_ingest_delivers_to_remaining_only() {
        let state = create_test_state();

        let (a, mut rx_a) = state.dispatcher.register().await;
        let (b, mut rx_b) = state.dispatcher.register().await;
        process_command(&state, &a, ClientCommand::Subscribe("BBAS3".to_string())).await;
        process_command(&state, &b, ClientCommand::Subscribe("BBAS3".to_string())).await;
        process_command(&state, &a, ClientCommand::Unsubscribe("BBAS3".to_string())).await;

        let tick = Tick::new("BBAS3", dec!(11.0), None);
        state.store.insert(tick.clone()).await;
        state.dispatcher.broadcast("BBAS3", &tick).await;

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }
}
