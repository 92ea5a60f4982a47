//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::EngineError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "adaptive_quiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "adaptive_quiz", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "adaptive_quiz", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { code: "invalid_message".into(), message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "code": "serialization", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "adaptive_quiz", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "adaptive_quiz", "WebSocket disconnected");
}

fn ws_error(e: EngineError) -> ServerWsMessage {
  ServerWsMessage::Error { code: e.code().into(), message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,
    ClientWsMessage::NextQuestions(req) => match next_questions(state, req).await {
      Ok(out) => ServerWsMessage::NextQuestions(out),
      Err(e) => ws_error(e),
    },
    ClientWsMessage::Evaluate { responses } => match evaluate_responses(state, &responses) {
      Ok(out) => ServerWsMessage::Evaluation(out),
      Err(e) => ws_error(e),
    },
    ClientWsMessage::ResetAttempt { attempt_id } => {
      ServerWsMessage::AttemptReset(reset_attempt(state, attempt_id.into_key()).await)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ServiceConfig;

  fn state() -> AppState {
    let mut cfg = ServiceConfig::default();
    cfg.engine.seed = Some(3);
    AppState::from_config(&cfg)
  }

  fn parse(s: &str) -> ClientWsMessage {
    serde_json::from_str(s).unwrap()
  }

  #[tokio::test]
  async fn ping_pongs() {
    let reply = handle_client_ws(parse(r#"{"type":"ping"}"#), &state()).await;
    assert!(matches!(reply, ServerWsMessage::Pong));
  }

  #[tokio::test]
  async fn next_questions_over_ws() {
    let st = state();
    let msg = parse(r#"{"type":"next_questions","attempt_id":"w1","current_difficulty":"medium","max_questions":6,"responses":[]}"#);
    match handle_client_ws(msg, &st).await {
      ServerWsMessage::NextQuestions(out) => {
        assert_eq!(out.computed_score, 0.0);
        assert!(!out.question_ids.is_empty());
      }
      other => panic!("unexpected {other:?}"),
    }
    let reset = handle_client_ws(parse(r#"{"type":"reset_attempt","attempt_id":"w1"}"#), &st).await;
    assert!(matches!(reset, ServerWsMessage::AttemptReset(r) if r.cleared));
  }

  #[tokio::test]
  async fn invalid_tier_over_ws_is_an_error_message() {
    let msg = parse(r#"{"type":"next_questions","attempt_id":1,"current_difficulty":"expert","max_questions":6}"#);
    match handle_client_ws(msg, &state()).await {
      ServerWsMessage::Error { code, .. } => assert_eq!(code, "invalid_input"),
      other => panic!("unexpected {other:?}"),
    }
  }
}
