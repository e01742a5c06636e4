use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ZoneErrorMessage, ZoneInboundMessage},
    error::ServiceError,
    services::hold_service,
    state::{SharedState, hold::HoldKey},
};

/// What a zone input event asks the hold runtime to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneAction {
    Press(HoldKey),
    Release(HoldKey),
    Tap(HoldKey),
}

impl ZoneAction {
    fn from_message(message: ZoneInboundMessage) -> Option<Self> {
        match message {
            ZoneInboundMessage::PointerDown(target) | ZoneInboundMessage::TouchStart(target) => {
                Some(Self::Press(target.into()))
            }
            ZoneInboundMessage::PointerUp(target)
            | ZoneInboundMessage::PointerLeave(target)
            | ZoneInboundMessage::TouchEnd(target)
            | ZoneInboundMessage::TouchCancel(target) => Some(Self::Release(target.into())),
            ZoneInboundMessage::Click(target) => Some(Self::Tap(target.into())),
            ZoneInboundMessage::Unknown => None,
        }
    }
}

/// Handle the lifecycle of a display's input socket.
///
/// Every zone pressed through this socket is released when the socket goes away so a
/// dropped connection cannot leave a counter spinning.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    info!("input socket connected");
    let mut pressed: HashMap<HoldKey, Uuid> = HashMap::new();

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let action = match ZoneInboundMessage::from_json_str(&text) {
                    Ok(message) => ZoneAction::from_message(message),
                    Err(err) => {
                        warn!(error = %err, "failed to parse zone message");
                        send_error(&outbound_tx, format!("invalid message: {err}"));
                        continue;
                    }
                };

                let Some(action) = action else {
                    debug!(payload = %text, "ignoring unknown zone message");
                    continue;
                };

                if let Err(err) = apply_action(&state, &mut pressed, action).await {
                    warn!(?action, error = %err, "zone input rejected");
                    send_error(&outbound_tx, err.to_string());
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(error = %err, "websocket error");
                break;
            }
        }
    }

    let released = release_pressed(&state, &mut pressed).await;
    info!(released, "input socket disconnected");

    finalize(writer_task, outbound_tx).await;
}

async fn apply_action(
    state: &SharedState,
    pressed: &mut HashMap<HoldKey, Uuid>,
    action: ZoneAction,
) -> Result<(), ServiceError> {
    match action {
        ZoneAction::Press(key) => {
            let gesture = hold_service::press(state, key).await?;
            pressed.insert(key, gesture);
        }
        ZoneAction::Release(key) => {
            pressed.remove(&key);
            hold_service::release(state, key).await;
        }
        ZoneAction::Tap(key) => {
            hold_service::tap(state, key).await?;
        }
    }
    Ok(())
}

/// Release the gestures this socket started and that are still live.
///
/// A zone pressed again through another connection keeps that newer gesture.
async fn release_pressed(state: &SharedState, pressed: &mut HashMap<HoldKey, Uuid>) -> usize {
    let mut released = 0;
    for (key, gesture) in pressed.drain() {
        if hold_service::release_gesture(state, key, gesture).await {
            debug!(?key, %gesture, "released hold left open by closed socket");
            released += 1;
        }
    }
    released
}

fn send_error(tx: &mpsc::UnboundedSender<Message>, message: String) {
    match serde_json::to_string(&ZoneErrorMessage { message }) {
        Ok(payload) => {
            let _ = tx.send(Message::Text(payload.into()));
        }
        Err(err) => warn!(error = %err, "failed to serialize zone error"),
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
