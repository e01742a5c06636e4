use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::{GameSummary, LayoutSummary, PlayerSummary},
        sse::{GameResetEvent, ServerEvent},
    },
    state::SharedState,
};

const EVENT_GAME_STARTED: &str = "game.started";
const EVENT_GAME_RESET: &str = "game.reset";
const EVENT_PLAYER_UPDATED: &str = "player.updated";
const EVENT_LAYOUT_CHANGED: &str = "layout.changed";

/// Broadcast a snapshot of a freshly started game.
pub fn broadcast_game_started(state: &SharedState, summary: &GameSummary) {
    send_event(state, EVENT_GAME_STARTED, summary);
}

/// Broadcast that the table went back to the setup screen.
pub fn broadcast_game_reset(state: &SharedState, had_game: bool) {
    send_event(state, EVENT_GAME_RESET, &GameResetEvent { had_game });
}

/// Broadcast the new projection of a single player card.
pub fn broadcast_player_updated(state: &SharedState, player: &PlayerSummary) {
    send_event(state, EVENT_PLAYER_UPDATED, player);
}

/// Broadcast the orientation and rotation of every seat.
pub fn broadcast_layout_changed(state: &SharedState, layout: &LayoutSummary) {
    send_event(state, EVENT_LAYOUT_CHANGED, layout);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
