use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether a game is running and how many gestures are live.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let game_in_progress = state.read_game(|game| game.game().is_some()).await;
    HealthResponse::ok(game_in_progress, state.holds().len())
}
