use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod game;
pub mod health;
pub mod sse;
pub mod websocket;
pub mod zones;

/// Compose all route trees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(game::router())
        .merge(zones::router())
        .merge(docs::router());

    api_router.with_state(state)
}
