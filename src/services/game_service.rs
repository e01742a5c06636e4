//! Game store operations: every mutation takes the store lock, applies one change and
//! publishes the affected player card (or the whole table) on the SSE feed.

use tracing::{debug, info};

use crate::{
    dto::game::{GameSummary, LayoutSummary, PlayerSummary, SetupDefaultsResponse, StartGameRequest},
    error::ServiceError,
    services::{hold_service, sse_events},
    state::{
        SharedState,
        game::{GameError, GameSetup, GameState, Player},
        layout::Viewport,
    },
};

/// Values the setup screen starts from.
pub fn setup_defaults(state: &SharedState) -> SetupDefaultsResponse {
    state.config().setup().into()
}

/// Snapshot of the running game.
pub async fn current_game(state: &SharedState) -> Result<GameSummary, ServiceError> {
    state
        .read_game(|game| {
            game.game()
                .map(|running| GameSummary::new(running, game.is_portrait()))
                .ok_or_else(|| ServiceError::NotFound("no game in progress".into()))
        })
        .await
}

/// Start a new game, cancelling every live gesture of the previous one.
pub async fn start_game(
    state: &SharedState,
    request: StartGameRequest,
) -> Result<GameSummary, ServiceError> {
    let setup = GameSetup::new(request.num_players, request.starting_life)?;
    let config = state.config();

    let summary = {
        let mut game = state.lock_game().await;
        let cancelled = hold_service::cancel_all_locked(state);
        if cancelled > 0 {
            debug!(cancelled, "cancelled hold gestures before starting a new game");
        }
        let is_portrait = game.is_portrait();
        GameSummary::new(game.start_game(setup, config.colors()), is_portrait)
    };

    info!(
        num_players = summary.num_players,
        starting_life = summary.starting_life,
        "game started"
    );
    sse_events::broadcast_game_started(state, &summary);
    Ok(summary)
}

/// Drop the running game and go back to setup. Returns whether a game was running.
pub async fn reset_game(state: &SharedState) -> bool {
    let had_game = {
        let mut game = state.lock_game().await;
        hold_service::cancel_all_locked(state);
        game.reset_game()
    };

    info!(had_game, "game reset");
    sse_events::broadcast_game_reset(state, had_game);
    had_game
}

/// Add `amount` to a player's life.
pub async fn change_life(
    state: &SharedState,
    id: usize,
    amount: i64,
) -> Result<PlayerSummary, ServiceError> {
    let mut game = state.lock_game().await;
    apply_player_mutation(state, &mut game, |game| game.change_life(id, amount))
}

/// Put a player's life back to the starting life.
pub async fn reset_life(state: &SharedState, id: usize) -> Result<PlayerSummary, ServiceError> {
    let mut game = state.lock_game().await;
    apply_player_mutation(state, &mut game, |game| game.reset_life(id))
}

/// Add `amount` to a player's poison counters.
pub async fn change_infect(
    state: &SharedState,
    id: usize,
    amount: i64,
) -> Result<PlayerSummary, ServiceError> {
    let mut game = state.lock_game().await;
    apply_player_mutation(state, &mut game, |game| game.change_infect(id, amount))
}

/// Adjust the commander damage `receiver` took from `dealer`.
pub async fn change_commander_damage(
    state: &SharedState,
    receiver: usize,
    dealer: usize,
    amount: i64,
) -> Result<PlayerSummary, ServiceError> {
    if receiver == dealer {
        debug!(player_id = receiver, "ignoring self commander damage");
    }
    let mut game = state.lock_game().await;
    apply_player_mutation(state, &mut game, |game| {
        game.change_commander_damage(receiver, dealer, amount)
    })
}

/// Rename a player; blank names keep the current one.
pub async fn rename_player(
    state: &SharedState,
    id: usize,
    name: &str,
) -> Result<PlayerSummary, ServiceError> {
    let mut game = state.lock_game().await;
    apply_player_mutation(state, &mut game, |game| game.rename_player(id, name))
}

/// Record the display's viewport and republish the seating layout.
pub async fn update_viewport(state: &SharedState, viewport: Viewport) -> LayoutSummary {
    let layout = {
        let mut game = state.lock_game().await;
        let is_portrait = game.update_viewport(viewport);
        let num_players = game.game().map_or(0, |running| running.num_players());
        LayoutSummary::new(num_players, is_portrait)
    };

    debug!(
        width = viewport.width,
        height = viewport.height,
        is_portrait = layout.is_portrait,
        "viewport updated"
    );
    sse_events::broadcast_layout_changed(state, &layout);
    layout
}

/// Apply a single-player mutation on an already locked store and publish the result.
pub(crate) fn apply_player_mutation<F>(
    state: &SharedState,
    game: &mut GameState,
    mutation: F,
) -> Result<PlayerSummary, ServiceError>
where
    F: FnOnce(&mut GameState) -> Result<&Player, GameError>,
{
    let is_portrait = game.is_portrait();
    let num_players = game.require_game()?.num_players();
    let player = mutation(game)?;
    let summary = PlayerSummary::new(player, num_players, is_portrait);
    sse_events::broadcast_player_updated(state, &summary);
    Ok(summary)
}
