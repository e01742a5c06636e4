use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::game::{
        AmountRequest, CommanderDamageRequest, GameSummary, LayoutSummary, PlayerSummary,
        RenameRequest, SetupDefaultsResponse, StartGameRequest, ViewportRequest,
    },
    error::AppError,
    services::game_service,
    state::{SharedState, layout::Viewport},
};

/// Routes handling game setup and direct counter adjustments.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/setup", get(get_setup))
        .route("/game", get(get_game).post(start_game).delete(reset_game))
        .route("/game/viewport", post(update_viewport))
        .route("/game/players/{id}/life", post(change_life))
        .route("/game/players/{id}/life/reset", post(reset_life))
        .route("/game/players/{id}/infect", post(change_infect))
        .route(
            "/game/players/{id}/commander-damage",
            post(change_commander_damage),
        )
        .route("/game/players/{id}/name", put(rename_player))
}

/// Defaults shown by the setup screen.
#[utoipa::path(
    get,
    path = "/setup",
    tag = "game",
    responses((status = 200, description = "Setup defaults", body = SetupDefaultsResponse))
)]
pub async fn get_setup(State(state): State<SharedState>) -> Json<SetupDefaultsResponse> {
    Json(game_service::setup_defaults(&state))
}

/// Snapshot of the running game.
#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses(
        (status = 200, description = "Game in progress", body = GameSummary),
        (status = 404, description = "No game in progress")
    )
)]
pub async fn get_game(State(state): State<SharedState>) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::current_game(&state).await?;
    Ok(Json(summary))
}

/// Start a new game, replacing the one in progress.
#[utoipa::path(
    post,
    path = "/game",
    tag = "game",
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = GameSummary),
        (status = 400, description = "Invalid setup")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<GameSummary>, AppError> {
    payload.validate()?;
    let summary = game_service::start_game(&state, payload).await?;
    Ok(Json(summary))
}

/// Drop the running game and go back to setup.
#[utoipa::path(
    delete,
    path = "/game",
    tag = "game",
    responses(
        (status = 204, description = "Game cleared"),
        (status = 404, description = "No game was running")
    )
)]
pub async fn reset_game(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    if game_service::reset_game(&state).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("no game in progress".into()))
    }
}

/// Report the display's viewport; answers with the resulting seating layout.
#[utoipa::path(
    post,
    path = "/game/viewport",
    tag = "game",
    request_body = ViewportRequest,
    responses((status = 200, description = "Layout updated", body = LayoutSummary))
)]
pub async fn update_viewport(
    State(state): State<SharedState>,
    Json(payload): Json<ViewportRequest>,
) -> Result<Json<LayoutSummary>, AppError> {
    payload.validate()?;
    let viewport = Viewport::new(payload.width, payload.height);
    Ok(Json(game_service::update_viewport(&state, viewport).await))
}

#[utoipa::path(
    post,
    path = "/game/players/{id}/life",
    tag = "game",
    params(("id" = usize, Path, description = "Player id")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Life changed", body = PlayerSummary),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "No game in progress")
    )
)]
pub async fn change_life(
    State(state): State<SharedState>,
    Path(id): Path<usize>,
    Json(payload): Json<AmountRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = game_service::change_life(&state, id, payload.amount).await?;
    Ok(Json(player))
}

#[utoipa::path(
    post,
    path = "/game/players/{id}/life/reset",
    tag = "game",
    params(("id" = usize, Path, description = "Player id")),
    responses((status = 200, description = "Life reset to the starting life", body = PlayerSummary))
)]
pub async fn reset_life(
    State(state): State<SharedState>,
    Path(id): Path<usize>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = game_service::reset_life(&state, id).await?;
    Ok(Json(player))
}

#[utoipa::path(
    post,
    path = "/game/players/{id}/infect",
    tag = "game",
    params(("id" = usize, Path, description = "Player id")),
    request_body = AmountRequest,
    responses((status = 200, description = "Poison counters changed", body = PlayerSummary))
)]
pub async fn change_infect(
    State(state): State<SharedState>,
    Path(id): Path<usize>,
    Json(payload): Json<AmountRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = game_service::change_infect(&state, id, payload.amount).await?;
    Ok(Json(player))
}

/// Adjust the damage the player received from one opponent's commander.
#[utoipa::path(
    post,
    path = "/game/players/{id}/commander-damage",
    tag = "game",
    params(("id" = usize, Path, description = "Receiving player id")),
    request_body = CommanderDamageRequest,
    responses(
        (status = 200, description = "Commander damage changed", body = PlayerSummary),
        (status = 404, description = "Unknown receiver or dealer")
    )
)]
pub async fn change_commander_damage(
    State(state): State<SharedState>,
    Path(id): Path<usize>,
    Json(payload): Json<CommanderDamageRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player =
        game_service::change_commander_damage(&state, id, payload.dealer_id, payload.amount)
            .await?;
    Ok(Json(player))
}

#[utoipa::path(
    put,
    path = "/game/players/{id}/name",
    tag = "game",
    params(("id" = usize, Path, description = "Player id")),
    request_body = RenameRequest,
    responses((status = 200, description = "Player renamed", body = PlayerSummary))
)]
pub async fn rename_player(
    State(state): State<SharedState>,
    Path(id): Path<usize>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = game_service::rename_player(&state, id, &payload.name).await?;
    Ok(Json(player))
}
