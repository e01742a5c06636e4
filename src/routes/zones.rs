use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::{
        game::PlayerSummary,
        hold::{HoldActionResponse, HoldSnapshot, ZonePath},
    },
    error::AppError,
    services::hold_service,
    state::{
        SharedState,
        hold::{Counter, Direction, HoldKey},
    },
};

const ZONE_PATH: &str = "/game/players/{id}/zones/{counter}/{direction}";

/// Routes driving the tap and hold zones of player cards.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(ZONE_PATH, get(get_zone))
        .route(&format!("{ZONE_PATH}/press"), post(press_zone))
        .route(&format!("{ZONE_PATH}/release"), post(release_zone))
        .route(&format!("{ZONE_PATH}/tap"), post(tap_zone))
}

/// State of the gesture on a zone.
#[utoipa::path(
    get,
    path = "/game/players/{id}/zones/{counter}/{direction}",
    tag = "zones",
    params(
        ("id" = usize, Path, description = "Player id"),
        ("counter" = Counter, Path, description = "Counter the zone adjusts"),
        ("direction" = Direction, Path, description = "Side of the card")
    ),
    responses((status = 200, description = "Gesture state", body = HoldSnapshot))
)]
pub async fn get_zone(
    State(state): State<SharedState>,
    Path(zone): Path<ZonePath>,
) -> Json<HoldSnapshot> {
    let key = HoldKey::from(zone);
    Json((key, hold_service::snapshot(&state, key)).into())
}

/// Pointer or touch went down on a zone.
#[utoipa::path(
    post,
    path = "/game/players/{id}/zones/{counter}/{direction}/press",
    tag = "zones",
    params(
        ("id" = usize, Path, description = "Player id"),
        ("counter" = Counter, Path, description = "Counter the zone adjusts"),
        ("direction" = Direction, Path, description = "Side of the card")
    ),
    responses(
        (status = 200, description = "Gesture armed", body = HoldActionResponse),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "No game in progress")
    )
)]
pub async fn press_zone(
    State(state): State<SharedState>,
    Path(zone): Path<ZonePath>,
) -> Result<Json<HoldActionResponse>, AppError> {
    hold_service::press(&state, zone.into()).await?;
    Ok(Json(HoldActionResponse { active: true }))
}

/// Pointer or touch left the zone, was lifted or was cancelled.
#[utoipa::path(
    post,
    path = "/game/players/{id}/zones/{counter}/{direction}/release",
    tag = "zones",
    params(
        ("id" = usize, Path, description = "Player id"),
        ("counter" = Counter, Path, description = "Counter the zone adjusts"),
        ("direction" = Direction, Path, description = "Side of the card")
    ),
    responses((status = 200, description = "Gesture ended", body = HoldActionResponse))
)]
pub async fn release_zone(
    State(state): State<SharedState>,
    Path(zone): Path<ZonePath>,
) -> Json<HoldActionResponse> {
    let active = hold_service::release(&state, zone.into()).await;
    Json(HoldActionResponse { active })
}

/// Single click on a zone: one unit in the zone's direction.
#[utoipa::path(
    post,
    path = "/game/players/{id}/zones/{counter}/{direction}/tap",
    tag = "zones",
    params(
        ("id" = usize, Path, description = "Player id"),
        ("counter" = Counter, Path, description = "Counter the zone adjusts"),
        ("direction" = Direction, Path, description = "Side of the card")
    ),
    responses((status = 200, description = "Counter adjusted", body = PlayerSummary))
)]
pub async fn tap_zone(
    State(state): State<SharedState>,
    Path(zone): Path<ZonePath>,
) -> Result<Json<PlayerSummary>, AppError> {
    let player = hold_service::tap(&state, zone.into()).await?;
    Ok(Json(player))
}
