use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the life tracker backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::get_setup,
        crate::routes::game::get_game,
        crate::routes::game::start_game,
        crate::routes::game::reset_game,
        crate::routes::game::update_viewport,
        crate::routes::game::change_life,
        crate::routes::game::reset_life,
        crate::routes::game::change_infect,
        crate::routes::game::change_commander_damage,
        crate::routes::game::rename_player,
        crate::routes::zones::get_zone,
        crate::routes::zones::press_zone,
        crate::routes::zones::release_zone,
        crate::routes::zones::tap_zone,
        crate::routes::sse::stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::StartGameRequest,
            crate::dto::game::AmountRequest,
            crate::dto::game::CommanderDamageRequest,
            crate::dto::game::RenameRequest,
            crate::dto::game::ViewportRequest,
            crate::dto::game::SetupDefaultsResponse,
            crate::dto::game::GameSummary,
            crate::dto::game::PlayerSummary,
            crate::dto::game::LayoutSummary,
            crate::dto::hold::HoldSnapshot,
            crate::dto::hold::HoldActionResponse,
            crate::dto::sse::GameResetEvent,
            crate::dto::ws::ZoneTarget,
            crate::dto::ws::ZoneErrorMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game setup and counter adjustments"),
        (name = "zones", description = "Tap and hold zones of player cards"),
        (name = "sse", description = "Change notification stream"),
        (name = "input", description = "WebSocket zone input"),
    )
)]
pub struct ApiDoc;
