use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Whether a game is currently running.
    pub game_in_progress: bool,
    /// Number of hold gestures currently driving a counter.
    pub active_holds: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(game_in_progress: bool, active_holds: usize) -> Self {
        Self {
            status: "ok".to_string(),
            game_in_progress,
            active_holds,
        }
    }
}
