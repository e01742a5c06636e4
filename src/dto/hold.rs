use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::hold::{Counter, Direction, HoldKey, HoldPhase, HoldState};

/// Path segments addressing one zone of a player card.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZonePath {
    pub id: usize,
    pub counter: Counter,
    pub direction: Direction,
}

impl From<ZonePath> for HoldKey {
    fn from(value: ZonePath) -> Self {
        HoldKey::new(value.id, value.counter, value.direction)
    }
}

/// Observable state of the gesture on one zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HoldSnapshot {
    pub player_id: usize,
    pub counter: Counter,
    pub direction: Direction,
    pub phase: HoldPhase,
    pub interval_ms: f64,
    pub step: i64,
    pub is_aggressive: bool,
}

impl From<(HoldKey, HoldState)> for HoldSnapshot {
    fn from((key, hold): (HoldKey, HoldState)) -> Self {
        Self {
            player_id: key.player_id,
            counter: key.counter,
            direction: key.direction,
            phase: hold.phase(),
            interval_ms: hold.interval_ms(),
            step: hold.step(),
            is_aggressive: hold.is_aggressive(),
        }
    }
}

/// Acknowledgement of a press or release.
#[derive(Debug, Serialize, ToSchema)]
pub struct HoldActionResponse {
    /// For a press: the gesture started. For a release: a gesture was cancelled.
    pub active: bool,
}
