use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::hold::{Counter, Direction, HoldKey};

/// Zone of a player card targeted by an input event.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct ZoneTarget {
    pub player_id: usize,
    pub counter: Counter,
    pub direction: Direction,
}

impl From<ZoneTarget> for HoldKey {
    fn from(value: ZoneTarget) -> Self {
        HoldKey::new(value.player_id, value.counter, value.direction)
    }
}

/// Pointer and touch events forwarded by the display, tagged by `type`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneInboundMessage {
    PointerDown(ZoneTarget),
    PointerUp(ZoneTarget),
    PointerLeave(ZoneTarget),
    TouchStart(ZoneTarget),
    TouchEnd(ZoneTarget),
    TouchCancel(ZoneTarget),
    Click(ZoneTarget),
    #[serde(other)]
    Unknown,
}

impl ZoneInboundMessage {
    /// Parse one text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent back when an input could not be applied.
pub struct ZoneErrorMessage {
    pub message: String,
}
