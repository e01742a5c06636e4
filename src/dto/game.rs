use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::SetupDefaults,
    dto::format_system_time,
    state::{
        game::{COMMANDER_LETHAL, Game, MAX_PLAYERS, MIN_PLAYERS, Player},
        layout::{rotations, should_rotate},
    },
};

/// Payload starting a new game, replacing any game in progress.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartGameRequest {
    #[validate(range(min = 2, max = 6))]
    pub num_players: usize,
    #[validate(range(min = 1))]
    pub starting_life: i64,
}

/// Signed adjustment applied to a counter.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AmountRequest {
    pub amount: i64,
}

/// Adjustment of the commander damage a player received from `dealer_id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommanderDamageRequest {
    pub dealer_id: usize,
    pub amount: i64,
}

/// New display name for a player. Blank names are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameRequest {
    pub name: String,
}

/// Viewport dimensions reported by the display on load and on every resize.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ViewportRequest {
    #[validate(range(min = 1))]
    pub width: u32,
    #[validate(range(min = 1))]
    pub height: u32,
}

/// Values the setup screen starts from.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetupDefaultsResponse {
    pub num_players: usize,
    pub starting_life: i64,
    pub min_players: usize,
    pub max_players: usize,
}

impl From<SetupDefaults> for SetupDefaultsResponse {
    fn from(value: SetupDefaults) -> Self {
        Self {
            num_players: value.num_players,
            starting_life: value.starting_life,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
        }
    }
}

/// Damage received from one opponent.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CommanderDamageEntry {
    pub dealer_id: usize,
    pub damage: i64,
    pub lethal: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Projection of one player card, enough to repaint it without the rest of the table.
pub struct PlayerSummary {
    pub id: usize,
    pub name: String,
    pub color: String,
    pub life: i64,
    pub infect: i64,
    pub dead: bool,
    pub infect_warning: bool,
    /// Opponents only; the player's own slot is never exposed.
    pub commander_damage: Vec<CommanderDamageEntry>,
    pub commander_total: i64,
    pub commander_max: i64,
    pub commander_near_lethal: bool,
    /// Opponents whose commander alone has dealt lethal damage.
    pub commander_lethal_from: Vec<usize>,
    /// Card is drawn upside down for a player seated across the table.
    pub rotated: bool,
}

impl PlayerSummary {
    /// Project a player for a table of `num_players` in the given orientation.
    pub fn new(player: &Player, num_players: usize, is_portrait: bool) -> Self {
        let summary = player.commander_summary();
        Self {
            id: player.id,
            name: player.name.clone(),
            color: player.color.clone(),
            life: player.life,
            infect: player.infect,
            dead: player.is_dead(),
            infect_warning: player.infect_warning(),
            commander_damage: player
                .opponent_damage()
                .map(|(dealer_id, damage)| CommanderDamageEntry {
                    dealer_id,
                    damage,
                    lethal: damage >= COMMANDER_LETHAL,
                })
                .collect(),
            commander_total: summary.total,
            commander_max: summary.max,
            commander_near_lethal: summary.near_lethal,
            commander_lethal_from: summary.lethal_from,
            rotated: should_rotate(player.id, num_players, is_portrait),
        }
    }
}

/// Snapshot of the whole table.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub started_at: String,
    pub num_players: usize,
    pub starting_life: i64,
    pub is_portrait: bool,
    pub players: Vec<PlayerSummary>,
}

impl GameSummary {
    /// Project the running game in the given orientation.
    pub fn new(game: &Game, is_portrait: bool) -> Self {
        let num_players = game.num_players();
        Self {
            started_at: format_system_time(game.started_at),
            num_players,
            starting_life: game.starting_life,
            is_portrait,
            players: game
                .players
                .iter()
                .map(|player| PlayerSummary::new(player, num_players, is_portrait))
                .collect(),
        }
    }
}

/// Orientation and per-seat rotation, re-sent whenever the viewport changes.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct LayoutSummary {
    pub is_portrait: bool,
    /// Rotation decision indexed by player id; empty when no game is running.
    pub rotations: Vec<bool>,
}

impl LayoutSummary {
    /// Compute the layout for `num_players` seats (0 when no game is running).
    pub fn new(num_players: usize, is_portrait: bool) -> Self {
        Self {
            is_portrait,
            rotations: rotations(num_players, is_portrait),
        }
    }
}
