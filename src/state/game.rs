use std::time::SystemTime;

use thiserror::Error;

use crate::state::{hold::Counter, layout::Viewport};

/// Smallest table the tracker supports.
pub const MIN_PLAYERS: usize = 2;
/// Largest table the tracker supports.
pub const MAX_PLAYERS: usize = 6;
/// Commander damage from a single opponent that conventionally loses the game.
pub const COMMANDER_LETHAL: i64 = 21;
/// Commander damage from a single opponent that triggers the warning styling.
pub const COMMANDER_WARNING: i64 = 18;
/// Poison counters that lose the game.
pub const INFECT_LETHAL: i64 = 10;
/// Poison counters that trigger the warning styling.
pub const INFECT_WARNING: i64 = 8;
/// Upper clamp for poison counters.
pub const INFECT_MAX: i64 = 20;

/// Colour handed out when the configured palette is empty.
const FALLBACK_COLOR: &str = "#ffffff";

/// Errors raised by the game store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No game is currently in progress.
    #[error("no game in progress")]
    NoGame,
    /// The player index does not exist in the current game.
    #[error("unknown player {0}")]
    UnknownPlayer(usize),
    /// Player count outside of the supported table sizes.
    #[error("player count must be between {MIN_PLAYERS} and {MAX_PLAYERS} (got {0})")]
    InvalidPlayerCount(usize),
    /// Starting life must be a positive integer.
    #[error("starting life must be positive (got {0})")]
    InvalidStartingLife(i64),
}

/// Validated parameters for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSetup {
    num_players: usize,
    starting_life: i64,
}

impl GameSetup {
    /// Validate the setup values, rejecting anything that would build a malformed game.
    pub fn new(num_players: usize, starting_life: i64) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(GameError::InvalidPlayerCount(num_players));
        }
        if starting_life < 1 {
            return Err(GameError::InvalidStartingLife(starting_life));
        }
        Ok(Self {
            num_players,
            starting_life,
        })
    }
}

/// A seat at the table and its counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// 0-based seat index, stable for the lifetime of the game.
    pub id: usize,
    /// Display name, never blank.
    pub name: String,
    /// Accent colour taken from the configured palette.
    pub color: String,
    /// Life total, unbounded in both directions.
    pub life: i64,
    /// Commander damage received, one slot per player index. The own slot stays 0.
    pub commander_damage: Vec<i64>,
    /// Poison counters, clamped to `[0, INFECT_MAX]`.
    pub infect: i64,
}

/// Display-only aggregation of the commander damage a player has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommanderDamageSummary {
    /// Sum over every opponent.
    pub total: i64,
    /// Largest amount received from a single opponent.
    pub max: i64,
    /// `max` has reached the warning threshold.
    pub near_lethal: bool,
    /// Opponents whose damage reached the lethal threshold.
    pub lethal_from: Vec<usize>,
}

impl Player {
    fn new(id: usize, setup: GameSetup, color: String) -> Self {
        Self {
            id,
            name: default_name(id),
            color,
            life: setup.starting_life,
            commander_damage: vec![0; setup.num_players],
            infect: 0,
        }
    }

    /// A player is dead once life drops to zero or poison reaches the lethal count.
    ///
    /// Commander damage is display-only and never kills on its own.
    pub fn is_dead(&self) -> bool {
        self.life <= 0 || self.infect >= INFECT_LETHAL
    }

    /// Poison is close to lethal.
    pub fn infect_warning(&self) -> bool {
        self.infect >= INFECT_WARNING
    }

    /// Current value of one of the hold-adjustable counters.
    pub fn counter(&self, counter: Counter) -> i64 {
        match counter {
            Counter::Life => self.life,
            Counter::Infect => self.infect,
        }
    }

    /// Iterate over `(dealer, damage)` pairs, skipping the player's own slot.
    pub fn opponent_damage(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.commander_damage
            .iter()
            .copied()
            .enumerate()
            .filter(move |(dealer, _)| *dealer != self.id)
    }

    /// Aggregate received commander damage for display.
    pub fn commander_summary(&self) -> CommanderDamageSummary {
        let mut total = 0i64;
        let mut max = 0i64;
        let mut lethal_from = Vec::new();
        for (dealer, damage) in self.opponent_damage() {
            total = total.saturating_add(damage);
            max = max.max(damage);
            if damage >= COMMANDER_LETHAL {
                lethal_from.push(dealer);
            }
        }

        CommanderDamageSummary {
            total,
            max,
            near_lethal: max >= COMMANDER_WARNING,
            lethal_from,
        }
    }
}

/// A running game.
#[derive(Debug, Clone)]
pub struct Game {
    /// Life each player started with, also the per-player reset target.
    pub starting_life: i64,
    /// Players ordered by id.
    pub players: Vec<Player>,
    /// When the game was started.
    pub started_at: SystemTime,
}

impl Game {
    /// Seats at the table, fixed once the game started.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }
}

/// Authoritative in-memory store for the table.
///
/// Every mutation is synchronous and total over its integer input: values saturate
/// instead of overflowing and only `infect` and commander damage are clamped.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    game: Option<Game>,
    viewport: Viewport,
}

impl GameState {
    /// Create an empty store with no game in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently running game, if any.
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// Running game or [`GameError::NoGame`].
    pub fn require_game(&self) -> Result<&Game, GameError> {
        self.game.as_ref().ok_or(GameError::NoGame)
    }

    /// Whether the last reported viewport is taller than wide.
    pub fn is_portrait(&self) -> bool {
        self.viewport.is_portrait()
    }

    /// Record new viewport dimensions, returning the recomputed orientation.
    pub fn update_viewport(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        self.is_portrait()
    }

    /// Look up a player of the running game.
    pub fn player(&self, id: usize) -> Result<&Player, GameError> {
        self.require_game()?
            .players
            .get(id)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Replace any running game with a fresh one built from `setup`.
    ///
    /// Colours are assigned from `palette` by seat index, wrapping around when the palette
    /// is shorter than the table.
    pub fn start_game(&mut self, setup: GameSetup, palette: &[String]) -> &Game {
        let players = (0..setup.num_players)
            .map(|id| {
                let color = if palette.is_empty() {
                    FALLBACK_COLOR.to_string()
                } else {
                    palette[id % palette.len()].clone()
                };
                Player::new(id, setup, color)
            })
            .collect();

        self.game.insert(Game {
            starting_life: setup.starting_life,
            players,
            started_at: SystemTime::now(),
        })
    }

    /// Drop the running game. Returns whether a game was in progress.
    pub fn reset_game(&mut self) -> bool {
        self.game.take().is_some()
    }

    /// Add `amount` to a player's life. No clamping.
    pub fn change_life(&mut self, id: usize, amount: i64) -> Result<&Player, GameError> {
        let player = self.player_mut(id)?;
        player.life = player.life.saturating_add(amount);
        Ok(player)
    }

    /// Put a player's life back to the game's starting life.
    pub fn reset_life(&mut self, id: usize) -> Result<&Player, GameError> {
        let starting_life = self.require_game()?.starting_life;
        let player = self.player_mut(id)?;
        player.life = starting_life;
        Ok(player)
    }

    /// Add `amount` to the damage `receiver` took from `dealer`, flooring at 0.
    ///
    /// Self-damage is meaningless and leaves the player untouched.
    pub fn change_commander_damage(
        &mut self,
        receiver: usize,
        dealer: usize,
        amount: i64,
    ) -> Result<&Player, GameError> {
        let num_players = self.require_game()?.num_players();
        if dealer >= num_players {
            return Err(GameError::UnknownPlayer(dealer));
        }

        let player = self.player_mut(receiver)?;
        if dealer != receiver {
            let slot = &mut player.commander_damage[dealer];
            *slot = slot.saturating_add(amount).max(0);
        }
        Ok(player)
    }

    /// Add `amount` to a player's poison counters, clamped to `[0, INFECT_MAX]`.
    pub fn change_infect(&mut self, id: usize, amount: i64) -> Result<&Player, GameError> {
        let player = self.player_mut(id)?;
        player.infect = player.infect.saturating_add(amount).clamp(0, INFECT_MAX);
        Ok(player)
    }

    /// Apply `amount` to whichever counter a hold zone drives.
    pub fn change_counter(
        &mut self,
        id: usize,
        counter: Counter,
        amount: i64,
    ) -> Result<&Player, GameError> {
        match counter {
            Counter::Life => self.change_life(id, amount),
            Counter::Infect => self.change_infect(id, amount),
        }
    }

    /// Rename a player. A name that trims to nothing keeps the previous one.
    pub fn rename_player(&mut self, id: usize, name: &str) -> Result<&Player, GameError> {
        let player = self.player_mut(id)?;
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            player.name = trimmed.to_string();
        }
        Ok(player)
    }

    fn player_mut(&mut self, id: usize) -> Result<&mut Player, GameError> {
        self.game
            .as_mut()
            .ok_or(GameError::NoGame)?
            .players
            .get_mut(id)
            .ok_or(GameError::UnknownPlayer(id))
    }
}

fn default_name(id: usize) -> String {
    format!("Player {}", id + 1)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn palette() -> Vec<String> {
        vec!["#e74c3c".into(), "#3498db".into()]
    }

    fn started(num_players: usize, starting_life: i64) -> GameState {
        let mut state = GameState::new();
        state.start_game(
            GameSetup::new(num_players, starting_life).unwrap(),
            &palette(),
        );
        state
    }

    #[test]
    fn start_game_builds_sequential_players() {
        let state = started(4, 40);
        let game = state.game().unwrap();

        assert_eq!(game.num_players(), 4);
        for (index, player) in game.players.iter().enumerate() {
            assert_eq!(player.id, index);
            assert_eq!(player.name, format!("Player {}", index + 1));
            assert_eq!(player.life, 40);
            assert_eq!(player.commander_damage, vec![0, 0, 0, 0]);
            assert_eq!(player.infect, 0);
        }
        assert_eq!(game.players[2].color, "#e74c3c");
        assert_eq!(game.players[3].color, "#3498db");
    }

    #[test]
    fn setup_rejects_out_of_range_values() {
        assert_eq!(GameSetup::new(1, 40), Err(GameError::InvalidPlayerCount(1)));
        assert_eq!(GameSetup::new(7, 40), Err(GameError::InvalidPlayerCount(7)));
        assert_eq!(GameSetup::new(4, 0), Err(GameError::InvalidStartingLife(0)));
        assert_eq!(
            GameSetup::new(4, -20),
            Err(GameError::InvalidStartingLife(-20))
        );
        assert!(GameSetup::new(2, 1).is_ok());
        assert!(GameSetup::new(6, 1000).is_ok());
    }

    #[test]
    fn empty_palette_falls_back_to_white() {
        let mut state = GameState::new();
        let game = state.start_game(GameSetup::new(2, 20).unwrap(), &[]);
        assert!(game.players.iter().all(|p| p.color == FALLBACK_COLOR));
    }

    #[test]
    fn mutations_without_game_fail() {
        let mut state = GameState::new();
        assert_eq!(state.change_life(0, 1).unwrap_err(), GameError::NoGame);
        assert_eq!(state.change_infect(0, 1).unwrap_err(), GameError::NoGame);
        assert_eq!(state.rename_player(0, "x").unwrap_err(), GameError::NoGame);
    }

    #[test]
    fn unknown_player_is_reported() {
        let mut state = started(3, 40);
        assert_eq!(
            state.change_life(3, 1).unwrap_err(),
            GameError::UnknownPlayer(3)
        );
        assert_eq!(
            state.change_commander_damage(0, 5, 1).unwrap_err(),
            GameError::UnknownPlayer(5)
        );
    }

    #[test]
    fn commander_scenario_clamps_at_zero() {
        let mut state = started(4, 40);

        let player = state.change_life(1, -45).unwrap();
        assert_eq!(player.life, -5);
        assert!(player.is_dead());

        assert_eq!(
            state.change_commander_damage(0, 1, 22).unwrap().commander_damage[1],
            22
        );
        let player = state.change_commander_damage(0, 1, -50).unwrap();
        assert_eq!(player.commander_damage[1], 0);
    }

    #[test]
    fn self_commander_damage_is_a_no_op() {
        let mut state = started(4, 40);
        let before = state.player(2).unwrap().clone();
        let after = state.change_commander_damage(2, 2, 7).unwrap();
        assert_eq!(&before, after);
        assert!(after.opponent_damage().all(|(dealer, _)| dealer != 2));
    }

    #[test]
    fn commander_damage_does_not_kill() {
        let mut state = started(2, 40);
        let player = state.change_commander_damage(0, 1, 30).unwrap();
        assert!(!player.is_dead());

        let summary = player.commander_summary();
        assert_eq!(summary.total, 30);
        assert_eq!(summary.max, 30);
        assert!(summary.near_lethal);
        assert_eq!(summary.lethal_from, vec![1]);
    }

    #[test]
    fn commander_summary_ignores_own_slot() {
        let mut state = started(4, 40);
        state.change_commander_damage(3, 0, 5).unwrap();
        state.change_commander_damage(3, 1, 18).unwrap();
        let summary = state.player(3).unwrap().commander_summary();

        assert_eq!(summary.total, 23);
        assert_eq!(summary.max, 18);
        assert!(summary.near_lethal);
        assert!(summary.lethal_from.is_empty());
    }

    #[test]
    fn infect_kills_at_ten_and_warns_at_eight() {
        let mut state = started(2, 40);
        let player = state.change_infect(0, 8).unwrap();
        assert!(player.infect_warning());
        assert!(!player.is_dead());

        let player = state.change_infect(0, 2).unwrap();
        assert!(player.is_dead());

        let player = state.change_infect(0, 500).unwrap();
        assert_eq!(player.infect, INFECT_MAX);
    }

    #[test]
    fn blank_rename_keeps_previous_name() {
        let mut state = started(2, 40);
        assert_eq!(state.rename_player(0, "  Ada  ").unwrap().name, "Ada");
        assert_eq!(state.rename_player(0, "   ").unwrap().name, "Ada");
        assert_eq!(state.rename_player(0, "").unwrap().name, "Ada");
    }

    #[test]
    fn reset_life_restores_starting_life() {
        let mut state = started(3, 30);
        state.change_life(1, -17).unwrap();
        assert_eq!(state.reset_life(1).unwrap().life, 30);
    }

    #[test]
    fn reset_game_clears_everything() {
        let mut state = started(3, 30);
        assert!(state.reset_game());
        assert!(state.game().is_none());
        assert!(!state.reset_game());
    }

    #[test]
    fn extreme_amounts_saturate() {
        let mut state = started(2, 40);
        assert_eq!(state.change_life(0, i64::MAX).unwrap().life, i64::MAX);
        assert_eq!(state.change_life(1, i64::MIN).unwrap().life, i64::MIN + 40);
        assert_eq!(state.change_life(1, i64::MIN).unwrap().life, i64::MIN);
        assert_eq!(state.change_infect(0, i64::MIN).unwrap().infect, 0);
        assert_eq!(
            state.change_commander_damage(0, 1, i64::MAX).unwrap().commander_damage[1],
            i64::MAX
        );
    }

    #[derive(Debug, Clone)]
    enum Mutation {
        Life(usize, i64),
        Infect(usize, i64),
        Commander(usize, usize, i64),
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            (0usize..4, -1_000i64..1_000).prop_map(|(id, amount)| Mutation::Life(id, amount)),
            (0usize..4, -50i64..50).prop_map(|(id, amount)| Mutation::Infect(id, amount)),
            (0usize..4, 0usize..4, -50i64..50)
                .prop_map(|(receiver, dealer, amount)| Mutation::Commander(receiver, dealer, amount)),
        ]
    }

    proptest! {
        #[test]
        fn counters_stay_within_bounds(mutations in prop::collection::vec(mutation(), 0..64)) {
            let mut state = started(4, 40);
            for mutation in mutations {
                let player = match mutation {
                    Mutation::Life(id, amount) => state.change_life(id, amount).unwrap(),
                    Mutation::Infect(id, amount) => state.change_infect(id, amount).unwrap(),
                    Mutation::Commander(receiver, dealer, amount) => {
                        state.change_commander_damage(receiver, dealer, amount).unwrap()
                    }
                };
                prop_assert_eq!(player.is_dead(), player.life <= 0 || player.infect >= 10);
                prop_assert!((0..=INFECT_MAX).contains(&player.infect));
                prop_assert!(player.commander_damage.iter().all(|damage| *damage >= 0));
                prop_assert_eq!(player.commander_damage[player.id], 0);
            }
        }
    }
}
