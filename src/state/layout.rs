//! Seating layout: which player cards are drawn upside down for the far side of the table.

/// Viewport dimensions reported by the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl Viewport {
    /// Build a viewport from its dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Taller than wide. A square screen counts as landscape.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Decide whether `player_id`'s card is rotated 180° so a player seated across reads it upright.
///
/// In portrait the top half of the grid is flipped; in landscape every other card is.
pub fn should_rotate(player_id: usize, num_players: usize, is_portrait: bool) -> bool {
    match (num_players, is_portrait) {
        (2 | 3, _) => player_id == 0,
        (4, true) => player_id < 2,
        (5 | 6, true) => player_id < 3,
        (4..=6, false) => player_id % 2 == 0,
        _ => false,
    }
}

/// Rotation decision for every seat of a table.
pub fn rotations(num_players: usize, is_portrait: bool) -> Vec<bool> {
    (0..num_players)
        .map(|id| should_rotate(id, num_players, is_portrait))
        .collect()
}
