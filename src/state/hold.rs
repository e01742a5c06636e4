use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Counter a tap zone adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    /// Life total.
    Life,
    /// Poison counters.
    Infect,
}

/// Which of the two zones of a card is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The "+" zone.
    Increment,
    /// The "-" zone.
    Decrement,
}

impl Direction {
    /// `+1` or `-1`.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Increment => 1,
            Direction::Decrement => -1,
        }
    }
}

/// Identifies an independent hold gesture: one per player, counter and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldKey {
    /// Seat whose card is pressed.
    pub player_id: usize,
    /// Counter the zone drives.
    pub counter: Counter,
    /// Zone being pressed.
    pub direction: Direction,
}

impl HoldKey {
    /// Build a key for the given zone.
    pub fn new(player_id: usize, counter: Counter, direction: Direction) -> Self {
        Self {
            player_id,
            counter,
            direction,
        }
    }
}

/// Divide-then-floor step applied to the tick interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decay {
    /// Divisor applied to the interval on every tick.
    pub factor: f64,
    /// Interval never drops below this many milliseconds.
    pub floor_ms: f64,
}

impl Decay {
    /// Build a decay regime.
    pub const fn new(factor: f64, floor_ms: f64) -> Self {
        Self { factor, floor_ms }
    }

    /// Apply the regime to an interval in milliseconds.
    pub fn apply(self, interval_ms: f64) -> f64 {
        (interval_ms / self.factor).max(self.floor_ms)
    }

    /// Whether the regime can only ever shrink the interval towards a positive floor.
    pub fn is_sane(self) -> bool {
        self.factor.is_finite()
            && self.factor >= 1.0
            && self.floor_ms.is_finite()
            && self.floor_ms > 0.0
    }
}

/// Step size reached after holding for a given duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEscalation {
    /// Continuous repeating time after which the step applies.
    pub after: Duration,
    /// Magnitude applied per tick from then on.
    pub step: i64,
}

/// Timing constants of the accelerating hold gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldTuning {
    /// Press duration that turns a tap into a hold.
    pub hold_delay: Duration,
    /// First interval between ticks, in milliseconds.
    pub initial_interval_ms: f64,
    /// Regime used before the gesture turns aggressive.
    pub normal_decay: Decay,
    /// Regime used once the gesture is aggressive.
    pub aggressive_decay: Decay,
    /// Extra regime stacked on top while the counter is above `high_value_threshold`.
    pub high_value_decay: Decay,
    /// Counter value above which `high_value_decay` applies.
    pub high_value_threshold: i64,
    /// Time after which the gesture turns aggressive, measured from entry into
    /// `Repeating` (so `hold_delay` later than the press itself).
    pub aggressive_after: Duration,
    /// Step escalations, ordered by `after`.
    pub step_schedule: Vec<StepEscalation>,
}

impl Default for HoldTuning {
    fn default() -> Self {
        Self {
            hold_delay: Duration::from_millis(200),
            initial_interval_ms: 150.0,
            normal_decay: Decay::new(1.2, 50.0),
            aggressive_decay: Decay::new(1.1, 5.0),
            high_value_decay: Decay::new(1.05, 1.0),
            high_value_threshold: 100,
            aggressive_after: Duration::from_millis(2_000),
            step_schedule: vec![
                StepEscalation {
                    after: Duration::from_secs(20),
                    step: 10,
                },
                StepEscalation {
                    after: Duration::from_secs(60),
                    step: 100,
                },
                StepEscalation {
                    after: Duration::from_secs(120),
                    step: 1_000,
                },
            ],
        }
    }
}

/// Phases of a single press gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HoldPhase {
    /// Nothing is pressed.
    Idle,
    /// Pressed, waiting for the hold delay to elapse.
    ArmedWaiting,
    /// Held long enough; ticks are being applied.
    Repeating,
}

/// Inputs driving a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldEvent {
    /// Pointer or touch went down on the zone.
    Press,
    /// The hold delay elapsed while still pressed.
    HoldElapsed,
    /// A repeating tick was applied and the counter now reads `value`.
    Tick {
        /// Counter value after the tick.
        value: i64,
    },
    /// The aggressive timer fired.
    AggressiveElapsed,
    /// A step escalation timer fired.
    StepElapsed {
        /// New step magnitude.
        step: i64,
    },
    /// Release, pointer-leave or touch-cancel.
    Release,
}

/// Error returned when an event does not apply to the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hold transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidHoldTransition {
    /// Phase the gesture was in.
    pub from: HoldPhase,
    /// Rejected event.
    pub event: HoldEvent,
}

/// Value-type state of one gesture. Every transition consumes and returns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldState {
    phase: HoldPhase,
    direction: Direction,
    interval_ms: f64,
    step: i64,
    is_aggressive: bool,
}

impl HoldState {
    /// Idle gesture with the tuning's initial values.
    pub fn new(direction: Direction, tuning: &HoldTuning) -> Self {
        Self {
            phase: HoldPhase::Idle,
            direction,
            interval_ms: tuning.initial_interval_ms,
            step: 1,
            is_aggressive: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    /// Milliseconds until the next tick.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Magnitude of each tick.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Whether the faster decay regime is unlocked.
    pub fn is_aggressive(&self) -> bool {
        self.is_aggressive
    }

    /// Signed amount a tick applies to the counter.
    pub fn delta(&self) -> i64 {
        self.direction.sign().saturating_mul(self.step)
    }

    /// Delay until the next tick, never shorter than a millisecond.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_ms / 1_000.0)
            .unwrap_or(Duration::ZERO)
            .max(Duration::from_millis(1))
    }

    /// Apply an event, returning the next state.
    pub fn apply(self, event: HoldEvent, tuning: &HoldTuning) -> Result<Self, InvalidHoldTransition> {
        let next = match (self.phase, event) {
            (HoldPhase::Idle, HoldEvent::Press) => Self {
                phase: HoldPhase::ArmedWaiting,
                ..Self::new(self.direction, tuning)
            },
            (HoldPhase::ArmedWaiting, HoldEvent::HoldElapsed) => Self {
                phase: HoldPhase::Repeating,
                ..self
            },
            (HoldPhase::Repeating, HoldEvent::Tick { value }) => Self {
                interval_ms: self.decayed_interval(value, tuning),
                ..self
            },
            (HoldPhase::Repeating, HoldEvent::AggressiveElapsed) => Self {
                is_aggressive: true,
                ..self
            },
            (HoldPhase::Repeating, HoldEvent::StepElapsed { step }) => Self { step, ..self },
            (_, HoldEvent::Release) => Self::new(self.direction, tuning),
            (from, event) => return Err(InvalidHoldTransition { from, event }),
        };

        Ok(next)
    }

    fn decayed_interval(&self, value: i64, tuning: &HoldTuning) -> f64 {
        let regime = if self.is_aggressive {
            tuning.aggressive_decay
        } else {
            tuning.normal_decay
        };
        let interval = regime.apply(self.interval_ms);

        if value > tuning.high_value_threshold {
            tuning.high_value_decay.apply(interval)
        } else {
            interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    fn repeating(tuning: &HoldTuning) -> HoldState {
        HoldState::new(Direction::Increment, tuning)
            .apply(HoldEvent::Press, tuning)
            .unwrap()
            .apply(HoldEvent::HoldElapsed, tuning)
            .unwrap()
    }

    #[test]
    fn new_gesture_starts_idle_with_defaults() {
        let tuning = HoldTuning::default();
        let hold = HoldState::new(Direction::Decrement, &tuning);
        assert_eq!(hold.phase(), HoldPhase::Idle);
        assert!(close(hold.interval_ms(), 150.0));
        assert_eq!(hold.step(), 1);
        assert!(!hold.is_aggressive());
        assert_eq!(hold.delta(), -1);
    }

    #[test]
    fn press_then_elapse_enters_repeating() {
        let tuning = HoldTuning::default();
        let hold = HoldState::new(Direction::Increment, &tuning)
            .apply(HoldEvent::Press, &tuning)
            .unwrap();
        assert_eq!(hold.phase(), HoldPhase::ArmedWaiting);

        let hold = hold.apply(HoldEvent::HoldElapsed, &tuning).unwrap();
        assert_eq!(hold.phase(), HoldPhase::Repeating);
        assert!(close(hold.interval_ms(), 150.0));
    }

    #[test]
    fn normal_decay_floors_at_fifty() {
        let tuning = HoldTuning::default();
        let mut hold = repeating(&tuning);

        hold = hold.apply(HoldEvent::Tick { value: 41 }, &tuning).unwrap();
        assert!(close(hold.interval_ms(), 125.0));
        hold = hold.apply(HoldEvent::Tick { value: 42 }, &tuning).unwrap();
        assert!(close(hold.interval_ms(), 150.0 / 1.2 / 1.2));

        for value in 43..60 {
            hold = hold.apply(HoldEvent::Tick { value }, &tuning).unwrap();
        }
        assert!(close(hold.interval_ms(), 50.0));
    }

    #[test]
    fn aggressive_decay_floors_at_five() {
        let tuning = HoldTuning::default();
        let mut hold = repeating(&tuning)
            .apply(HoldEvent::AggressiveElapsed, &tuning)
            .unwrap();
        assert!(hold.is_aggressive());

        hold = hold.apply(HoldEvent::Tick { value: 50 }, &tuning).unwrap();
        assert!(close(hold.interval_ms(), 150.0 / 1.1));

        for _ in 0..100 {
            hold = hold.apply(HoldEvent::Tick { value: 50 }, &tuning).unwrap();
        }
        assert!(close(hold.interval_ms(), 5.0));
    }

    #[test]
    fn high_value_decay_stacks_on_top() {
        let tuning = HoldTuning::default();
        let hold = repeating(&tuning)
            .apply(HoldEvent::Tick { value: 101 }, &tuning)
            .unwrap();
        assert!(close(hold.interval_ms(), 150.0 / 1.2 / 1.05));

        let hold = repeating(&tuning)
            .apply(HoldEvent::Tick { value: 100 }, &tuning)
            .unwrap();
        assert!(close(hold.interval_ms(), 125.0));

        let mut hold = repeating(&tuning)
            .apply(HoldEvent::AggressiveElapsed, &tuning)
            .unwrap();
        for _ in 0..200 {
            hold = hold.apply(HoldEvent::Tick { value: 5_000 }, &tuning).unwrap();
        }
        assert!(close(hold.interval_ms(), 5.0 / 1.05));
    }

    #[test]
    fn step_escalation_scales_delta() {
        let tuning = HoldTuning::default();
        let hold = HoldState::new(Direction::Decrement, &tuning)
            .apply(HoldEvent::Press, &tuning)
            .unwrap()
            .apply(HoldEvent::HoldElapsed, &tuning)
            .unwrap()
            .apply(HoldEvent::StepElapsed { step: 100 }, &tuning)
            .unwrap();
        assert_eq!(hold.step(), 100);
        assert_eq!(hold.delta(), -100);
    }

    #[test]
    fn release_resets_everything() {
        let tuning = HoldTuning::default();
        let hold = repeating(&tuning)
            .apply(HoldEvent::AggressiveElapsed, &tuning)
            .unwrap()
            .apply(HoldEvent::StepElapsed { step: 10 }, &tuning)
            .unwrap()
            .apply(HoldEvent::Tick { value: 200 }, &tuning)
            .unwrap()
            .apply(HoldEvent::Release, &tuning)
            .unwrap();

        assert_eq!(hold, HoldState::new(Direction::Increment, &tuning));

        let armed = HoldState::new(Direction::Increment, &tuning)
            .apply(HoldEvent::Press, &tuning)
            .unwrap()
            .apply(HoldEvent::Release, &tuning)
            .unwrap();
        assert_eq!(armed.phase(), HoldPhase::Idle);
    }

    #[test]
    fn ticks_are_rejected_before_repeating() {
        let tuning = HoldTuning::default();
        let armed = HoldState::new(Direction::Increment, &tuning)
            .apply(HoldEvent::Press, &tuning)
            .unwrap();

        let err = armed
            .apply(HoldEvent::Tick { value: 40 }, &tuning)
            .unwrap_err();
        assert_eq!(err.from, HoldPhase::ArmedWaiting);

        let err = HoldState::new(Direction::Increment, &tuning)
            .apply(HoldEvent::HoldElapsed, &tuning)
            .unwrap_err();
        assert_eq!(err.from, HoldPhase::Idle);

        let err = armed.apply(HoldEvent::Press, &tuning).unwrap_err();
        assert_eq!(err.event, HoldEvent::Press);
    }

    #[test]
    fn interval_never_drops_below_a_millisecond() {
        let tuning = HoldTuning {
            initial_interval_ms: 0.2,
            ..HoldTuning::default()
        };
        let hold = HoldState::new(Direction::Increment, &tuning);
        assert_eq!(hold.interval(), Duration::from_millis(1));
    }

    #[test]
    fn decay_sanity() {
        assert!(Decay::new(1.2, 50.0).is_sane());
        assert!(!Decay::new(0.5, 50.0).is_sane());
        assert!(!Decay::new(1.2, 0.0).is_sane());
        assert!(!Decay::new(f64::NAN, 1.0).is_sane());
    }
}
