//! Application-level configuration loading: player palette, setup defaults and hold tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    game::{MAX_PLAYERS, MIN_PLAYERS},
    hold::{Decay, HoldTuning, StepEscalation},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIFE_TRACKER_CONFIG_PATH";
const DEFAULT_PLAYERS: usize = 4;
const DEFAULT_STARTING_LIFE: i64 = 40;

/// Values pre-selected on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupDefaults {
    /// Pre-selected player count.
    pub num_players: usize,
    /// Pre-selected starting life.
    pub starting_life: i64,
}

impl Default for SetupDefaults {
    fn default() -> Self {
        Self {
            num_players: DEFAULT_PLAYERS,
            starting_life: DEFAULT_STARTING_LIFE,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    colors: Vec<String>,
    setup: SetupDefaults,
    hold: HoldTuning,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        colors = app_config.colors.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, filling every omitted field with its default.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Player colours, assigned by seat index.
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Values pre-selected on the setup screen.
    pub fn setup(&self) -> SetupDefaults {
        self.setup
    }

    /// Timing constants of the hold gesture.
    pub fn hold(&self) -> &HoldTuning {
        &self.hold
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            setup: SetupDefaults::default(),
            hold: HoldTuning::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    colors: Option<Vec<String>>,
    setup: RawSetup,
    hold: RawHold,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSetup {
    num_players: Option<usize>,
    starting_life: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHold {
    hold_delay_ms: Option<u64>,
    initial_interval_ms: Option<f64>,
    normal_decay: Option<RawDecay>,
    aggressive_decay: Option<RawDecay>,
    high_value_decay: Option<RawDecay>,
    high_value_threshold: Option<i64>,
    aggressive_after_ms: Option<u64>,
    step_schedule: Option<Vec<RawStep>>,
}

#[derive(Debug, Deserialize)]
struct RawDecay {
    factor: f64,
    floor_ms: f64,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    after_ms: u64,
    step: i64,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let colors = match value.colors {
            Some(colors) if !colors.is_empty() => colors,
            Some(_) => {
                warn!("configured colors set is empty; using built-in palette");
                default_colors()
            }
            None => default_colors(),
        };

        Self {
            colors,
            setup: value.setup.into(),
            hold: value.hold.into(),
        }
    }
}

impl From<RawSetup> for SetupDefaults {
    fn from(value: RawSetup) -> Self {
        let defaults = Self::default();
        let num_players = value
            .num_players
            .filter(|count| (MIN_PLAYERS..=MAX_PLAYERS).contains(count))
            .unwrap_or(defaults.num_players);
        let starting_life = value
            .starting_life
            .filter(|life| *life >= 1)
            .unwrap_or(defaults.starting_life);

        Self {
            num_players,
            starting_life,
        }
    }
}

impl From<RawHold> for HoldTuning {
    fn from(value: RawHold) -> Self {
        let defaults = Self::default();

        let mut step_schedule = value
            .step_schedule
            .map(|steps| {
                steps
                    .into_iter()
                    .filter(|raw| raw.step > 0)
                    .map(|raw| StepEscalation {
                        after: Duration::from_millis(raw.after_ms),
                        step: raw.step,
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.step_schedule);
        step_schedule.sort_by_key(|escalation| escalation.after);

        Self {
            hold_delay: value
                .hold_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.hold_delay),
            initial_interval_ms: value
                .initial_interval_ms
                .filter(|ms| ms.is_finite() && *ms > 0.0)
                .unwrap_or(defaults.initial_interval_ms),
            normal_decay: decay_or(value.normal_decay, "normal_decay", defaults.normal_decay),
            aggressive_decay: decay_or(
                value.aggressive_decay,
                "aggressive_decay",
                defaults.aggressive_decay,
            ),
            high_value_decay: decay_or(
                value.high_value_decay,
                "high_value_decay",
                defaults.high_value_decay,
            ),
            high_value_threshold: value
                .high_value_threshold
                .unwrap_or(defaults.high_value_threshold),
            aggressive_after: value
                .aggressive_after_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.aggressive_after),
            step_schedule,
        }
    }
}

fn decay_or(raw: Option<RawDecay>, name: &str, fallback: Decay) -> Decay {
    let Some(raw) = raw else {
        return fallback;
    };

    let decay = Decay::new(raw.factor, raw.floor_ms);
    if decay.is_sane() {
        decay
    } else {
        warn!(
            decay = name,
            factor = raw.factor,
            floor_ms = raw.floor_ms,
            "ignoring decay that would not shrink towards a positive floor"
        );
        fallback
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in palette shipped with the binary, one colour per seat.
fn default_colors() -> Vec<String> {
    ["#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.colors(), default_colors().as_slice());
        assert_eq!(config.setup(), SetupDefaults::default());
        assert_eq!(config.hold(), &HoldTuning::default());
    }

    #[test]
    fn partial_hold_overrides_keep_other_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "hold": {
                    "hold_delay_ms": 300,
                    "step_schedule": [
                        { "after_ms": 5000, "step": 5 },
                        { "after_ms": 1000, "step": 2 }
                    ]
                }
            }"#,
        )
        .unwrap();

        let hold = config.hold();
        assert_eq!(hold.hold_delay, Duration::from_millis(300));
        assert_eq!(hold.aggressive_after, Duration::from_millis(2_000));
        assert_eq!(
            hold.step_schedule,
            vec![
                StepEscalation {
                    after: Duration::from_millis(1_000),
                    step: 2,
                },
                StepEscalation {
                    after: Duration::from_millis(5_000),
                    step: 5,
                },
            ]
        );
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_json(
            r##"{
                "colors": [],
                "setup": { "num_players": 9, "starting_life": 0 },
                "hold": { "normal_decay": { "factor": 0.5, "floor_ms": 10 } }
            }"##,
        )
        .unwrap();

        assert_eq!(config.colors().len(), 6);
        assert_eq!(config.setup(), SetupDefaults::default());
        assert_eq!(config.hold().normal_decay, Decay::new(1.2, 50.0));
    }

    #[test]
    fn custom_palette_and_setup() {
        let config = AppConfig::from_json(
            r##"{ "colors": ["#000000"], "setup": { "num_players": 2, "starting_life": 20 } }"##,
        )
        .unwrap();
        assert_eq!(config.colors(), ["#000000".to_string()].as_slice());
        assert_eq!(
            config.setup(),
            SetupDefaults {
                num_players: 2,
                starting_life: 20,
            }
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
