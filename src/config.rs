use crate::types::{DEFAULT_MAX_ROUNDS, MAX_ROUNDS, MIN_ROUNDS};
use std::time::Duration;

/// Runtime configuration for the game service and host coordinator.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Application identifier the room documents are namespaced under.
    pub app_id: String,
    /// Round count newly created rooms start with.
    pub default_max_rounds: u32,
    /// How long a bot Police "thinks" before accusing.
    pub bot_delay: Duration,
    /// Grace period between everyone voting ready and the next round starting.
    pub advance_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            app_id: "thief-police-v2-bots".to_string(),
            default_max_rounds: DEFAULT_MAX_ROUNDS,
            bot_delay: Duration::from_millis(2500),
            advance_delay: Duration::from_millis(1500),
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let app_id = std::env::var("CHORPOLICE_APP_ID")
            .ok()
            .and_then(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or(defaults.app_id);

        let default_max_rounds = std::env::var("CHORPOLICE_DEFAULT_ROUNDS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|v| (MIN_ROUNDS..=MAX_ROUNDS).contains(v))
            .unwrap_or(defaults.default_max_rounds);

        let bot_delay = std::env::var("CHORPOLICE_BOT_DELAY_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.bot_delay);

        let advance_delay = std::env::var("CHORPOLICE_ADVANCE_DELAY_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.advance_delay);

        Self {
            app_id,
            default_max_rounds,
            bot_delay,
            advance_delay,
        }
    }
}
