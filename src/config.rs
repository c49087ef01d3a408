//! Table configuration loaded from TOML.
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```
//! use holdem_limit::config::GameConfig;
//!
//! let cfg = GameConfig::from_toml_str(
//!     r#"
//!     starting_money = 40
//!     tie_break = "first_exceeding"
//!
//!     [rules]
//!     max_raises = 3
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(cfg.starting_money, 40);
//! assert_eq!(cfg.rules.max_raises, 3);
//! assert_eq!(cfg.rules.big_blind, 2);
//! ```

use crate::evaluator::TieBreakRule;
use crate::stake::BettingRules;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub rules: BettingRules,
    pub starting_money: u64,
    /// Pause before each artificial player's action.
    pub think_delay_ms: u64,
    /// How long a human seat may wait before folding.
    pub human_timeout_ms: u64,
    /// Full passes a betting round may take before the hand is aborted.
    pub fail_safe_passes: usize,
    pub tie_break: TieBreakRule,
    /// Session seed; a random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: BettingRules::default(),
            starting_money: 20,
            think_delay_ms: 500,
            human_timeout_ms: 120_000,
            fail_safe_passes: 10,
            tie_break: TieBreakRule::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.rules;
        if r.small_blind == 0 || r.big_blind == 0 {
            return Err(ConfigError::Invalid("blinds must be > 0".into()));
        }
        if r.big_blind < r.small_blind {
            return Err(ConfigError::Invalid(format!(
                "big blind {} is below small blind {}",
                r.big_blind, r.small_blind
            )));
        }
        if r.small_bet == 0 || r.big_bet == 0 {
            return Err(ConfigError::Invalid("bet sizes must be > 0".into()));
        }
        if self.fail_safe_passes == 0 {
            return Err(ConfigError::Invalid("fail_safe_passes must be >= 1".into()));
        }
        if self.starting_money < r.big_blind {
            return Err(ConfigError::Invalid(format!(
                "starting money {} cannot cover the big blind {}",
                self.starting_money, r.big_blind
            )));
        }
        Ok(())
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    pub fn human_timeout(&self) -> Duration {
        Duration::from_millis(self.human_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.human_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn validate_rejects_bad_tables() {
        let bad = [
            "[rules]\nsmall_blind = 0",
            "[rules]\nsmall_blind = 3\nbig_blind = 2",
            "[rules]\nbig_bet = 0",
            "fail_safe_passes = 0",
            "starting_money = 1",
        ];
        for src in bad {
            assert!(
                matches!(GameConfig::from_toml_str(src), Err(ConfigError::Invalid(_))),
                "accepted: {src}"
            );
        }
    }

    #[test]
    fn unknown_keys_and_bad_types_fail_to_parse() {
        assert!(matches!(GameConfig::from_toml_str("stack = 5"), Err(ConfigError::Parse(_))));
        assert!(matches!(GameConfig::from_toml_str("seed = \"x\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            GameConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
