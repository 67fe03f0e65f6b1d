use log::warn;
use std::env;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX};

pub const DIFFICULTY_VAR: &str = "LEDGER_DIFFICULTY";
pub const GENESIS_NOTE_VAR: &str = "LEDGER_GENESIS_NOTE";

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
    pub genesis_note: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_note: None,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the `LEDGER_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Bad values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(DIFFICULTY_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(d) if d <= DIFF_MAX => config.difficulty = d,
                Ok(d) => warn!(
                    "{DIFFICULTY_VAR}={d} is above the dev cap of {DIFF_MAX}, using {DEFAULT_DIFFICULTY}"
                ),
                Err(_) => warn!("{DIFFICULTY_VAR}={raw:?} is not a number, using {DEFAULT_DIFFICULTY}"),
            }
        }

        config.genesis_note = lookup(GENESIS_NOTE_VAR)
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());

        config
    }
}
