use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ledger::{DEFAULT_DIFFICULTY, YieldSchedule, check_difficulty};

/// Policy knobs for a [`crate::ledger::Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Leading hex zeros required of every appended block.
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    /// Mine the genesis block at `difficulty` when the chain is created.
    #[serde(default)]
    pub mine_genesis: bool,
    /// Yield cadence for cooperative mining.
    #[serde(default)]
    pub yield_schedule: YieldSchedule,
    /// Also require every seal to meet the current difficulty when validating.
    #[serde(default)]
    pub strict_validation: bool,
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mine_genesis: false,
            yield_schedule: YieldSchedule::default(),
            strict_validation: false,
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> Result<()> {
        check_difficulty(self.difficulty)
    }

    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    ///
    /// Recognized keys: `LEDGER_DIFFICULTY`, `LEDGER_MINE_GENESIS`,
    /// `LEDGER_STRICT_VALIDATION`, `LEDGER_YIELD_SCHEDULE` (comma separated).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("LEDGER_DIFFICULTY") {
            cfg.difficulty = parse_value("LEDGER_DIFFICULTY", &v)?;
        }
        if let Some(v) = lookup("LEDGER_MINE_GENESIS") {
            cfg.mine_genesis = parse_flag("LEDGER_MINE_GENESIS", &v)?;
        }
        if let Some(v) = lookup("LEDGER_STRICT_VALIDATION") {
            cfg.strict_validation = parse_flag("LEDGER_STRICT_VALIDATION", &v)?;
        }
        if let Some(v) = lookup("LEDGER_YIELD_SCHEDULE") {
            let intervals = v
                .split(',')
                .map(|part| parse_value("LEDGER_YIELD_SCHEDULE", part))
                .collect::<Result<Vec<u64>>>()?;
            cfg.yield_schedule = YieldSchedule::new(intervals)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Where the HTTP driver listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::config(format!("{key}: cannot parse {raw:?}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LedgerError::config(format!("{key}: expected a boolean, got {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = ChainConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, ChainConfig::default());
        assert_eq!(cfg.difficulty, 2);
        assert!(!cfg.mine_genesis);
        assert!(!cfg.strict_validation);
    }

    #[test]
    fn reads_all_keys() {
        let cfg = ChainConfig::from_lookup(lookup_from(&[
            ("LEDGER_DIFFICULTY", "3"),
            ("LEDGER_MINE_GENESIS", "true"),
            ("LEDGER_STRICT_VALIDATION", "1"),
            ("LEDGER_YIELD_SCHEDULE", "1, 2, 40"),
        ]))
        .unwrap();
        assert_eq!(cfg.difficulty, 3);
        assert!(cfg.mine_genesis);
        assert!(cfg.strict_validation);
        assert_eq!(cfg.yield_schedule.intervals(), &[1, 2, 40]);
    }

    #[test]
    fn rejects_zero_difficulty_and_garbage() {
        let zero = ChainConfig::from_lookup(lookup_from(&[("LEDGER_DIFFICULTY", "0")]));
        assert!(matches!(zero, Err(LedgerError::Configuration(_))));

        let negative = ChainConfig::from_lookup(lookup_from(&[("LEDGER_DIFFICULTY", "-1")]));
        assert!(negative.is_err());

        let flag = ChainConfig::from_lookup(lookup_from(&[("LEDGER_MINE_GENESIS", "maybe")]));
        assert!(flag.is_err());

        let schedule = ChainConfig::from_lookup(lookup_from(&[("LEDGER_YIELD_SCHEDULE", "1,0")]));
        assert!(schedule.is_err());
    }

    #[test]
    fn deserializes_with_field_defaults() {
        let cfg: ChainConfig =
            serde_json::from_str(r#"{ "strict_validation": true, "yield_schedule": [5] }"#).unwrap();
        assert_eq!(cfg.difficulty, 2);
        assert!(cfg.strict_validation);
        assert_eq!(cfg.yield_schedule.interval_for(3), 5);
    }

    #[test]
    fn server_config_falls_back_on_bad_port() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[("HOST", "0.0.0.0"), ("PORT", "nope")]));
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }
}
