use std::{env, path::PathBuf, str::FromStr};

use super::{
    draw::{NormalDraw, SCHMEE_MEAN_DEFAULT, SCHMEE_SPREAD_DEFAULT},
    engine::{EngineError, LeaderboardEngine},
    ledger::{FileScoreStore, RedisScoreStore, ScoreStore, LEDGER_KEY_DEFAULT, REDIS_URL_DEFAULT},
};

/* Bot configuration, read from the environment (and .env via dotenv).
 * The Telegram token itself is read by teloxide from TELOXIDE_TOKEN.
 */

const LEDGER_PATH_DEFAULT: &str = "leaderboard.json";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerBackend {
    File { path: PathBuf },
    Redis { url: String, key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: LedgerBackend,
    pub reset_corrupt: bool,
    pub schmee_mean: f64,
    pub schmee_spread: f64,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    // Builds a config from any key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("LEDGER_BACKEND").as_deref() {
            None | Some("file") => LedgerBackend::File {
                path: lookup("LEDGER_PATH")
                    .unwrap_or_else(|| LEDGER_PATH_DEFAULT.to_string())
                    .into(),
            },
            Some("redis") => LedgerBackend::Redis {
                url: lookup("REDIS_URL").unwrap_or_else(|| REDIS_URL_DEFAULT.to_string()),
                key: lookup("LEDGER_REDIS_KEY").unwrap_or_else(|| LEDGER_KEY_DEFAULT.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "LEDGER_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let config = Config {
            backend,
            reset_corrupt: parse_or(&lookup, "LEDGER_RESET_CORRUPT", false)?,
            schmee_mean: parse_or(&lookup, "SCHMEE_MEAN", SCHMEE_MEAN_DEFAULT)?,
            schmee_spread: parse_or(&lookup, "SCHMEE_SPREAD", SCHMEE_SPREAD_DEFAULT)?,
        };

        // Reject parameters the draw cannot use now, rather than on the first /schmee.
        config.score_draw()?;

        Ok(config)
    }

    pub fn score_draw(&self) -> Result<NormalDraw, ConfigError> {
        NormalDraw::new(self.schmee_mean, self.schmee_spread).map_err(|err| {
            ConfigError::InvalidValue {
                key: "SCHMEE_MEAN/SCHMEE_SPREAD",
                value: err.to_string(),
            }
        })
    }

    pub fn score_store(&self) -> Result<Box<dyn ScoreStore>, EngineError> {
        match &self.backend {
            LedgerBackend::File { path } => Ok(Box::new(FileScoreStore::new(path.clone()))),
            LedgerBackend::Redis { url, key } => Ok(Box::new(RedisScoreStore::open(url, key)?)),
        }
    }

    pub fn open_engine(&self) -> Result<LeaderboardEngine, EngineError> {
        LeaderboardEngine::open(self.score_store()?, self.reset_corrupt)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
