// bot/mod.rs

// Exported functions
pub use self::dispatcher::run_dispatcher;

// Exported structs and types
pub use self::config::{Config, ConfigError, LedgerBackend};
pub use self::dispatcher::{BotError, Command, HandlerResult, State, UserDialogue};
pub use self::draw::{FixedDraw, NormalDraw, ScoreDraw};
pub use self::engine::{EngineError, LeaderboardEngine, LeaderboardView, Outcome, RankedEntry, TopN};
pub use self::ledger::{
    FileScoreStore, Ledger, MemoryScoreStore, RedisScoreStore, ScoreRecord, ScoreStore, StoreError,
};

// Declare submodules
mod config;
mod dispatcher;
mod draw;
mod engine;
mod handler;
mod ledger;
mod processor;
