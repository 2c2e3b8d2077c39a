// Exported structs and types
pub use self::file::FileScoreStore;
pub use self::record::{Ledger, ScoreRecord};
pub use self::redis::{RedisScoreStore, LEDGER_KEY_DEFAULT, REDIS_URL_DEFAULT};
pub use self::store::{MemoryScoreStore, ScoreStore, StoreError};

// Submodules
mod file;
mod format;
mod record;
mod redis;
mod store;
