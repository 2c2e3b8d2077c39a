// Exported functions
pub use self::games::{action_flip, action_roll, action_teams, action_teams_names};
pub use self::general::{action_cancel, action_help, action_start, invalid_state};
pub use self::leaderboard::action_leaderboard;
pub use self::schmee::action_schmee;

// Exported structs and types
pub use self::utils::Cooldowns;

// Submodules
mod constants;
mod games;
mod general;
mod leaderboard;
mod schmee;
mod utils;
