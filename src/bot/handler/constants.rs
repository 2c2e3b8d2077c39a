/* Constants used across handlers. */

// Cooldowns, in seconds
pub const COOLDOWN_ROLL: i64 = 1;
pub const COOLDOWN_FLIP: i64 = 1;
pub const COOLDOWN_TEAMS: i64 = 5;
pub const COOLDOWN_SCHMEE: i64 = 30;
pub const COOLDOWN_LEADERBOARD: i64 = 5;

// Seconds before short-lived bot messages are deleted
pub const DELETE_AFTER_ERROR: u64 = 2;
pub const DELETE_AFTER_FLIP: u64 = 10;

// Upper bound on the e's in a schmee, to stay inside Telegram's message limit
pub const SCHMEE_MAX_EES: u64 = 3000;

// Telegram's message length limit, in UTF-16 code units
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

// Most chat member lookups made for one leaderboard
pub const LEADERBOARD_MAX_NAME_LOOKUPS: usize = 30;

pub const COMMAND_ROLL: &str = "/roll";
pub const COMMAND_FLIP: &str = "/flip";
pub const COMMAND_TEAMS: &str = "/teams";
pub const COMMAND_SCHMEE: &str = "/schmee";
pub const COMMAND_LEADERBOARD: &str = "/leaderboard";
pub const COMMAND_HELP: &str = "/help";
pub const COMMAND_CANCEL: &str = "/cancel";

pub const UNKNOWN_ERROR_MESSAGE: &str = "Something went wrong";
pub const LEADERBOARD_SEPARATOR: &str = "⋯";
