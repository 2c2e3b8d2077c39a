use std::sync::OnceLock;

use rand::{seq::SliceRandom, Rng};
use regex::Regex;

use super::{
    draw::ScoreDraw,
    engine::{EngineError, LeaderboardEngine, LeaderboardView, Outcome, TopN},
};

/* Processor is the overall logic center of the bot.
 * It handles the main logic, communicating with the front-facing handler
 * and the back-facing leaderboard engine.
 * The small games live here as plain functions over a random source, so they can be
 * tested with a seeded rng.
 */

pub const DICE_DEFAULT: &str = "1d6";
pub const DICE_MAX_ROLLS: u32 = 100;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ProcessError {
    #[error("Format has to be in NdN!")]
    InvalidDice(String),
    #[error("At most {} dice can be rolled at once!", DICE_MAX_ROLLS)]
    TooManyDice(u32),
    #[error("Need at least two players to make teams!")]
    NotEnoughPlayers,
    #[error("{0}")]
    EngineError(EngineError),
}

// Implement the From trait to convert from EngineError to ProcessError
impl From<EngineError> for ProcessError {
    fn from(engine_error: EngineError) -> ProcessError {
        ProcessError::EngineError(engine_error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dice {
    pub rolls: u32,
    pub sides: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coin {
    Heads,
    Tails,
}

impl Coin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Coin::Heads => "Heads",
            Coin::Tails => "Tails",
        }
    }
}

fn dice_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)d(\d+)$").expect("dice pattern is valid"))
}

/* Parses dice in NdN format, e.g. "3d20". Empty text rolls the default die.
 */
pub fn parse_dice(text: &str) -> Result<Dice, ProcessError> {
    let text = text.trim().to_lowercase();
    let text = if text.is_empty() {
        DICE_DEFAULT.to_string()
    } else {
        text
    };

    let invalid = || ProcessError::InvalidDice(text.clone());
    let captures = dice_pattern().captures(&text).ok_or_else(invalid)?;
    let rolls: u32 = captures[1].parse().map_err(|_| invalid())?;
    let sides: u64 = captures[2].parse().map_err(|_| invalid())?;

    if rolls == 0 || sides == 0 {
        return Err(invalid());
    }
    if rolls > DICE_MAX_ROLLS {
        return Err(ProcessError::TooManyDice(rolls));
    }

    Ok(Dice { rolls, sides })
}

pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, dice: Dice) -> Vec<u64> {
    (0..dice.rolls)
        .map(|_| rng.random_range(1..=dice.sides))
        .collect()
}

pub fn flip_coin<R: Rng + ?Sized>(rng: &mut R) -> Coin {
    if rng.random_bool(0.5) {
        Coin::Heads
    } else {
        Coin::Tails
    }
}

// Capitalises the first letter of every word, lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }
    result
}

/* Shuffles players and splits them in two halves.
 * With an odd count, the second team gets the extra player.
 */
pub fn split_teams<R: Rng + ?Sized>(
    rng: &mut R,
    names: &str,
) -> Result<(Vec<String>, Vec<String>), ProcessError> {
    let mut players: Vec<String> = names
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|name| !name.is_empty())
        .map(title_case)
        .collect();

    if players.len() < 2 {
        return Err(ProcessError::NotEnoughPlayers);
    }

    players.shuffle(rng);
    let second = players.split_off(players.len() / 2);
    Ok((players, second))
}

/* Plays one round of schmee.
 * Execution flow: Draw a score, record it with the leaderboard engine.
 */
pub fn play_schmee(
    engine: &LeaderboardEngine,
    draw: &dyn ScoreDraw,
    player_id: &str,
) -> Result<(u64, Outcome), ProcessError> {
    let score = draw.draw();
    let outcome = engine.attempt(player_id, score)?;
    Ok((score, outcome))
}

/* Retrieves the leaderboard for a player.
 * The size argument is a count, "all", or empty for the default size.
 */
pub fn view_leaderboard(
    engine: &LeaderboardEngine,
    player_id: &str,
    size: &str,
) -> Result<LeaderboardView, ProcessError> {
    let top: TopN = size.parse()?;
    Ok(engine.query(player_id, top)?)
}
