use std::{
    fmt,
    str::FromStr,
    sync::{PoisonError, RwLock},
};

use super::ledger::{Ledger, ScoreRecord, ScoreStore, StoreError};

/* Leaderboard Engine
 * Sole writer of the score ledger. Decides what happens when a player plays,
 * and how the leaderboard is ranked and sliced for display.
 * Holds the ledger in memory behind a lock, in front of a ScoreStore.
 * An attempt holds the write lock from read to save, so concurrent attempts never
 * lose an update. The in-memory ledger is replaced only once the save succeeds.
 */

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(store_error: StoreError) -> EngineError {
        EngineError::Store(store_error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    // Beat the top score of the whole ledger, or was the first score ever.
    NewWorldRecord {
        previous: Option<u64>,
        own_previous: Option<u64>,
        score: u64,
    },
    NewPersonalBest {
        previous: u64,
        score: u64,
    },
    FirstScore {
        score: u64,
    },
    NoImprovement {
        best: u64,
        score: u64,
    },
}

impl Outcome {
    // Whether the attempt was written to the ledger.
    pub fn is_improvement(&self) -> bool {
        !matches!(self, Outcome::NoImprovement { .. })
    }

    // Whether this was the player's first recorded score.
    pub fn is_first_score(&self) -> bool {
        matches!(
            self,
            Outcome::FirstScore { .. }
                | Outcome::NewWorldRecord {
                    own_previous: None,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub player_id: String,
    pub best_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardView {
    pub entries: Vec<RankedEntry>,
    // Requesting player's own standing, when ranked outside the entries.
    pub own: Option<RankedEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopN {
    All,
    Count(usize),
}

pub const TOP_N_DEFAULT: usize = 10;
pub const TOP_N_ALL: &str = "all";

impl FromStr for TopN {
    type Err = EngineError;
    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(TopN::Count(TOP_N_DEFAULT));
        }
        if s.eq_ignore_ascii_case(TOP_N_ALL) {
            return Ok(TopN::All);
        }
        match s.parse::<usize>() {
            Ok(0) | Err(_) => Err(EngineError::InvalidInput(format!(
                "Expected a positive number or \"{TOP_N_ALL}\", got \"{s}\"."
            ))),
            Ok(count) => Ok(TopN::Count(count)),
        }
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopN::All => write!(f, "{TOP_N_ALL}"),
            TopN::Count(count) => write!(f, "{count}"),
        }
    }
}

fn validate_player_id(player_id: &str) -> Result<(), EngineError> {
    if player_id.is_empty() {
        Err(EngineError::InvalidInput(
            "Player id must not be empty.".to_string(),
        ))
    } else {
        Ok(())
    }
}

fn classify(ledger: &Ledger, player_id: &str, score: u64) -> Outcome {
    let own_previous = ledger.get(player_id).map(|record| record.best_score);

    match (ledger.leader(), own_previous) {
        (None, _) => Outcome::NewWorldRecord {
            previous: None,
            own_previous,
            score,
        },
        (Some(leader), _) if score > leader.best_score => Outcome::NewWorldRecord {
            previous: Some(leader.best_score),
            own_previous,
            score,
        },
        (_, Some(previous)) if score > previous => Outcome::NewPersonalBest { previous, score },
        (_, None) => Outcome::FirstScore { score },
        (_, Some(best)) => Outcome::NoImprovement { best, score },
    }
}

fn ranked(rank: usize, record: &ScoreRecord) -> RankedEntry {
    RankedEntry {
        rank,
        player_id: record.player_id.clone(),
        best_score: record.best_score,
    }
}

pub struct LeaderboardEngine {
    store: Box<dyn ScoreStore>,
    ledger: RwLock<Ledger>,
}

impl LeaderboardEngine {
    /* Loads the ledger from the store.
     * A corrupt store fails unless reset_corrupt is set, in which case the engine
     * starts from an empty ledger and the next save overwrites the corrupt document.
     */
    pub fn open(
        store: Box<dyn ScoreStore>,
        reset_corrupt: bool,
    ) -> Result<LeaderboardEngine, EngineError> {
        let ledger = match store.load() {
            Ok(ledger) => ledger,
            Err(StoreError::CorruptStore(reason)) if reset_corrupt => {
                log::warn!(
                    "Leaderboard - Corrupt score store reset to an empty ledger: {}",
                    reason
                );
                Ledger::new()
            }
            Err(err) => return Err(err.into()),
        };

        log::info!("Leaderboard - Loaded {} player records", ledger.len());

        Ok(LeaderboardEngine {
            store,
            ledger: RwLock::new(ledger),
        })
    }

    /* Records a play by a player.
     * Execution flow: Classify the score against the ledger.
     * On improvement, upsert onto a copy, save the copy, then publish it.
     * A failed save leaves the ledger untouched and returns the error.
     */
    pub fn attempt(&self, player_id: &str, score: u64) -> Result<Outcome, EngineError> {
        validate_player_id(player_id)?;

        // Ledger is only replaced after a successful save, so a poisoned guard still holds a
        // consistent ledger.
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);

        let outcome = classify(&ledger, player_id, score);
        if !outcome.is_improvement() {
            return Ok(outcome);
        }

        let mut updated = ledger.clone();
        updated.upsert(player_id, score);
        self.store.save(&updated)?;
        *ledger = updated;

        log::debug!(
            "Leaderboard - Player {} now holds {} ({} players ranked)",
            player_id,
            score,
            ledger.len()
        );
        if let Outcome::NewWorldRecord { previous, .. } = outcome {
            log::info!(
                "Leaderboard - Player {} set a new world record of {} (previous: {:?})",
                player_id,
                score,
                previous
            );
        }

        Ok(outcome)
    }

    /* Ranked view of the ledger for a requesting player.
     * Ranks are positions in the full ledger, not in the returned slice.
     */
    pub fn query(&self, player_id: &str, top: TopN) -> Result<LeaderboardView, EngineError> {
        validate_player_id(player_id)?;

        let count = match top {
            TopN::All => usize::MAX,
            TopN::Count(0) => {
                return Err(EngineError::InvalidInput(
                    "Leaderboard size must be at least 1.".to_string(),
                ))
            }
            TopN::Count(count) => count,
        };

        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);

        let entries: Vec<RankedEntry> = ledger
            .records()
            .iter()
            .take(count)
            .enumerate()
            .map(|(pos, record)| ranked(pos + 1, record))
            .collect();

        let own = match ledger.rank_of(player_id) {
            Some(rank) if rank > entries.len() => ledger.get(player_id).map(|r| ranked(rank, r)),
            _ => None,
        };

        Ok(LeaderboardView {
            entries,
            own,
            total: ledger.len(),
        })
    }

    pub fn get(&self, player_id: &str) -> Option<ScoreRecord> {
        self.ledger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(player_id)
            .cloned()
    }
}
