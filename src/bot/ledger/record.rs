use std::{cmp::Ordering, collections::HashMap};

/* Ledger records.
 * A ScoreRecord holds the best score a single player has reached.
 * The Ledger holds all records, always sorted by descending score.
 * Equal scores are ordered by when the score was reached: each record carries a
 * sequence number, reassigned whenever its score changes.
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub player_id: String,
    pub best_score: u64,
    reached: u64,
}

impl ScoreRecord {
    fn rank_order(&self, other: &ScoreRecord) -> Ordering {
        other
            .best_score
            .cmp(&self.best_score)
            .then(self.reached.cmp(&other.reached))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<ScoreRecord>,
    next_reached: u64,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    /* Builds a ledger from (player, score) pairs.
     * Pairs earlier in the iterator count as having reached their score first.
     * A player appearing twice keeps the higher score.
     */
    pub fn from_scores<I, S>(scores: I) -> Ledger
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut ledger = Ledger::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (player_id, score) in scores {
            let player_id: String = player_id.into();
            let reached = ledger.next_reached;

            match positions.get(&player_id).copied() {
                Some(pos) => {
                    let record = &mut ledger.records[pos];
                    if score <= record.best_score {
                        continue;
                    }
                    record.best_score = score;
                    record.reached = reached;
                }
                None => {
                    positions.insert(player_id.clone(), ledger.records.len());
                    ledger.records.push(ScoreRecord {
                        player_id,
                        best_score: score,
                        reached,
                    });
                }
            }
            ledger.next_reached += 1;
        }

        ledger.records.sort_by(ScoreRecord::rank_order);
        ledger
    }

    pub fn get(&self, player_id: &str) -> Option<&ScoreRecord> {
        self.records.iter().find(|r| r.player_id == player_id)
    }

    // Holder of the world record.
    pub fn leader(&self) -> Option<&ScoreRecord> {
        self.records.first()
    }

    // 1-based rank of a player, if ranked at all.
    pub fn rank_of(&self, player_id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.player_id == player_id)
            .map(|pos| pos + 1)
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /* Sets a player's best score, inserting the record if needed.
     * Does not compare against the current best; callers decide whether this is an
     * improvement. The record ranks after every record already holding the same score.
     */
    pub fn upsert(&mut self, player_id: &str, score: u64) {
        let reached = self.next_reached;
        self.next_reached += 1;

        match self.records.iter_mut().find(|r| r.player_id == player_id) {
            Some(record) => {
                record.best_score = score;
                record.reached = reached;
            }
            None => self.records.push(ScoreRecord {
                player_id: player_id.to_string(),
                best_score: score,
                reached,
            }),
        }

        self.records.sort_by(ScoreRecord::rank_order);
    }
}

// Equal when holding the same records in the same rank order.
impl PartialEq for Ledger {
    fn eq(&self, other: &Ledger) -> bool {
        self.records.len() == other.records.len()
            && self
                .records
                .iter()
                .zip(other.records.iter())
                .all(|(a, b)| a.player_id == b.player_id && a.best_score == b.best_score)
    }
}

impl Eq for Ledger {}
