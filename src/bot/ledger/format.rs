use serde_json::{Map, Value};

use super::{record::Ledger, store::StoreError};

/* Durable document format shared by all store backends.
 * A JSON object mapping player id to best score, keys written in rank order:
 *   {"B": 12, "A": 7}
 * Document order breaks ties when reading.
 */

pub fn encode_ledger(ledger: &Ledger) -> String {
    let mut document = Map::new();
    for record in ledger.records() {
        document.insert(record.player_id.clone(), Value::from(record.best_score));
    }
    Value::Object(document).to_string()
}

pub fn decode_ledger(text: &str) -> Result<Ledger, StoreError> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| StoreError::CorruptStore(err.to_string()))?;

    let entries = match document {
        Value::Object(entries) => entries,
        other => {
            return Err(StoreError::CorruptStore(format!(
                "expected an object of scores, found {other}"
            )))
        }
    };

    let mut scores = Vec::with_capacity(entries.len());
    for (player_id, score) in entries {
        if player_id.is_empty() {
            return Err(StoreError::CorruptStore("empty player id".to_string()));
        }
        match score.as_u64() {
            Some(score) => scores.push((player_id, score)),
            None => {
                return Err(StoreError::CorruptStore(format!(
                    "invalid score for {player_id}: {score}"
                )))
            }
        }
    }

    Ok(Ledger::from_scores(scores))
}
