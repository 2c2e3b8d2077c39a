use redis::{Client, Commands, Connection, RedisError};

use super::{
    format::{decode_ledger, encode_ledger},
    record::Ledger,
    store::{ScoreStore, StoreError},
};

/* Redis Store
 * Keeps the ledger document under a single key.
 * A save is a single SET, so readers see either the old or the new document.
 */

pub const REDIS_URL_DEFAULT: &str = "redis://127.0.0.1/";
pub const LEDGER_KEY_DEFAULT: &str = "leaderboard";

pub struct RedisScoreStore {
    client: Client,
    key: String,
}

impl RedisScoreStore {
    pub fn open(url: &str, key: &str) -> Result<RedisScoreStore, StoreError> {
        let client = Client::open(url).map_err(|err| StoreError::ReadFailure(err.to_string()))?;
        Ok(RedisScoreStore {
            client,
            key: key.to_string(),
        })
    }

    fn connect(&self) -> Result<Connection, RedisError> {
        self.client.get_connection()
    }

    // Removes the ledger key. Mainly for testing purposes.
    #[allow(dead_code)]
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut con = self
            .connect()
            .map_err(|err| StoreError::WriteFailure(err.to_string()))?;
        con.del(&self.key)
            .map_err(|err| StoreError::WriteFailure(err.to_string()))
    }
}

impl ScoreStore for RedisScoreStore {
    fn load(&self) -> Result<Ledger, StoreError> {
        let read_failure = |err: RedisError| StoreError::ReadFailure(err.to_string());

        let mut con = self.connect().map_err(read_failure)?;
        let document: Option<String> = con.get(&self.key).map_err(read_failure)?;
        match document {
            Some(document) => decode_ledger(&document),
            None => Ok(Ledger::new()),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let write_failure = |err: RedisError| StoreError::WriteFailure(err.to_string());

        let mut con = self.connect().map_err(write_failure)?;
        con.set(&self.key, encode_ledger(ledger))
            .map_err(write_failure)
    }
}

// Tests
// Require a redis server at REDIS_URL_DEFAULT.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a running redis server"]
    fn test_redis_missing_key_loads_empty() {
        let store = RedisScoreStore::open(REDIS_URL_DEFAULT, "test_ledger_empty").unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    #[ignore = "requires a running redis server"]
    fn test_redis_save_load() {
        let store = RedisScoreStore::open(REDIS_URL_DEFAULT, "test_ledger_round_trip").unwrap();
        let ledger = Ledger::from_scores(vec![("a", 4), ("b", 11), ("c", 4)]);

        store.save(&ledger).unwrap();
        assert_eq!(store.load().unwrap(), ledger);

        store.clear().unwrap();
    }

    #[test]
    fn test_redis_invalid_url() {
        assert!(matches!(
            RedisScoreStore::open("not a url", LEDGER_KEY_DEFAULT),
            Err(StoreError::ReadFailure(_))
        ));
    }
}
