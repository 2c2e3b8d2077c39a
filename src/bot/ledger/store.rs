use std::sync::{Mutex, PoisonError};

use super::{
    format::{decode_ledger, encode_ledger},
    record::Ledger,
};

/* Score Store
 * Durable home of the ledger. Every backend stores the whole ledger as a single
 * document and replaces it whole on save, so readers never see a partial write.
 * Only the LeaderboardEngine should call a store.
 */

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Score store is corrupt: {0}")]
    CorruptStore(String),
    #[error("Score store could not be read: {0}")]
    ReadFailure(String),
    #[error("Score store could not be written: {0}")]
    WriteFailure(String),
}

pub trait ScoreStore: Send + Sync {
    // Reads the whole ledger. A store that was never written yields an empty ledger.
    fn load(&self) -> Result<Ledger, StoreError>;

    // Replaces the stored ledger with the given one.
    fn save(&self, ledger: &Ledger) -> Result<(), StoreError>;
}

/* In-process store.
 * Keeps the encoded document in memory, so it goes through the same format as the
 * persistent backends. Writes can be made to fail for testing error paths.
 */
#[derive(Default)]
pub struct MemoryScoreStore {
    document: Mutex<Option<String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryScoreStore {
    pub fn new() -> MemoryScoreStore {
        MemoryScoreStore::default()
    }

    pub fn with_document(document: &str) -> MemoryScoreStore {
        MemoryScoreStore {
            document: Mutex::new(Some(document.to_string())),
            fail_writes: Mutex::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = fail;
    }

    // Currently stored document, if any.
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<Ledger, StoreError> {
        match self.document() {
            Some(document) => decode_ledger(&document),
            None => Ok(Ledger::new()),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        if *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(StoreError::WriteFailure(
                "memory store is refusing writes".to_string(),
            ));
        }

        *self.document.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(encode_ledger(ledger));
        Ok(())
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryScoreStore::new();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.document(), None);
    }

    #[test]
    fn test_memory_store_save_load() {
        let store = MemoryScoreStore::new();
        let mut ledger = Ledger::new();
        ledger.upsert("123", 42);

        assert!(store.save(&ledger).is_ok());
        assert_eq!(store.load().unwrap(), ledger);
        assert_eq!(store.document().unwrap(), r#"{"123":42}"#);
    }

    #[test]
    fn test_memory_store_failed_write_keeps_document() {
        let store = MemoryScoreStore::with_document(r#"{"a":1}"#);
        store.set_fail_writes(true);

        let ledger = Ledger::from_scores(vec![("b", 2)]);
        assert!(matches!(
            store.save(&ledger),
            Err(StoreError::WriteFailure(_))
        ));
        assert_eq!(store.document().unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_memory_store_corrupt_document() {
        let store = MemoryScoreStore::with_document("{broken");
        assert!(matches!(store.load(), Err(StoreError::CorruptStore(_))));
    }
}
