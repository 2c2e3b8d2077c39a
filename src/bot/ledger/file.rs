use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use super::{
    format::{decode_ledger, encode_ledger},
    record::Ledger,
    store::{ScoreStore, StoreError},
};

/* File Store
 * Keeps the ledger as a JSON document on local disk.
 * Saves write a temporary file next to the target, sync it, and rename it over the
 * target, so the document on disk is always either the old or the new ledger.
 */

pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> FileScoreStore {
        FileScoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> Result<Ledger, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => decode_ledger(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Ledger::new()),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                Err(StoreError::CorruptStore(err.to_string()))
            }
            Err(err) => Err(StoreError::ReadFailure(format!(
                "{}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let write_failure = |err: std::io::Error| {
            StoreError::WriteFailure(format!("{}: {}", self.path.display(), err))
        };

        let mut tmp = NamedTempFile::new_in(self.directory()).map_err(write_failure)?;
        tmp.write_all(encode_ledger(ledger).as_bytes())
            .map_err(write_failure)?;
        tmp.as_file().sync_all().map_err(write_failure)?;
        tmp.persist(&self.path)
            .map_err(|err| write_failure(err.error))?;

        Ok(())
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileScoreStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileScoreStore::new(dir.path().join("leaderboard.json"));
        (store, dir)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (store, _dir) = test_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _dir) = test_store();
        let ledger = Ledger::from_scores(vec![("7", 3), ("12", 30), ("5", 3)]);

        store.save(&ledger).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            r#"{"12":30,"7":3,"5":3}"#
        );
    }

    #[test]
    fn test_save_replaces_previous_document() {
        let (store, dir) = test_store();
        store.save(&Ledger::from_scores(vec![("a", 1)])).unwrap();
        store.save(&Ledger::from_scores(vec![("a", 2)])).unwrap();

        assert_eq!(store.load().unwrap().get("a").unwrap().best_score, 2);
        // Temporary files are renamed away, not left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file() {
        let (store, _dir) = test_store();
        fs::write(store.path(), "{\"a\": ").unwrap();
        assert!(matches!(store.load(), Err(StoreError::CorruptStore(_))));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileScoreStore::new(dir.path().join("gone").join("leaderboard.json"));
        let ledger = Ledger::from_scores(vec![("a", 1)]);
        assert!(matches!(
            store.save(&ledger),
            Err(StoreError::WriteFailure(_))
        ));
    }
}
