use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::address::to_wif;
use crate::error::Result;
use crate::events::FoundMatch;
use crate::keyspace::parse_cursor_hex;

/// Durable snapshot of aggregate progress.
///
/// Written as pretty JSON so the file stays human-diffable and can be
/// hand-edited to resume from an arbitrary cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Search start, epoch milliseconds. Survives resume so rate reflects
    /// the whole run.
    pub start_time: i64,
    pub total_examined: u64,
    /// Fixed-width zero-padded hex, same encoding as key material.
    pub current_cursor: String,
}

impl Checkpoint {
    pub fn cursor(&self) -> Option<u128> {
        parse_cursor_hex(&self.current_cursor)
    }
}

/// Owner of the checkpoint file. Only the coordinator holds one; workers
/// never touch durable state.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort load. Missing or malformed files are not errors; the
    /// search falls back to a fresh start and keeps going.
    pub fn load(&self) -> Option<Checkpoint> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Checkpoint>(&content) {
            Ok(cp) if cp.cursor().is_some() => Some(cp),
            Ok(_) => {
                eprintln!("[!] Checkpoint cursor unreadable, starting fresh");
                None
            }
            Err(e) => {
                eprintln!("[!] Could not parse checkpoint ({}), starting fresh", e);
                None
            }
        }
    }

    /// Persist a snapshot. Failures are returned so the caller can log and
    /// retry on the next tick; they never stop the search.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the file after a successful find. Best-effort.
    pub fn delete(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[!] Could not remove checkpoint: {}", e);
            }
        }
    }
}

/// Append-only log of found keys. Entries are never overwritten; each is
/// flushed and synced immediately since a lost entry is unrecoverable.
pub struct FoundLog {
    path: PathBuf,
}

impl FoundLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, found: &FoundMatch) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "Private Key: {}", found.key_hex())?;
        writeln!(file, "WIF: {}", to_wif(&found.key, found.compressed))?;
        writeln!(file, "Address: {} ({})", found.address, found.kind)?;
        writeln!(file)?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::key_hex;
    use crate::types::AddressType;
    use tempfile::tempdir;

    #[test]
    fn test_checkpoint_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("progress.json"));

        let checkpoint = Checkpoint {
            start_time: 1_724_000_000_000,
            total_examined: 123_456,
            current_cursor: key_hex(0x2000000000000abc),
        };

        store.save(&checkpoint).unwrap();
        assert_eq!(store.load(), Some(checkpoint.clone()));
        assert_eq!(store.load().unwrap().cursor(), Some(0x2000000000000abc));
    }

    #[test]
    fn test_missing_file_is_fresh_start() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_file_is_fresh_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{ totally not json").unwrap();
        assert_eq!(CheckpointStore::new(&path).load(), None);

        // Valid JSON, unreadable cursor
        fs::write(&path, r#"{"startTime":1,"totalExamined":2,"currentCursor":"zz"}"#).unwrap();
        assert_eq!(CheckpointStore::new(&path).load(), None);
    }

    #[test]
    fn test_hand_edited_cursor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        // Short unpadded hex, as a human would write it
        fs::write(
            &path,
            r#"{"startTime":0,"totalExamined":0,"currentCursor":"0x3039"}"#,
        )
        .unwrap();
        let cp = CheckpointStore::new(&path).load().unwrap();
        assert_eq!(cp.cursor(), Some(12345));
    }

    #[test]
    fn test_delete_idempotent() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("progress.json"));
        store
            .save(&Checkpoint {
                start_time: 0,
                total_examined: 0,
                current_cursor: key_hex(0),
            })
            .unwrap();
        store.delete();
        assert!(!store.path().exists());
        store.delete(); // second delete is a no-op
    }

    #[test]
    fn test_found_log_appends() {
        let dir = tempdir().unwrap();
        let log = FoundLog::new(dir.path().join("found").join("found.txt"));

        let mut key = [0u8; 32];
        key[31] = 1;
        let found = FoundMatch {
            key,
            address: "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm".into(),
            kind: AddressType::P2PKH,
            compressed: false,
        };

        log.append(&found).unwrap();
        log.append(&found).unwrap();

        let content = fs::read_to_string(dir.path().join("found").join("found.txt")).unwrap();
        assert_eq!(content.matches("Private Key:").count(), 2);
        assert!(content.contains(&found.key_hex()));
        assert!(content.contains("1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm"));
        // Blank-line separator between entries
        assert!(content.contains("\n\n"));
    }
}
