//! Per-device record of which prompts this client has voted on.
//!
//! The ledger is a JSON object `{ "<prompt id>": "up" | "down" }` persisted
//! to a file. It is append-only in practice: [`VoteLedger::record_vote`] never
//! overwrites an existing entry. Storage problems are logged and otherwise
//! ignored, an unreadable file behaves like an empty ledger.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use promptdeck_api_types::VoteDirection;
use tracing::warn;

pub const DEFAULT_LEDGER_FILE: &str = ".promptdeck-votes.json";

type Entries = BTreeMap<String, VoteDirection>;

#[derive(Debug)]
pub struct VoteLedger {
    path: Option<PathBuf>,
    entries: Mutex<Entries>,
}

impl VoteLedger {
    /// Open the ledger stored at `path`. A missing or corrupt file starts
    /// an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// A ledger that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Entries::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_voted(&self, id: &str) -> bool {
        !id.is_empty() && self.entries().contains_key(id)
    }

    pub fn get_vote(&self, id: &str) -> Option<VoteDirection> {
        if id.is_empty() {
            return None;
        }
        self.entries().get(id).copied()
    }

    /// Record `direction` for `id` unless a vote is already recorded.
    /// Returns whether the entry was written.
    pub fn record_vote(&self, id: &str, direction: VoteDirection) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut entries = self.entries();
        if entries.contains_key(id) {
            return false;
        }
        entries.insert(id.to_string(), direction);
        self.persist(&entries);
        true
    }

    pub fn clear_vote(&self, id: &str) {
        if id.is_empty() {
            return;
        }
        let mut entries = self.entries();
        if entries.remove(id).is_some() {
            self.persist(&entries);
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    target: "promptdeck_client::ledger",
                    "ledger lock poisoned; continuing with inner state"
                );
                poisoned.into_inner()
            }
        }
    }

    fn persist(&self, entries: &Entries) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let bytes = match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(target: "promptdeck_client::ledger", error = %err, "failed to encode vote ledger");
                return;
            }
        };
        if let Err(err) = fs::write(path, bytes) {
            warn!(
                target: "promptdeck_client::ledger",
                path = %path.display(),
                error = %err,
                "failed to write vote ledger"
            );
        }
    }
}

fn load_entries(path: &Path) -> Entries {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
        Err(err) => {
            warn!(
                target: "promptdeck_client::ledger",
                path = %path.display(),
                error = %err,
                "failed to read vote ledger; starting empty"
            );
            return Entries::new();
        }
    };

    serde_json::from_slice(&raw).unwrap_or_else(|err| {
        warn!(
            target: "promptdeck_client::ledger",
            path = %path.display(),
            error = %err,
            "vote ledger is corrupt; starting empty"
        );
        Entries::new()
    })
}
