//! Ledger storage backends
//!
//! A store only ever gains entries. The single write operation,
//! `append_if_tail`, is a compare-and-swap on the chain length: it persists
//! the entry only if the store still holds exactly
//! `entry.sequence_num - 1` entries for that loan. Two concurrent
//! appenders computing the same sequence number therefore cannot both
//! succeed; the loser re-reads the tail and retries.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};

/// Append-only storage for ledger entries, keyed by loan.
pub trait LedgerStore: Send + Sync {
    /// All entries for a loan in sequence order, from a consistent snapshot.
    fn load(&self, loan_id: &str) -> LedgerResult<Vec<LedgerEntry>>;

    /// The highest-sequence entry for a loan, if any.
    fn tail(&self, loan_id: &str) -> LedgerResult<Option<LedgerEntry>> {
        Ok(self.load(loan_id)?.pop())
    }

    /// Atomically persist `entry` iff the loan's chain currently ends at
    /// `entry.sequence_num - 1`. Fails with `LedgerError::RaceLost` when
    /// another appender got there first.
    fn append_if_tail(&self, entry: &LedgerEntry) -> LedgerResult<()>;

    /// Every loan with at least one entry, sorted.
    fn loan_ids(&self) -> LedgerResult<Vec<String>>;
}

/// In-memory store, used in tests and for ephemeral evaluation runs.
#[derive(Default)]
pub struct MemoryStore {
    chains: RwLock<HashMap<String, Vec<LedgerEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored entry in place, bypassing the append-only API.
    ///
    /// This models an attacker with raw storage access and exists so the
    /// verifier's tamper detection can be exercised. Production code paths
    /// never call it.
    pub fn overwrite_entry<F>(&self, loan_id: &str, sequence_num: u64, mutate: F) -> LedgerResult<()>
    where
        F: FnOnce(&mut LedgerEntry),
    {
        let mut chains = self.chains.write().map_err(|_| LedgerError::LockPoisoned)?;
        if let Some(chain) = chains.get_mut(loan_id) {
            if let Some(entry) = chain
                .iter_mut()
                .find(|e| e.sequence_num == sequence_num)
            {
                mutate(entry);
            }
        }
        Ok(())
    }

    /// Remove a stored entry, bypassing the append-only API. Attack
    /// simulation only, like `overwrite_entry`.
    pub fn delete_entry(&self, loan_id: &str, sequence_num: u64) -> LedgerResult<()> {
        let mut chains = self.chains.write().map_err(|_| LedgerError::LockPoisoned)?;
        if let Some(chain) = chains.get_mut(loan_id) {
            chain.retain(|e| e.sequence_num != sequence_num);
        }
        Ok(())
    }

    /// Swap two stored entries by position. Attack simulation only.
    pub fn swap_entries(&self, loan_id: &str, a: usize, b: usize) -> LedgerResult<()> {
        let mut chains = self.chains.write().map_err(|_| LedgerError::LockPoisoned)?;
        if let Some(chain) = chains.get_mut(loan_id) {
            if a < chain.len() && b < chain.len() {
                chain.swap(a, b);
            }
        }
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, loan_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let chains = self.chains.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(chains.get(loan_id).cloned().unwrap_or_default())
    }

    fn tail(&self, loan_id: &str) -> LedgerResult<Option<LedgerEntry>> {
        let chains = self.chains.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(chains.get(loan_id).and_then(|c| c.last().cloned()))
    }

    fn append_if_tail(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let mut chains = self.chains.write().map_err(|_| LedgerError::LockPoisoned)?;
        let chain = chains.entry(entry.loan_id.clone()).or_default();

        if chain.len() as u64 + 1 != entry.sequence_num {
            return Err(LedgerError::RaceLost {
                loan_id: entry.loan_id.clone(),
                sequence: entry.sequence_num,
            });
        }

        chain.push(entry.clone());
        Ok(())
    }

    fn loan_ids(&self) -> LedgerResult<Vec<String>> {
        let chains = self.chains.read().map_err(|_| LedgerError::LockPoisoned)?;
        let mut ids: Vec<String> = chains
            .iter()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Append-only JSONL store: one `<loan_id>.jsonl` file per loan, one JSON
/// entry per line. Files are only ever opened in append mode.
pub struct JsonlStore {
    base_path: PathBuf,
    // Per-loan write locks; appends for different loans stay independent.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonlStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl AsRef<Path>) -> LedgerResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn path_for(&self, loan_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", loan_id))
    }

    fn loan_lock(&self, loan_id: &str) -> LedgerResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(locks
            .entry(loan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    fn read_chain(&self, loan_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let path = self.path_for(loan_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LedgerEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

impl LedgerStore for JsonlStore {
    fn load(&self, loan_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let lock = self.loan_lock(loan_id)?;
        let _guard = lock.lock().map_err(|_| LedgerError::LockPoisoned)?;
        self.read_chain(loan_id)
    }

    fn append_if_tail(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let lock = self.loan_lock(&entry.loan_id)?;
        let _guard = lock.lock().map_err(|_| LedgerError::LockPoisoned)?;

        // Re-read under the loan lock: the tail observed by the caller may
        // be stale by now.
        let current = self.read_chain(&entry.loan_id)?;
        if current.len() as u64 + 1 != entry.sequence_num {
            return Err(LedgerError::RaceLost {
                loan_id: entry.loan_id.clone(),
                sequence: entry.sequence_num,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(&entry.loan_id))?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        file.flush()?;
        Ok(())
    }

    fn loan_ids(&self) -> LedgerResult<Vec<String>> {
        let mut ids = Vec::new();
        for dir_entry in fs::read_dir(&self.base_path)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
