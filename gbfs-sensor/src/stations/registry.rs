//! Station registry.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::feed::{StationInfoEntry, StationStatusEntry};

use super::record::{StationId, StationRecord};

/// Thread-safe station id → record mapping.
///
/// Cloning yields another handle to the same registry. Records are never
/// removed; a station that disappears upstream keeps its last values.
#[derive(Clone, Default)]
pub struct StationRegistry {
    inner: Arc<RwLock<HashMap<StationId, StationRecord>>>,
}

/// What one [`StationRegistry::merge`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Status entries applied to a record.
    pub status_applied: usize,
    /// Records created from the info document.
    pub created: usize,
    /// Status entries whose station is still unknown after the merge.
    pub unresolved: Vec<StationId>,
}

impl StationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one station's record.
    pub async fn get(&self, id: &StationId) -> Option<StationRecord> {
        let guard = self.inner.read().await;
        guard.get(id).cloned()
    }

    /// Number of known stations.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    /// Check if no station is known yet.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }

    /// All known station ids, sorted.
    pub async fn station_ids(&self) -> Vec<StationId> {
        let guard = self.inner.read().await;
        let mut ids: Vec<StationId> = guard.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether any entry names a station not in the registry.
    pub async fn has_unknown(&self, entries: &[StationStatusEntry]) -> bool {
        let guard = self.inner.read().await;
        entries.iter().any(|e| !guard.contains_key(&e.station_id))
    }

    /// Apply status entries to existing records.
    ///
    /// Returns the entries whose station is unknown; no record is created
    /// for them.
    pub async fn apply_status(&self, entries: Vec<StationStatusEntry>) -> Vec<StationStatusEntry> {
        let mut guard = self.inner.write().await;
        apply_status(&mut guard, entries)
    }

    /// Create or update records from info entries.
    ///
    /// Returns the number of records created.
    pub async fn apply_info(&self, entries: Vec<StationInfoEntry>) -> usize {
        let mut guard = self.inner.write().await;
        apply_info(&mut guard, entries)
    }

    /// Apply one refresh cycle under a single write lock.
    ///
    /// Status entries go first. Entries for unknown stations are retried
    /// once the info entries (if any) have been applied, so a station first
    /// seen in this cycle ends up with its status populated.
    pub async fn merge(
        &self,
        status: Vec<StationStatusEntry>,
        info: Option<Vec<StationInfoEntry>>,
    ) -> MergeSummary {
        let mut guard = self.inner.write().await;

        let total = status.len();
        let pending = apply_status(&mut guard, status);
        let created = info.map_or(0, |entries| apply_info(&mut guard, entries));
        let unresolved = apply_status(&mut guard, pending);

        MergeSummary {
            status_applied: total - unresolved.len(),
            created,
            unresolved: unresolved.into_iter().map(|e| e.station_id).collect(),
        }
    }
}

fn apply_status(
    records: &mut HashMap<StationId, StationRecord>,
    entries: Vec<StationStatusEntry>,
) -> Vec<StationStatusEntry> {
    entries
        .into_iter()
        .filter(|entry| match records.get_mut(&entry.station_id) {
            Some(record) => {
                record.apply_status(entry);
                false
            }
            None => true,
        })
        .collect()
}

fn apply_info(
    records: &mut HashMap<StationId, StationRecord>,
    entries: Vec<StationInfoEntry>,
) -> usize {
    let mut created = 0;
    for entry in entries {
        match records.get_mut(&entry.station_id) {
            Some(record) => record.apply_info(entry),
            None => {
                records.insert(entry.station_id.clone(), StationRecord::from_info(entry));
                created += 1;
            }
        }
    }
    created
}
