//! The activity store: sole owner of the record collection.
//!
//! Every mutation is followed by a full serialize-and-save of the collection
//! into one backend slot. A failed save rolls the in-memory change back, so
//! the collection and the slot never disagree after an error.

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::models::{ActivityId, ActivityRecord, ActivityType, NewActivity};
use crate::storage::KeyValueStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, error, info, warn};

pub const STORAGE_KEY: &str = "catActivities";

/// Number of records the recent-activity list shows.
pub const RECENT_LIMIT: usize = 10;

/// Mutations the presentation layer may request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    #[serde(alias = "Add")]
    Add(NewActivity),
    #[serde(alias = "Delete")]
    Delete { id: ActivityId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Added { record: ActivityRecord },
    Deleted { id: ActivityId, removed: bool },
}

pub struct ActivityStore<B> {
    backend: B,
    clock: Arc<dyn Clock>,
    key: String,
    activities: Vec<ActivityRecord>,
}

impl<B: KeyValueStore> ActivityStore<B> {
    /// Builds a store over `backend` and loads whatever it already holds.
    pub fn open(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self::with_key(backend, clock, STORAGE_KEY)
    }

    pub fn with_key(backend: B, clock: Arc<dyn Clock>, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            clock,
            key: key.into(),
            activities: Vec::new(),
        };
        store.activities = store.load();
        store
    }

    /// Reads the full collection from the backend. Missing or unreadable data
    /// yields an empty collection; a single unreadable record is skipped.
    pub fn load(&self) -> Vec<ActivityRecord> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                error!("failed to read activity slot {}: {err}", self.key);
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse activity slot {}: {err}", self.key);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(index, "skipping unreadable activity in {}: {err}", self.key);
                    None
                }
            })
            .collect()
    }

    /// Most recently created first.
    pub fn activities(&self) -> &[ActivityRecord] {
        &self.activities
    }

    pub fn recent(&self, limit: usize) -> &[ActivityRecord] {
        &self.activities[..limit.min(self.activities.len())]
    }

    pub fn get(&self, id: ActivityId) -> Option<&ActivityRecord> {
        self.activities.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub fn add(
        &mut self,
        kind: ActivityType,
        occurred_at: NaiveDateTime,
        notes: impl Into<String>,
    ) -> Result<ActivityRecord, StorageError> {
        let created_at = self.clock.now();
        let record = ActivityRecord {
            id: self.next_id(created_at.timestamp_millis()),
            kind,
            occurred_at,
            notes: notes.into(),
            created_at,
        };

        self.activities.insert(0, record.clone());
        if let Err(err) = self.persist() {
            self.activities.remove(0);
            return Err(err);
        }

        info!(id = %record.id, kind = %record.kind, "activity logged");
        Ok(record)
    }

    /// Removes the record with `id`, if present, and saves the collection
    /// either way. Returns the removed record.
    pub fn delete(&mut self, id: ActivityId) -> Result<Option<ActivityRecord>, StorageError> {
        let position = self.activities.iter().position(|record| record.id == id);
        let removed = position.map(|index| (index, self.activities.remove(index)));

        if let Err(err) = self.persist() {
            if let Some((index, record)) = removed {
                self.activities.insert(index, record);
            }
            return Err(err);
        }

        match &removed {
            Some(_) => info!(%id, "activity deleted"),
            None => debug!(%id, "delete ignored, no such activity"),
        }
        Ok(removed.map(|(_, record)| record))
    }

    /// Serializes the whole collection into the backend slot.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.activities)?;
        self.backend.set(&self.key, payload)
    }

    /// Drops the collection and its backend slot. Returns how many records
    /// were dropped.
    pub fn clear(&mut self) -> Result<usize, StorageError> {
        self.backend.remove(&self.key)?;
        let dropped = std::mem::take(&mut self.activities).len();
        info!(dropped, "activity log cleared");
        Ok(dropped)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, StorageError> {
        match command {
            Command::Add(new) => {
                let record = self.add(new.kind, new.occurred_at, new.notes)?;
                Ok(CommandOutcome::Added { record })
            }
            Command::Delete { id } => {
                let removed = self.delete(id)?.is_some();
                Ok(CommandOutcome::Deleted { id, removed })
            }
        }
    }

    /// Creation-time millis, bumped past every existing id when the clock
    /// has not moved on.
    fn next_id(&self, millis: i64) -> ActivityId {
        let Some(newest) = self.activities.iter().map(|record| record.id.0).max() else {
            return ActivityId(millis);
        };
        if let Some(floor) = newest.checked_add(1) {
            return ActivityId(millis.max(floor));
        }

        // Nothing fits above i64::MAX; take the closest free id at or below the clock.
        let taken: HashSet<i64> = self.activities.iter().map(|record| record.id.0).collect();
        (i64::MIN..=millis)
            .rev()
            .find(|candidate| !taken.contains(candidate))
            .map(ActivityId)
            .unwrap_or(ActivityId(millis))
    }
}
