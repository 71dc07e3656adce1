// libs/scheduling-cell/src/store.rs
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Cancellation, SchedulingError, SkippedSlot, Slot, SlotFilter, SlotStatus,
};

/// Owns every slot plus the cancellation audit log.
///
/// All mutation runs under the single write lock, so a batch insert's
/// overlap check and each status transition are atomic: concurrent
/// bookings of one slot serialize, and concurrent generation for the same
/// staff member cannot interleave with the conflict check. Readers share
/// the read lock.
pub struct SlotStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    slots: HashMap<Uuid, Slot>,
    cancellations: Vec<Cancellation>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                slots: HashMap::new(),
                cancellations: Vec::new(),
            }),
        }
    }

    /// All-or-nothing batch insert. If any candidate overlaps an existing
    /// non-cancelled slot for the same staff member, nothing is inserted.
    pub async fn insert_batch_atomic(
        &self,
        batch: Vec<Slot>,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let mut inner = self.inner.write().await;

        for candidate in &batch {
            if let Some(existing) = inner.find_conflict(candidate) {
                debug!(
                    "Batch rejected: candidate at {} conflicts with slot {}",
                    candidate.start_time, existing.id
                );
                return Err(SchedulingError::Overlap {
                    staff_id: candidate.staff_id,
                    start_time: candidate.start_time,
                });
            }
        }

        for slot in &batch {
            inner.slots.insert(slot.id, slot.clone());
        }

        Ok(batch)
    }

    /// Insert the non-conflicting candidates and report the skipped ones.
    pub async fn insert_batch_skipping(
        &self,
        batch: Vec<Slot>,
    ) -> (Vec<Slot>, Vec<SkippedSlot>) {
        let mut inner = self.inner.write().await;

        let mut created = Vec::new();
        let mut skipped = Vec::new();

        for candidate in batch {
            if inner.find_conflict(&candidate).is_some() {
                skipped.push(SkippedSlot {
                    staff_id: candidate.staff_id,
                    start_time: candidate.start_time,
                    end_time: candidate.end_time,
                });
            } else {
                inner.slots.insert(candidate.id, candidate.clone());
                created.push(candidate);
            }
        }

        (created, skipped)
    }

    pub async fn get(&self, slot_id: Uuid) -> Option<Slot> {
        let inner = self.inner.read().await;
        inner.slots.get(&slot_id).cloned()
    }

    /// Conditional single-record update. The closure inspects the current
    /// slot and either produces its replacement or rejects the transition;
    /// both happen under the write lock, so the check and the mutation are
    /// one atomic step and no intermediate state is ever observable.
    pub async fn update_if<F>(&self, slot_id: Uuid, f: F) -> Result<Slot, SchedulingError>
    where
        F: FnOnce(&Slot) -> Result<Slot, SchedulingError>,
    {
        let mut inner = self.inner.write().await;

        let current = inner
            .slots
            .get(&slot_id)
            .ok_or(SchedulingError::NotFound)?;

        let mut updated = f(current)?;
        updated.id = slot_id;
        updated.updated_at = Utc::now();

        inner.slots.insert(slot_id, updated.clone());
        Ok(updated)
    }

    /// Open slots matching the filter, ordered by start time with ties
    /// broken by staff id then slot id so pagination stays deterministic.
    pub async fn list_open(&self, filter: &SlotFilter) -> Vec<Slot> {
        let inner = self.inner.read().await;

        let mut found: Vec<Slot> = inner
            .slots
            .values()
            .filter(|s| s.status == SlotStatus::Open)
            .filter(|s| filter.date.map_or(true, |d| s.date() == d))
            .filter(|s| {
                filter
                    .site
                    .as_deref()
                    .map_or(true, |site| s.site.eq_ignore_ascii_case(site))
            })
            .filter(|s| {
                filter
                    .staff_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&s.staff_id))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then(a.staff_id.cmp(&b.staff_id))
                .then(a.id.cmp(&b.id))
        });
        found
    }

    /// Every slot currently or previously held by the patient.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> Vec<Slot> {
        let inner = self.inner.read().await;

        let mut found: Vec<Slot> = inner
            .slots
            .values()
            .filter(|s| s.patient_id == Some(patient_id))
            .cloned()
            .collect();

        found.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        found
    }

    /// A staff member's full agenda, any status.
    pub async fn list_for_staff(&self, staff_id: Uuid) -> Vec<Slot> {
        let inner = self.inner.read().await;

        let mut found: Vec<Slot> = inner
            .slots
            .values()
            .filter(|s| s.staff_id == staff_id)
            .cloned()
            .collect();

        found.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        found
    }

    pub async fn log_cancellation(&self, entry: Cancellation) {
        let mut inner = self.inner.write().await;
        inner.cancellations.push(entry);
    }

    pub async fn cancellations_for(&self, slot_id: Uuid) -> Vec<Cancellation> {
        let inner = self.inner.read().await;
        inner
            .cancellations
            .iter()
            .filter(|c| c.slot_id == slot_id)
            .cloned()
            .collect()
    }
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreInner {
    /// First existing non-cancelled slot for the same staff member whose
    /// window intersects the candidate's.
    fn find_conflict(&self, candidate: &Slot) -> Option<&Slot> {
        self.slots.values().find(|existing| {
            existing.staff_id == candidate.staff_id
                && existing.status != SlotStatus::Cancelled
                && existing.overlaps(candidate.start_time, candidate.end_time)
        })
    }
}
