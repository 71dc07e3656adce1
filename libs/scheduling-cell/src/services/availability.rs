// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use staff_cell::StaffDirectory;

use crate::models::{SchedulingError, Slot, SlotFilter, SlotSearchQuery};
use crate::store::SlotStore;

pub struct AvailabilityService {
    store: Arc<SlotStore>,
    directory: Arc<StaffDirectory>,
}

impl AvailabilityService {
    pub fn new(store: Arc<SlotStore>, directory: Arc<StaffDirectory>) -> Self {
        Self { store, directory }
    }

    /// Open slots matching the query, ordered by start time ascending with
    /// deterministic tie-breaks (staff id, then slot id).
    pub async fn list_available(&self, query: &SlotSearchQuery) -> Vec<Slot> {
        let staff_ids = match query.specialty.as_deref() {
            Some(specialty) => {
                let ids = self.directory.resolve_specialty(specialty).await;
                if ids.is_empty() {
                    debug!("No active staff for specialty {:?}", specialty);
                    return Vec::new();
                }
                Some(ids)
            }
            None => None,
        };

        let filter = SlotFilter {
            date: query.date,
            site: query.site.clone(),
            staff_ids,
        };

        let slots = self.store.list_open(&filter).await;
        debug!("Found {} available slots", slots.len());
        slots
    }

    pub async fn get_slot(&self, slot_id: Uuid) -> Result<Slot, SchedulingError> {
        self.store.get(slot_id).await.ok_or(SchedulingError::NotFound)
    }

    pub async fn patient_slots(&self, patient_id: Uuid) -> Vec<Slot> {
        self.store.list_for_patient(patient_id).await
    }

    pub async fn staff_slots(&self, staff_id: Uuid) -> Vec<Slot> {
        self.store.list_for_staff(staff_id).await
    }
}
