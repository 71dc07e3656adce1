// libs/scheduling-cell/src/services/lifecycle.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{SchedulingError, Slot, SlotStatus};
use crate::store::SlotStore;

pub struct LifecycleService {
    store: Arc<SlotStore>,
}

impl LifecycleService {
    pub fn new(store: Arc<SlotStore>) -> Self {
        Self { store }
    }

    /// Validate that a status transition is allowed.
    pub fn validate_transition(
        &self,
        current: &SlotStatus,
        target: &SlotStatus,
    ) -> Result<(), SchedulingError> {
        if !current.can_transition_to(target) {
            warn!("Invalid slot transition attempted: {} -> {}", current, target);
            return Err(SchedulingError::InvalidTransition(*current));
        }
        Ok(())
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(&self, current: &SlotStatus) -> Vec<SlotStatus> {
        match current {
            SlotStatus::Open => vec![SlotStatus::Booked],
            SlotStatus::Booked => vec![SlotStatus::Open, SlotStatus::Finished],
            // Terminal states
            SlotStatus::Finished => vec![],
            SlotStatus::Cancelled => vec![],
        }
    }

    /// Close out an encounter: the booked slot becomes finished with the
    /// medical-record reference attached. Only the slot's own staff member
    /// may finish it, and finished is terminal.
    pub async fn finish(
        &self,
        slot_id: Uuid,
        staff_id: Uuid,
        medical_record_ref: Uuid,
    ) -> Result<Slot, SchedulingError> {
        debug!("Finishing slot {} by staff {}", slot_id, staff_id);

        let finished = self
            .store
            .update_if(slot_id, |slot| {
                if slot.status != SlotStatus::Booked {
                    return Err(SchedulingError::InvalidTransition(slot.status));
                }
                if slot.staff_id != staff_id {
                    warn!(
                        "Finish rejected: staff {} does not own slot {}",
                        staff_id, slot_id
                    );
                    return Err(SchedulingError::Forbidden);
                }

                Ok(Slot {
                    status: SlotStatus::Finished,
                    medical_record_ref: Some(medical_record_ref),
                    ..slot.clone()
                })
            })
            .await?;

        info!(
            "Slot {} finished with record {}",
            slot_id, medical_record_ref
        );
        Ok(finished)
    }
}
