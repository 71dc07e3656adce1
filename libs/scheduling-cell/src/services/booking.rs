// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Cancellation, CancelledBy, SchedulingError, Slot, SlotStatus};
use crate::store::SlotStore;

pub struct BookingService {
    store: Arc<SlotStore>,
}

impl BookingService {
    pub fn new(store: Arc<SlotStore>) -> Self {
        Self { store }
    }

    /// Assign a patient to an open slot. Concurrent attempts on the same
    /// slot serialize in the store; exactly one caller observes `open` and
    /// wins, every other caller gets `SlotUnavailable`.
    pub async fn book(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
        reason: Option<String>,
    ) -> Result<Slot, SchedulingError> {
        debug!("Booking slot {} for patient {}", slot_id, patient_id);

        let booked = self
            .store
            .update_if(slot_id, |slot| {
                if slot.status != SlotStatus::Open {
                    warn!(
                        "Booking rejected: slot {} is {} not open",
                        slot_id, slot.status
                    );
                    return Err(SchedulingError::SlotUnavailable);
                }

                Ok(Slot {
                    status: SlotStatus::Booked,
                    patient_id: Some(patient_id),
                    booked_at: Some(Utc::now()),
                    visit_reason: reason,
                    ..slot.clone()
                })
            })
            .await?;

        info!("Slot {} booked by patient {}", slot_id, patient_id);
        Ok(booked)
    }

    /// Release a booked slot back to open. Only the booked patient (or an
    /// admin acting as them) may cancel; the slot becomes immediately
    /// bookable again and the cancellation is recorded in the audit log.
    pub async fn cancel(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
        cancelled_by: CancelledBy,
    ) -> Result<Slot, SchedulingError> {
        debug!("Cancelling slot {} for patient {}", slot_id, patient_id);

        let reopened = self
            .store
            .update_if(slot_id, |slot| {
                if slot.status != SlotStatus::Booked {
                    return Err(SchedulingError::InvalidTransition(slot.status));
                }
                if slot.patient_id != Some(patient_id) {
                    warn!(
                        "Cancellation rejected: patient {} does not hold slot {}",
                        patient_id, slot_id
                    );
                    return Err(SchedulingError::Forbidden);
                }

                Ok(Slot {
                    status: SlotStatus::Open,
                    patient_id: None,
                    booked_at: None,
                    visit_reason: None,
                    ..slot.clone()
                })
            })
            .await?;

        self.store
            .log_cancellation(Cancellation {
                id: Uuid::new_v4(),
                slot_id,
                patient_id,
                cancelled_by,
                cancelled_at: Utc::now(),
            })
            .await;

        info!("Slot {} cancelled and reopened", slot_id);
        Ok(reopened)
    }
}
