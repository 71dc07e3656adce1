// libs/scheduling-cell/src/services/generator.rs
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use staff_cell::StaffDirectory;

use crate::models::{
    GenerateSlotsRequest, GenerationPolicy, GenerationReport, SchedulingError, Slot, SlotStatus,
};
use crate::store::SlotStore;

pub struct SlotGeneratorService {
    store: Arc<SlotStore>,
    directory: Arc<StaffDirectory>,
}

impl SlotGeneratorService {
    pub fn new(store: Arc<SlotStore>, directory: Arc<StaffDirectory>) -> Self {
        Self { store, directory }
    }

    /// Generate a day's agenda for a set of staff members: one open slot per
    /// interval step per staff member. A trailing window shorter than the
    /// interval produces no slot.
    pub async fn generate(
        &self,
        request: GenerateSlotsRequest,
    ) -> Result<GenerationReport, SchedulingError> {
        self.validate_request(&request)?;

        let mut staff_ids = request.staff_ids.clone();
        staff_ids.sort();
        staff_ids.dedup();

        for &staff_id in &staff_ids {
            let member = self
                .directory
                .get(staff_id)
                .await
                .map_err(|_| SchedulingError::UnknownStaff(staff_id))?;
            if !member.active {
                return Err(SchedulingError::InactiveStaff(staff_id));
            }
        }

        let candidates = self.build_candidates(&staff_ids, &request);
        debug!(
            "Generated {} slot candidates for {} staff on {}",
            candidates.len(),
            staff_ids.len(),
            request.date
        );

        let report = match request.policy {
            GenerationPolicy::Atomic => {
                let created = self.store.insert_batch_atomic(candidates).await?;
                GenerationReport {
                    created,
                    skipped: Vec::new(),
                }
            }
            GenerationPolicy::SkipAndReport => {
                let (created, skipped) = self.store.insert_batch_skipping(candidates).await;
                GenerationReport { created, skipped }
            }
        };

        info!(
            "Slot generation for {} created {} slots ({} skipped)",
            request.date,
            report.created.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn validate_request(&self, request: &GenerateSlotsRequest) -> Result<(), SchedulingError> {
        if request.staff_ids.is_empty() {
            return Err(SchedulingError::InvalidRange(
                "At least one staff member is required".to_string(),
            ));
        }
        if request.site.trim().is_empty() {
            return Err(SchedulingError::InvalidRange(
                "Site must not be empty".to_string(),
            ));
        }
        if request.interval_minutes <= 0 {
            return Err(SchedulingError::InvalidRange(
                "Interval must be a positive number of minutes".to_string(),
            ));
        }
        if request.end_time <= request.start_time {
            return Err(SchedulingError::InvalidRange(
                "End time must be after start time".to_string(),
            ));
        }
        Ok(())
    }

    fn build_candidates(&self, staff_ids: &[Uuid], request: &GenerateSlotsRequest) -> Vec<Slot> {
        let interval = ChronoDuration::minutes(request.interval_minutes as i64);
        let window_start = request.date.and_time(request.start_time).and_utc();
        let window_end = request.date.and_time(request.end_time).and_utc();
        let now = Utc::now();

        let mut candidates = Vec::new();

        for &staff_id in staff_ids {
            let mut current = window_start;
            while current + interval <= window_end {
                candidates.push(Slot {
                    id: Uuid::new_v4(),
                    staff_id,
                    site: request.site.trim().to_string(),
                    start_time: current,
                    end_time: current + interval,
                    status: SlotStatus::Open,
                    patient_id: None,
                    booked_at: None,
                    visit_reason: None,
                    medical_record_ref: None,
                    created_at: now,
                    updated_at: now,
                });
                current += interval;
            }
        }

        candidates
    }
}
