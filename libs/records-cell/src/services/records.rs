// libs/records-cell/src/services/records.rs
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{CreateRecordRequest, MedicalRecord, RecordError};

/// In-process medical record registry.
pub struct MedicalRecordService {
    records: RwLock<HashMap<Uuid, MedicalRecord>>,
}

impl MedicalRecordService {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self, request: CreateRecordRequest) -> Result<MedicalRecord, RecordError> {
        if request.chief_complaint.trim().is_empty() {
            return Err(RecordError::ValidationError(
                "Chief complaint must not be empty".to_string(),
            ));
        }
        if request.diagnosis.trim().is_empty() {
            return Err(RecordError::ValidationError(
                "Diagnosis must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let record = MedicalRecord {
            id,
            patient_id: request.patient_id,
            staff_id: request.staff_id,
            slot_id: request.slot_id,
            record_code: record_code(request.patient_id, id),
            chief_complaint: request.chief_complaint.trim().to_string(),
            diagnosis: request.diagnosis.trim().to_string(),
            notes: request.notes,
            created_at,
        };

        let mut records = self.records.write().await;
        records.insert(record.id, record.clone());

        info!(
            "Medical record {} created for patient {}",
            record.record_code, record.patient_id
        );
        Ok(record)
    }

    pub async fn get(&self, record_id: Uuid) -> Result<MedicalRecord, RecordError> {
        let records = self.records.read().await;
        records.get(&record_id).cloned().ok_or(RecordError::NotFound)
    }

    /// A patient's records, newest first.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> Vec<MedicalRecord> {
        let records = self.records.read().await;

        let mut found: Vec<MedicalRecord> = records
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        debug!("Found {} records for patient {}", found.len(), patient_id);
        found
    }
}

impl Default for MedicalRecordService {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable chart number in the clinic's `HT-` series.
fn record_code(patient_id: Uuid, record_id: Uuid) -> String {
    let patient = patient_id.simple().to_string();
    let record = record_id.simple().to_string();
    format!("HT-{}-{}", &patient[..8], &record[..6]).to_uppercase()
}
