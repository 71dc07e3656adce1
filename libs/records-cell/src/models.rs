// libs/records-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical documentation for one encounter. The scheduling core only ever
/// sees the record id, attached as an opaque reference when a slot is
/// finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub staff_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub record_code: String,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub patient_id: Uuid,
    pub staff_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordError {
    #[error("Medical record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),
}
