// libs/staff-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clinician who can hold appointment slots. Read-only reference data for
/// the scheduling core; managed here by administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub full_name: String,
    pub specialty: String,
    pub site: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterStaffRequest {
    pub full_name: String,
    pub specialty: String,
    pub site: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffSearchQuery {
    pub specialty: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StaffError {
    #[error("Staff member not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),
}
