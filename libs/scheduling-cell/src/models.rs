// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE SLOT MODELS
// ==============================================================================

/// A discrete, staff-and-site-scoped time interval available for one
/// appointment. Slots are created in batches, never deleted, and change
/// only by status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub site: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    pub patient_id: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
    pub visit_reason: Option<String>,
    pub medical_record_ref: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    /// True when this slot's window intersects [start, end).
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Open,
    Booked,
    Cancelled,
    Finished,
}

impl SlotStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SlotStatus::Finished | SlotStatus::Cancelled)
    }

    pub fn can_transition_to(&self, target: &SlotStatus) -> bool {
        use SlotStatus::*;
        match (self, target) {
            (Open, Booked) => true,
            // Cancellation reopens the slot for rebooking
            (Booked, Open) => true,
            (Booked, Finished) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Open => write!(f, "open"),
            SlotStatus::Booked => write!(f, "booked"),
            SlotStatus::Cancelled => write!(f, "cancelled"),
            SlotStatus::Finished => write!(f, "finished"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSlotsRequest {
    pub staff_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: i32,
    pub site: String,
    #[serde(default)]
    pub policy: GenerationPolicy,
}

/// What to do when a generated slot collides with an existing one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    /// Fail the whole batch; nothing is inserted.
    #[default]
    Atomic,
    /// Insert the non-conflicting slots and report the rest.
    SkipAndReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub created: Vec<Slot>,
    pub skipped: Vec<SkippedSlot>,
}

/// A candidate that was dropped under the skip-and-report policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSlot {
    pub staff_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub patient_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSlotRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishSlotRequest {
    pub staff_id: Uuid,
    pub medical_record_ref: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotSearchQuery {
    pub date: Option<NaiveDate>,
    pub specialty: Option<String>,
    pub site: Option<String>,
}

/// Store-level filter once a specialty has been resolved to staff ids.
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub date: Option<NaiveDate>,
    pub site: Option<String>,
    pub staff_ids: Option<Vec<Uuid>>,
}

// ==============================================================================
// CANCELLATION AUDIT LOG
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub patient_id: Uuid,
    pub cancelled_by: CancelledBy,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Admin,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("Slot not found")]
    NotFound,

    #[error("Invalid slot range: {0}")]
    InvalidRange(String),

    #[error("Slot overlaps an existing slot for staff {staff_id} starting {start_time}")]
    Overlap {
        staff_id: Uuid,
        start_time: DateTime<Utc>,
    },

    #[error("Slot is not available")]
    SlotUnavailable,

    #[error("Actor is not permitted to modify this slot")]
    Forbidden,

    #[error("Slot cannot change state from {0}")]
    InvalidTransition(SlotStatus),

    #[error("Unknown staff member {0}")]
    UnknownStaff(Uuid),

    #[error("Staff member {0} is not active")]
    InactiveStaff(Uuid),
}
