// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use staff_cell::StaffDirectory;

use crate::models::{
    BookSlotRequest, CancelSlotRequest, CancelledBy, FinishSlotRequest, GenerateSlotsRequest,
    SchedulingError, SlotSearchQuery,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::services::generator::SlotGeneratorService;
use crate::services::lifecycle::LifecycleService;
use crate::store::SlotStore;

/// Shared state for the scheduling routes.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<SlotStore>,
    pub directory: Arc<StaffDirectory>,
}

impl SchedulingState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<SlotStore>,
        directory: Arc<StaffDirectory>,
    ) -> Self {
        Self {
            config,
            store,
            directory,
        }
    }
}

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::NotFound => AppError::NotFound("Slot not found".to_string()),
        SchedulingError::InvalidRange(msg) => AppError::BadRequest(msg),
        SchedulingError::Overlap { staff_id, start_time } => AppError::Conflict(format!(
            "Generated slots overlap existing slots for staff {} starting {}",
            staff_id, start_time
        )),
        SchedulingError::SlotUnavailable => AppError::Conflict(
            "Slot is no longer available. Someone may have taken it".to_string(),
        ),
        SchedulingError::Forbidden => {
            AppError::Forbidden("Not permitted to modify this slot".to_string())
        }
        SchedulingError::InvalidTransition(status) => AppError::Conflict(format!(
            "Slot cannot change state from current status: {}",
            status
        )),
        SchedulingError::UnknownStaff(id) => {
            AppError::BadRequest(format!("Unknown staff member {}", id))
        }
        SchedulingError::InactiveStaff(id) => {
            AppError::BadRequest(format!("Staff member {} is not active", id))
        }
    }
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<SchedulingState>,
    Query(query): Query<SlotSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(state.store.clone(), state.directory.clone());
    let slots = availability.list_available(&query).await;

    Ok(Json(json!({
        "slots": slots,
        "count": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(state.store.clone(), state.directory.clone());
    let slot = availability
        .get_slot(slot_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn get_patient_slots(
    State(state): State<SchedulingState>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_self_or_admin(patient_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view this patient's appointments".to_string(),
        ));
    }

    let availability = AvailabilityService::new(state.store.clone(), state.directory.clone());
    let slots = availability.patient_slots(patient_id).await;

    Ok(Json(json!({
        "slots": slots,
        "count": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_staff_slots(
    State(state): State<SchedulingState>,
    Path(staff_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_self_or_admin(staff_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view this staff member's agenda".to_string(),
        ));
    }

    let availability = AvailabilityService::new(state.store.clone(), state.directory.clone());
    let slots = availability.staff_slots(staff_id).await;

    Ok(Json(json!({
        "slots": slots,
        "count": slots.len()
    })))
}

// ==============================================================================
// GENERATION HANDLER
// ==============================================================================

#[axum::debug_handler]
pub async fn generate_slots(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Json(request): Json<GenerateSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Only administrators can generate slots".to_string(),
        ));
    }

    let generator = SlotGeneratorService::new(state.store.clone(), state.directory.clone());
    let report = generator
        .generate(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "created": report.created,
        "skipped": report.skipped,
        "message": "Agenda generated successfully"
    })))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Value>, AppError> {
    // Only the patient themselves or an admin can book on their behalf
    if !user.is_self_or_admin(request.patient_id) {
        return Err(AppError::Forbidden(
            "Not authorized to book an appointment for this patient".to_string(),
        ));
    }

    let booking = BookingService::new(state.store.clone());
    let slot = booking
        .book(slot_id, request.patient_id, request.reason)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_slot(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelSlotRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_self_or_admin(request.patient_id) {
        return Err(AppError::Forbidden(
            "Not authorized to cancel this patient's appointment".to_string(),
        ));
    }

    let cancelled_by = if user.id == request.patient_id {
        CancelledBy::Patient
    } else {
        CancelledBy::Admin
    };

    let booking = BookingService::new(state.store.clone());
    let slot = booking
        .cancel(slot_id, request.patient_id, cancelled_by)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "message": "Appointment cancelled. The slot is available again"
    })))
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn finish_slot(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<FinishSlotRequest>,
) -> Result<Json<Value>, AppError> {
    // Only the treating staff member or an admin can close an encounter
    let is_staff_self = user.role == Role::Doctor && user.id == request.staff_id;
    if !is_staff_self && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to finish this appointment".to_string(),
        ));
    }

    let lifecycle = LifecycleService::new(state.store.clone());
    let slot = lifecycle
        .finish(slot_id, request.staff_id, request.medical_record_ref)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "message": "Appointment finished and linked to medical record"
    })))
}

#[axum::debug_handler]
pub async fn get_slot_cancellations(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators can view the cancellation log".to_string(),
        ));
    }

    // 404 for slots that never existed keeps the log endpoint consistent
    let availability = AvailabilityService::new(state.store.clone(), state.directory.clone());
    availability
        .get_slot(slot_id)
        .await
        .map_err(map_scheduling_error)?;

    let cancellations = state.store.cancellations_for(slot_id).await;

    Ok(Json(json!({
        "cancellations": cancellations,
        "count": cancellations.len()
    })))
}
