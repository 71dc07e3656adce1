// libs/records-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::{CreateRecordRequest, RecordError};
use crate::services::records::MedicalRecordService;

/// Shared state for the medical record routes.
#[derive(Clone)]
pub struct RecordsState {
    pub config: Arc<AppConfig>,
    pub records: Arc<MedicalRecordService>,
}

impl RecordsState {
    pub fn new(config: Arc<AppConfig>, records: Arc<MedicalRecordService>) -> Self {
        Self { config, records }
    }
}

fn map_record_error(e: RecordError) -> AppError {
    match e {
        RecordError::NotFound => AppError::NotFound("Medical record not found".to_string()),
        RecordError::ValidationError(msg) => AppError::BadRequest(msg),
    }
}

#[axum::debug_handler]
pub async fn create_record(
    State(state): State<RecordsState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<Json<Value>, AppError> {
    // The treating clinician writes their own records; admins may file on
    // a clinician's behalf
    let is_staff_self = user.role == Role::Doctor && user.id == request.staff_id;
    if !is_staff_self && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to create records for this staff member".to_string(),
        ));
    }

    let record = state
        .records
        .create(request)
        .await
        .map_err(map_record_error)?;

    Ok(Json(json!({
        "success": true,
        "record": record,
        "message": "Medical record created successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_record(
    State(state): State<RecordsState>,
    Path(record_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let record = state
        .records
        .get(record_id)
        .await
        .map_err(map_record_error)?;

    let is_clinical_reader = matches!(user.role, Role::Doctor | Role::Admin);
    if !is_clinical_reader && user.id != record.patient_id {
        return Err(AppError::Forbidden(
            "Not authorized to view this medical record".to_string(),
        ));
    }

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn get_patient_records(
    State(state): State<RecordsState>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let is_clinical_reader = matches!(user.role, Role::Doctor | Role::Admin);
    if !is_clinical_reader && user.id != patient_id {
        return Err(AppError::Forbidden(
            "Not authorized to view this patient's records".to_string(),
        ));
    }

    let records = state.records.list_for_patient(patient_id).await;

    Ok(Json(json!({
        "records": records,
        "count": records.len()
    })))
}
