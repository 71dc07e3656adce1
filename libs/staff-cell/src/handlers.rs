// libs/staff-cell/src/handlers.rs
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

use crate::models::{RegisterStaffRequest, StaffError, StaffSearchQuery};
use crate::services::directory::StaffDirectory;

/// Shared state for the staff routes.
#[derive(Clone)]
pub struct StaffState {
    pub config: Arc<AppConfig>,
    pub directory: Arc<StaffDirectory>,
}

impl StaffState {
    pub fn new(config: Arc<AppConfig>, directory: Arc<StaffDirectory>) -> Self {
        Self { config, directory }
    }
}

fn map_staff_error(e: StaffError) -> AppError {
    match e {
        StaffError::NotFound => AppError::NotFound("Staff member not found".to_string()),
        StaffError::ValidationError(msg) => AppError::BadRequest(msg),
    }
}

#[axum::debug_handler]
pub async fn register_staff(
    State(state): State<StaffState>,
    Extension(user): Extension<User>,
    Json(request): Json<RegisterStaffRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Only administrators can register staff".to_string(),
        ));
    }

    let member = state
        .directory
        .register(request)
        .await
        .map_err(map_staff_error)?;

    Ok(Json(json!({
        "success": true,
        "staff": member,
        "message": "Staff member registered successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_staff(
    State(state): State<StaffState>,
    Query(query): Query<StaffSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let members = state.directory.search(&query).await;

    Ok(Json(json!({
        "staff": members,
        "count": members.len()
    })))
}

#[axum::debug_handler]
pub async fn get_staff(
    State(state): State<StaffState>,
    Path(staff_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let member = state.directory.get(staff_id).await.map_err(map_staff_error)?;

    Ok(Json(json!(member)))
}

#[axum::debug_handler]
pub async fn deactivate_staff(
    State(state): State<StaffState>,
    Path(staff_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Only administrators can deactivate staff".to_string(),
        ));
    }

    let member = state
        .directory
        .deactivate(staff_id)
        .await
        .map_err(map_staff_error)?;

    Ok(Json(json!({
        "success": true,
        "staff": member,
        "message": "Staff member deactivated"
    })))
}
