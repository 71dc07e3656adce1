use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, Query, State};
use axum::Json;

use shared_models::error::AppError;
use shared_utils::test_utils::{TestConfig, TestUser};
use staff_cell::handlers::{self, StaffState};
use staff_cell::models::*;
use staff_cell::StaffDirectory;

fn register_request(name: &str, specialty: &str, site: &str) -> RegisterStaffRequest {
    RegisterStaffRequest {
        full_name: name.to_string(),
        specialty: specialty.to_string(),
        site: site.to_string(),
    }
}

#[tokio::test]
async fn registration_validates_required_fields() {
    let directory = StaffDirectory::new();

    let result = directory.register(register_request("", "Cardiology", "Main")).await;
    assert_matches!(result, Err(StaffError::ValidationError(_)));

    let result = directory.register(register_request("Dr. Rojas", " ", "Main")).await;
    assert_matches!(result, Err(StaffError::ValidationError(_)));
}

#[tokio::test]
async fn search_filters_by_specialty_and_site() {
    let directory = StaffDirectory::new();
    directory
        .register(register_request("Dr. Vargas", "General Medicine", "Main Clinic"))
        .await
        .unwrap();
    directory
        .register(register_request("Dr. Rojas", "Cardiology", "Main Clinic"))
        .await
        .unwrap();
    directory
        .register(register_request("Dr. Pinto", "Cardiology", "North Branch"))
        .await
        .unwrap();

    let cardiologists = directory
        .search(&StaffSearchQuery {
            specialty: Some("cardiology".to_string()),
            site: None,
        })
        .await;
    assert_eq!(cardiologists.len(), 2);

    let north = directory
        .search(&StaffSearchQuery {
            specialty: Some("Cardiology".to_string()),
            site: Some("North Branch".to_string()),
        })
        .await;
    assert_eq!(north.len(), 1);
    assert_eq!(north[0].full_name, "Dr. Pinto");
}

#[tokio::test]
async fn deactivated_members_leave_search_and_specialty_resolution() {
    let directory = StaffDirectory::new();
    let member = directory
        .register(register_request("Dr. Rojas", "Cardiology", "Main Clinic"))
        .await
        .unwrap();

    assert_eq!(directory.resolve_specialty("Cardiology").await, vec![member.id]);

    directory.deactivate(member.id).await.unwrap();

    assert!(directory.resolve_specialty("Cardiology").await.is_empty());
    assert!(directory.search(&StaffSearchQuery::default()).await.is_empty());

    // Still fetchable directly for historical slots
    let fetched = directory.get(member.id).await.unwrap();
    assert!(!fetched.active);
}

#[tokio::test]
async fn unknown_member_is_not_found() {
    let directory = StaffDirectory::new();
    assert_matches!(
        directory.get(uuid::Uuid::new_v4()).await,
        Err(StaffError::NotFound)
    );
    assert_matches!(
        directory.deactivate(uuid::Uuid::new_v4()).await,
        Err(StaffError::NotFound)
    );
}

#[tokio::test]
async fn registration_handler_requires_the_admin_role() {
    let state = StaffState::new(TestConfig::default().to_arc(), Arc::new(StaffDirectory::new()));
    let doctor = TestUser::doctor("doc@example.com");

    let result = handlers::register_staff(
        State(state.clone()),
        Extension(doctor.to_user()),
        Json(register_request("Dr. Rojas", "Cardiology", "Main Clinic")),
    )
    .await;
    assert_matches!(result, Err(AppError::Forbidden(_)));

    let admin = TestUser::admin("admin@example.com");
    let Json(body) = handlers::register_staff(
        State(state.clone()),
        Extension(admin.to_user()),
        Json(register_request("Dr. Rojas", "Cardiology", "Main Clinic")),
    )
    .await
    .expect("admin registration should succeed");
    assert_eq!(body["success"], true);

    let Json(listing) = handlers::list_staff(
        State(state),
        Query(StaffSearchQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(listing["count"], 1);
}

#[tokio::test]
async fn deactivation_handler_requires_the_admin_role() {
    let state = StaffState::new(TestConfig::default().to_arc(), Arc::new(StaffDirectory::new()));
    let admin = TestUser::admin("admin@example.com");
    let member = state
        .directory
        .register(register_request("Dr. Rojas", "Cardiology", "Main Clinic"))
        .await
        .unwrap();

    let patient = TestUser::patient("patient@example.com");
    let result = handlers::deactivate_staff(
        State(state.clone()),
        Path(member.id),
        Extension(patient.to_user()),
    )
    .await;
    assert_matches!(result, Err(AppError::Forbidden(_)));

    let Json(body) = handlers::deactivate_staff(
        State(state),
        Path(member.id),
        Extension(admin.to_user()),
    )
    .await
    .unwrap();
    assert_eq!(body["staff"]["active"], false);
}
