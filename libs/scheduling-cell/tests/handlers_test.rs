use std::sync::Arc;

use assert_matches::assert_matches;
use axum::body::Body;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use tower::ServiceExt;
use uuid::Uuid;

use scheduling_cell::handlers::{self, SchedulingState};
use scheduling_cell::models::*;
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::store::SlotStore;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use staff_cell::models::RegisterStaffRequest;
use staff_cell::StaffDirectory;

fn test_state() -> SchedulingState {
    SchedulingState::new(
        TestConfig::default().to_arc(),
        Arc::new(SlotStore::new()),
        Arc::new(StaffDirectory::new()),
    )
}

async fn seed_staff(state: &SchedulingState, specialty: &str) -> Uuid {
    state
        .directory
        .register(RegisterStaffRequest {
            full_name: "Dr. Vargas".to_string(),
            specialty: specialty.to_string(),
            site: "Main Clinic".to_string(),
        })
        .await
        .unwrap()
        .id
}

fn generation_request(staff_ids: Vec<Uuid>) -> GenerateSlotsRequest {
    GenerateSlotsRequest {
        staff_ids,
        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        interval_minutes: 30,
        site: "Main Clinic".to_string(),
        policy: GenerationPolicy::Atomic,
    }
}

/// Generate a morning agenda as admin and return the created slot ids.
async fn seed_slots(state: &SchedulingState, staff_id: Uuid) -> Vec<Uuid> {
    let admin = TestUser::admin("admin@example.com");
    let Json(body) = handlers::generate_slots(
        State(state.clone()),
        Extension(admin.to_user()),
        Json(generation_request(vec![staff_id])),
    )
    .await
    .expect("admin generation should succeed");

    body["created"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

#[tokio::test]
async fn generation_requires_the_admin_role() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let patient = TestUser::patient("patient@example.com");

    let result = handlers::generate_slots(
        State(state),
        Extension(patient.to_user()),
        Json(generation_request(vec![staff_id])),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn listing_filters_by_specialty_through_the_directory() {
    let state = test_state();
    let gp = seed_staff(&state, "General Medicine").await;
    let cardio = seed_staff(&state, "Cardiology").await;
    seed_slots(&state, gp).await;
    seed_slots(&state, cardio).await;

    let Json(body) = handlers::list_available_slots(
        State(state.clone()),
        Query(SlotSearchQuery {
            specialty: Some("Cardiology".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(body["count"], 4);
    for slot in body["slots"].as_array().unwrap() {
        assert_eq!(slot["staff_id"].as_str().unwrap(), cardio.to_string());
    }

    // Unknown specialty resolves to no staff and therefore no slots
    let Json(body) = handlers::list_available_slots(
        State(state),
        Query(SlotSearchQuery {
            specialty: Some("Dermatology".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn patients_cannot_book_for_someone_else() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let patient = TestUser::patient("patient@example.com");

    let result = handlers::book_slot(
        State(state),
        Path(slot_ids[0]),
        Extension(patient.to_user()),
        Json(BookSlotRequest {
            patient_id: Uuid::new_v4(),
            reason: None,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn booking_and_losing_a_taken_slot_maps_to_conflict() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let first = TestUser::patient("first@example.com");
    let second = TestUser::patient("second@example.com");

    let Json(body) = handlers::book_slot(
        State(state.clone()),
        Path(slot_ids[0]),
        Extension(first.to_user()),
        Json(BookSlotRequest {
            patient_id: first.id,
            reason: Some("Dolor de cabeza".to_string()),
        }),
    )
    .await
    .expect("first booking should succeed");
    assert_eq!(body["success"], true);

    let result = handlers::book_slot(
        State(state),
        Path(slot_ids[0]),
        Extension(second.to_user()),
        Json(BookSlotRequest {
            patient_id: second.id,
            reason: None,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn doctors_cannot_finish_another_doctors_slot() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let patient = TestUser::patient("patient@example.com");

    handlers::book_slot(
        State(state.clone()),
        Path(slot_ids[0]),
        Extension(patient.to_user()),
        Json(BookSlotRequest {
            patient_id: patient.id,
            reason: None,
        }),
    )
    .await
    .unwrap();

    // A doctor identity that does not match the requested staff_id
    let other_doctor = TestUser::doctor("other@example.com");
    let result = handlers::finish_slot(
        State(state),
        Path(slot_ids[0]),
        Extension(other_doctor.to_user()),
        Json(FinishSlotRequest {
            staff_id,
            medical_record_ref: Uuid::new_v4(),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn admin_can_finish_on_behalf_of_the_slots_staff() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let patient = TestUser::patient("patient@example.com");
    let admin = TestUser::admin("admin@example.com");

    handlers::book_slot(
        State(state.clone()),
        Path(slot_ids[0]),
        Extension(patient.to_user()),
        Json(BookSlotRequest {
            patient_id: patient.id,
            reason: None,
        }),
    )
    .await
    .unwrap();

    let Json(body) = handlers::finish_slot(
        State(state),
        Path(slot_ids[0]),
        Extension(admin.to_user()),
        Json(FinishSlotRequest {
            staff_id,
            medical_record_ref: Uuid::new_v4(),
        }),
    )
    .await
    .expect("admin finish should succeed");

    assert_eq!(body["slot"]["status"], "finished");
}

#[tokio::test]
async fn cancellation_log_is_admin_only() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let patient = TestUser::patient("patient@example.com");

    let result = handlers::get_slot_cancellations(
        State(state),
        Path(slot_ids[0]),
        Extension(patient.to_user()),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn cancellation_log_records_admin_cancellations() {
    let state = test_state();
    let staff_id = seed_staff(&state, "General Medicine").await;
    let slot_ids = seed_slots(&state, staff_id).await;
    let patient = TestUser::patient("patient@example.com");
    let admin = TestUser::admin("admin@example.com");

    handlers::book_slot(
        State(state.clone()),
        Path(slot_ids[0]),
        Extension(patient.to_user()),
        Json(BookSlotRequest {
            patient_id: patient.id,
            reason: None,
        }),
    )
    .await
    .unwrap();

    // Admin cancels on the patient's behalf
    handlers::cancel_slot(
        State(state.clone()),
        Path(slot_ids[0]),
        Extension(admin.to_user()),
        Json(CancelSlotRequest {
            patient_id: patient.id,
        }),
    )
    .await
    .unwrap();

    let Json(body) = handlers::get_slot_cancellations(
        State(state),
        Path(slot_ids[0]),
        Extension(admin.to_user()),
    )
    .await
    .unwrap();

    assert_eq!(body["count"], 1);
    assert_eq!(body["cancellations"][0]["cancelled_by"], "admin");
}

#[tokio::test]
async fn routes_reject_requests_without_a_valid_token() {
    let state = test_state();
    let app = scheduling_routes(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let forged = JwtTestUtils::create_invalid_signature_token(&TestUser::default());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("Authorization", format!("Bearer {}", forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn routes_accept_a_valid_token() {
    let config = TestConfig::default();
    let state = SchedulingState::new(
        config.to_arc(),
        Arc::new(SlotStore::new()),
        Arc::new(StaffDirectory::new()),
    );
    let app = scheduling_routes(state);

    let token = JwtTestUtils::create_test_token(
        &TestUser::patient("patient@example.com"),
        &config.jwt_secret,
        Some(1),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
