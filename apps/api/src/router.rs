use std::sync::Arc;

use axum::{routing::get, Router};

use records_cell::handlers::RecordsState;
use records_cell::router::records_routes;
use records_cell::MedicalRecordService;
use scheduling_cell::handlers::SchedulingState;
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::SlotStore;
use shared_config::AppConfig;
use staff_cell::handlers::StaffState;
use staff_cell::router::staff_routes;
use staff_cell::StaffDirectory;

pub fn create_router(config: Arc<AppConfig>) -> Router {
    // Shared stores live for the lifetime of the process
    let slots = Arc::new(SlotStore::new());
    let staff = Arc::new(StaffDirectory::new());
    let records = Arc::new(MedicalRecordService::new());

    Router::new()
        .route("/", get(|| async { "HealthTrack API is running!" }))
        .nest(
            "/slots",
            scheduling_routes(SchedulingState::new(
                config.clone(),
                slots,
                staff.clone(),
            )),
        )
        .nest("/staff", staff_routes(StaffState::new(config.clone(), staff)))
        .nest(
            "/records",
            records_routes(RecordsState::new(config, records)),
        )
}
