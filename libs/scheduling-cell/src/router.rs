// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, SchedulingState};

pub fn scheduling_routes(state: SchedulingState) -> Router {
    // All slot operations require authentication
    let protected_routes = Router::new()
        // Availability
        .route("/", get(handlers::list_available_slots))
        .route("/{slot_id}", get(handlers::get_slot))
        .route("/patients/{patient_id}", get(handlers::get_patient_slots))
        .route("/staff/{staff_id}", get(handlers::get_staff_slots))
        // Bulk generation (admin)
        .route("/generate", post(handlers::generate_slots))
        // Booking lifecycle
        .route("/{slot_id}/book", put(handlers::book_slot))
        .route("/{slot_id}/cancel", put(handlers::cancel_slot))
        .route("/{slot_id}/finish", put(handlers::finish_slot))
        // Audit
        .route("/{slot_id}/cancellations", get(handlers::get_slot_cancellations))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
