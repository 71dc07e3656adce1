// libs/records-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, RecordsState};

pub fn records_routes(state: RecordsState) -> Router {
    // All record operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::create_record))
        .route("/{record_id}", get(handlers::get_record))
        .route("/patients/{patient_id}", get(handlers::get_patient_records))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
