// libs/staff-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, StaffState};

pub fn staff_routes(state: StaffState) -> Router {
    // All staff operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::register_staff))
        .route("/", get(handlers::list_staff))
        .route("/{staff_id}", get(handlers::get_staff))
        .route("/{staff_id}/deactivate", put(handlers::deactivate_staff))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
