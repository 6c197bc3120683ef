pub mod extract;
pub mod health;
pub mod jobs;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// Every `/api/v1` route. Protected handlers take the `Authenticated` extractor.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/search", get(jobs::search_jobs))
        .route("/jobs/users/:id", get(jobs::list_jobs_by_user))
        .route("/jobs/:id/apply", put(jobs::apply_job))
        .route("/jobs/:id/like", put(jobs::like_job))
        .route("/jobs/:id", get(jobs::get_job).delete(jobs::delete_job))
        .route("/users/:id", get(users::get_user_profile))
        .route("/check-auth", get(users::check_auth))
}

/// Full application router with session handling, ready for outer layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::session_middleware,
        ))
        .with_state(state)
}
