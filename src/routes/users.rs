use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::user_dto::{CheckAuthResponse, UserProfileResponse},
    error::Result,
    middleware::auth::{Authenticated, MaybeAuthenticated},
    routes::extract::ApiPath,
    AppState,
};

/// Profile lookup by identity-provider subject.
#[axum::debug_handler]
pub async fn get_user_profile(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    ApiPath(auth0_id): ApiPath<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_profile(&auth0_id).await?;
    Ok(Json(UserProfileResponse::from(user)))
}

#[axum::debug_handler]
pub async fn check_auth(MaybeAuthenticated(principal): MaybeAuthenticated) -> impl IntoResponse {
    Json(CheckAuthResponse {
        is_authenticated: principal.is_some(),
        user: principal,
    })
}
