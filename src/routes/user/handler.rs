use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppResult,
    routes::AppJson,
    utils::{Claims, message_to_api_response, success_to_api_response},
};

use super::model::{LoginRequest, RegisterRequest};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let input = req.validate()?;
    let session = state.users().register(input).await?;
    Ok((StatusCode::CREATED, success_to_api_response(session)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (email, password) = req.validate()?;
    let session = state.users().login(&email, &password).await?;
    Ok((StatusCode::OK, success_to_api_response(session)))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<impl IntoResponse> {
    let profile = state.users().profile(&claims.sub).await?;
    Ok((StatusCode::OK, success_to_api_response(profile)))
}

/// 注销当前账号
#[axum::debug_handler]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.users().delete_account(&claims.sub).await?;
    tracing::info!(
        user_id = %claims.sub,
        recipes = outcome.removed_recipes.len(),
        "Account closed"
    );
    Ok((
        StatusCode::OK,
        message_to_api_response("Account deleted successfully"),
    ))
}
