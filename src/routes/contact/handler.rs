use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{AppState, error::AppResult, routes::AppJson, utils::success_to_api_response};

use super::model::ContactRequest;

#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<AppState>,
    AppJson(req): AppJson<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    let input = req.validate()?;
    let message = state.contacts().submit(input).await?;
    Ok((StatusCode::CREATED, success_to_api_response(message)))
}
