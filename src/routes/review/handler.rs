use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    routes::AppJson,
    utils::{Claims, message_to_api_response, success_to_api_response},
};

use super::model::{
    CreateReviewRequest, CreateReviewResponse, ReviewListResponse, ReviewResponse,
    UpdateReviewRequest,
};

#[axum::debug_handler]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let reviews = state.reviews().list_for_recipe(&recipe_id).await?;
    if reviews.is_empty() {
        return Err(AppError::not_found("no reviews found for this recipe"));
    }
    Ok((
        StatusCode::OK,
        axum::Json(ReviewListResponse {
            message: "reviews fetched successfully".into(),
            reviews,
        }),
    ))
}

#[axum::debug_handler]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(recipe_id): Path<String>,
    AppJson(req): AppJson<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let input = req.validate()?;
    let review = state
        .reviews()
        .create(&recipe_id, &claims.sub, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        axum::Json(CreateReviewResponse {
            message: "review created successfully".into(),
            populated_rating: review,
        }),
    ))
}

#[axum::debug_handler]
pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let review = state.reviews().get(&review_id).await?;
    Ok((
        StatusCode::OK,
        axum::Json(ReviewResponse {
            message: "review fetched successfully".into(),
            review,
        }),
    ))
}

#[axum::debug_handler]
pub async fn update_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(review_id): Path<String>,
    AppJson(req): AppJson<UpdateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let patch = req.validate()?;
    let review = state
        .reviews()
        .update(&review_id, &claims.sub, patch)
        .await?;
    Ok((StatusCode::OK, success_to_api_response(review)))
}

#[axum::debug_handler]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(review_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.reviews().delete(&review_id, &claims.sub).await?;
    Ok((
        StatusCode::OK,
        message_to_api_response("Review deleted successfully"),
    ))
}
