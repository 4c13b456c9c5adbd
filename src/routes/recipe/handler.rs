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

use super::model::{CreateRecipeRequest, UpdateRecipeRequest};

#[axum::debug_handler]
pub async fn list_recipes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recipes = state.recipes().list().await?;
    if recipes.is_empty() {
        return Err(AppError::not_found("no recipes found"));
    }
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

#[axum::debug_handler]
pub async fn list_recipes_full(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recipes = state.recipes().get_all_full().await?;
    if recipes.is_empty() {
        return Err(AppError::not_found("no recipes found"));
    }
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

/// 单个食谱也以数组形式返回
#[axum::debug_handler]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = state.recipes().get_full(&recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(vec![recipe])))
}

#[axum::debug_handler]
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<CreateRecipeRequest>,
) -> AppResult<impl IntoResponse> {
    let input = req.validate()?;
    let recipe = state.recipes().create(&claims.sub, input).await?;
    Ok((StatusCode::CREATED, success_to_api_response(recipe)))
}

#[axum::debug_handler]
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(recipe_id): Path<String>,
    AppJson(req): AppJson<UpdateRecipeRequest>,
) -> AppResult<impl IntoResponse> {
    let patch = req.validate()?;
    let recipe = state
        .recipes()
        .update(&recipe_id, &claims.sub, patch)
        .await?;
    Ok((StatusCode::OK, success_to_api_response(recipe)))
}

#[axum::debug_handler]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(recipe_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.recipes().remove(&recipe_id, &claims.sub).await?;
    Ok((
        StatusCode::OK,
        message_to_api_response(format!("Recipe with id: {recipe_id} deleted successfully")),
    ))
}
