use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};

use crate::{
    AppState,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
    routes,
};

// 公开路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/auth/register", post(routes::user::register))
        .route("/auth/login", post(routes::user::login))
        .route("/recipes", get(routes::recipe::list_recipes))
        .route("/recipes/full", get(routes::recipe::list_recipes_full))
        .route("/recipes/{id}", get(routes::recipe::get_recipe))
        .route("/reviews/{recipe_id}", get(routes::review::list_reviews))
        .route("/contact", post(routes::contact::submit_contact))
}

// 需要登录的路由
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/auth/me",
            get(routes::user::me).delete(routes::user::delete_me),
        )
        .route("/recipes", post(routes::recipe::create_recipe))
        .route(
            "/recipes/{id}",
            patch(routes::recipe::update_recipe).delete(routes::recipe::delete_recipe),
        )
        .route("/reviews/{recipe_id}", post(routes::review::create_review))
        .route(
            "/reviews/review/{review_id}",
            get(routes::review::get_review)
                .patch(routes::review::update_review)
                .delete(routes::review::delete_review),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// 创建主路由，所有接口挂在 `api_base_uri` 下
pub fn create_router(state: AppState, rate_limiter: Option<Arc<RateLimiter>>) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state));

    let router = Router::new()
        .nest(&state.config.api_base_uri, api)
        .layer(from_fn(log_errors));

    let router = match rate_limiter {
        Some(limiter) => router.layer(from_fn_with_state(limiter, rate_limit)),
        None => router,
    };

    router.with_state(state)
}
