pub mod contact;
pub mod health;
pub mod recipe;
pub mod review;
pub mod user;

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON 请求体，解析失败统一返回 400 和标准错误格式
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
