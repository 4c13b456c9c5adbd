use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::operations::NewContactMessage;
use crate::operations::validate;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn validate(self) -> AppResult<NewContactMessage> {
        let (Some(name), Some(email), Some(message)) = (self.name, self.email, self.message)
        else {
            return Err(AppError::validation("name, email and message are required"));
        };
        Ok(NewContactMessage {
            name: validate::trimmed_min(
                &name,
                validate::MIN_NAME_CHARS,
                "Name must be at least 2 characters",
            )?,
            email: validate::email(&email)?,
            message: validate::trimmed_min(
                &message,
                validate::MIN_CONTACT_MESSAGE_CHARS,
                "Message must be at least 5 characters",
            )?,
        })
    }
}
