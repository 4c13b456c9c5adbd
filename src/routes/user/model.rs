use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::operations::NewUser;
use crate::operations::validate;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NewUser> {
        let (Some(name), Some(email), Some(password)) = (self.name, self.email, self.password)
        else {
            return Err(AppError::validation("name, email and password are required"));
        };
        Ok(NewUser {
            name: validate::trimmed_min(
                &name,
                validate::MIN_NAME_CHARS,
                "Name must be at least 2 characters",
            )?,
            email: validate::email(&email)?,
            password: validate::password(&password)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> AppResult<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(AppError::validation("email and password are required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_request() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "name": "  Al ",
            "email": " al@example.com ",
            "password": "Passw0rd"
        }))
        .unwrap();
        let user = req.validate().unwrap();
        assert_eq!(user.name, "Al");
        assert_eq!(user.email, "al@example.com");

        let req: RegisterRequest = serde_json::from_value(json!({
            "name": "A",
            "email": "a@example.com",
            "password": "Passw0rd"
        }))
        .unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req: LoginRequest = serde_json::from_value(json!({ "email": "a@b.co" })).unwrap();
        assert!(req.validate().is_err());
    }
}
