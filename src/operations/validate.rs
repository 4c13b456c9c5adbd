// 输入校验
// 所有校验都在访问存储之前完成

use serde::{Deserialize, Serialize};

use crate::database::entities::Difficulty;
use crate::error::{AppError, AppResult};

use super::review::{MAX_COMMENT_CHARS, MAX_RATING, MIN_COMMENT_CHARS, MIN_RATING};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_TITLE_CHARS: usize = 2;
pub const MIN_INGREDIENTS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_CONTACT_MESSAGE_CHARS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 2;
pub const MIN_DIFFICULTY_CHARS: usize = 2;

/// 数字字段，客户端可能传数字也可能传数字字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumberInput {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberInput::Number(n) => n.as_f64(),
            NumberInput::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    /// 只接受没有小数部分的值
    pub fn as_integer(&self) -> Option<i64> {
        let value = self.as_f64()?;
        if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
            return None;
        }
        Some(value as i64)
    }
}

/// 去掉首尾空白后至少 `min` 个字符
pub fn trimmed_min(value: &str, min: usize, message: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < min {
        return Err(AppError::validation(message));
    }
    Ok(trimmed.to_string())
}

/// 形如 x@y.z，不含空白
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn email(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if !is_valid_email(trimmed) {
        return Err(AppError::validation("Please provide a valid email address"));
    }
    Ok(trimmed.to_string())
}

pub fn password(value: &str) -> AppResult<String> {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(AppError::validation(
            "Password must contain a lowercase letter, an uppercase letter and a number",
        ));
    }
    Ok(value.to_string())
}

pub fn rating(value: &NumberInput) -> AppResult<i32> {
    value
        .as_integer()
        .filter(|r| (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(r))
        .map(|r| r as i32)
        .ok_or_else(|| AppError::validation("rating must be a number between 1-5"))
}

pub fn comment(value: &str) -> AppResult<String> {
    let comment = trimmed_min(
        value,
        MIN_COMMENT_CHARS,
        "comment must be at least 5 characters!",
    )?;
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(
            "comment must be at most 1000 characters!",
        ));
    }
    Ok(comment)
}

pub fn cooking_time(value: &NumberInput) -> AppResult<f64> {
    value
        .as_f64()
        .filter(|t| *t >= 0.0)
        .ok_or_else(|| AppError::validation("cookingTime must be a non-negative number"))
}

pub fn servings(value: &NumberInput) -> AppResult<i32> {
    value
        .as_integer()
        .filter(|s| *s > 0)
        .map(|s| s as i32)
        .ok_or_else(|| AppError::validation("servings must be a positive whole number"))
}

pub fn difficulty(value: &str) -> AppResult<Difficulty> {
    trimmed_min(
        value,
        MIN_DIFFICULTY_CHARS,
        "difficulty must be at least two characters!",
    )?
    .parse::<Difficulty>()
    .map_err(|_| AppError::validation("difficulty must be one of Easy, Medium or Hard"))
}

pub fn description(value: &str) -> AppResult<String> {
    trimmed_min(
        value,
        MIN_DESCRIPTION_CHARS,
        "description must be at least two characters!",
    )
}

/// 去空白、去掉空项
pub fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn ingredients(items: &[String]) -> AppResult<Vec<String>> {
    let items = clean_list(items);
    if items.len() < MIN_INGREDIENTS {
        return Err(AppError::validation("must have at least two ingredients!"));
    }
    Ok(items)
}

pub fn instructions(items: &[String]) -> AppResult<Vec<String>> {
    let items = clean_list(items);
    if items.is_empty() {
        return Err(AppError::validation("must have at least one instruction!"));
    }
    Ok(items)
}

/// 标签去重，保留第一次出现的顺序，至少保留一个
pub fn tags(items: &[String]) -> AppResult<Vec<String>> {
    let mut seen = Vec::new();
    for tag in clean_list(items) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    if seen.is_empty() {
        return Err(AppError::validation("must have at least one tag!"));
    }
    Ok(seen)
}
