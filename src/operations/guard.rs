// 所有权校验
// 资源不存在返回 NotFound，存在但不属于当前用户返回 Forbidden

use uuid::Uuid;

use crate::database::entities::{RecipeEntity, ReviewEntity};
use crate::error::{AppError, AppResult};

/// 按规范形式比较两个ID
///
/// 两边都是 UUID 时比较解析后的值（忽略大小写和格式差异），否则比较去空白后的字符串。
pub fn same_id(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (Uuid::parse_str(a), Uuid::parse_str(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub fn can_mutate_recipe(acting_user_id: &str, recipe: &RecipeEntity) -> bool {
    same_id(acting_user_id, &recipe.added_by)
}

pub fn can_mutate_review(acting_user_id: &str, review: &ReviewEntity) -> bool {
    same_id(acting_user_id, &review.reviewer_id)
}

/// 先判断存在，再判断所有权
pub fn authorize_recipe(
    acting_user_id: &str,
    recipe_id: &str,
    recipe: Option<RecipeEntity>,
) -> AppResult<RecipeEntity> {
    let recipe =
        recipe.ok_or_else(|| AppError::not_found(format!("Recipe with id: {recipe_id} not found")))?;
    if !can_mutate_recipe(acting_user_id, &recipe) {
        tracing::info!(
            user_id = acting_user_id,
            recipe_id,
            "Rejected recipe mutation by non-owner"
        );
        return Err(AppError::forbidden(
            "You are not authorized to modify a recipe you haven't created",
        ));
    }
    Ok(recipe)
}

pub fn authorize_review(
    acting_user_id: &str,
    review_id: &str,
    review: Option<ReviewEntity>,
) -> AppResult<ReviewEntity> {
    let review =
        review.ok_or_else(|| AppError::not_found(format!("Review with id: {review_id} not found")))?;
    if !can_mutate_review(acting_user_id, &review) {
        tracing::info!(
            user_id = acting_user_id,
            review_id,
            "Rejected review mutation by non-owner"
        );
        return Err(AppError::forbidden("You cannot modify another user's review"));
    }
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review_by(reviewer: &str) -> ReviewEntity {
        let now = Utc::now();
        ReviewEntity {
            review_id: "v1".into(),
            recipe_id: "r1".into(),
            reviewer_id: reviewer.into(),
            rating: 4,
            comment: "great stuff".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_same_id_normalizes_uuid() {
        let id = "6f1c2d3e-4a5b-4c6d-8e7f-8091a2b3c4d5";
        assert!(same_id(id, &id.to_uppercase()));
        assert!(same_id(id, "6f1c2d3e4a5b4c6d8e7f8091a2b3c4d5"));
        assert!(same_id(&format!(" {id} "), id));
        assert!(!same_id(id, "6f1c2d3e-4a5b-4c6d-8e7f-8091a2b3c4d6"));
        assert!(same_id("plain", "plain"));
        assert!(!same_id("plain", "Plain"));
    }

    #[test]
    fn test_missing_review_is_not_found_first() {
        let err = authorize_review("anyone", "v1", None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let err = authorize_review("intruder", "v1", Some(review_by("author"))).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(authorize_review("author", "v1", Some(review_by("author"))).is_ok());
    }
}
