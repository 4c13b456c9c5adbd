// 级联删除
// 先删子记录再删父记录，整个计划在存储层的一个事务里执行

use std::sync::Arc;

use crate::database::{CascadeOutcome, DeleteStep, EntityStore, StoreError};
use crate::error::{AppError, AppResult};

/// 删除食谱：评价 → 食谱
pub fn recipe_plan(recipe_id: &str) -> Vec<DeleteStep> {
    vec![
        DeleteStep::ReviewsOfRecipe(recipe_id.to_string()),
        DeleteStep::Recipe(recipe_id.to_string()),
    ]
}

/// 删除用户：每个食谱的完整级联 → 该用户写的评价 → 用户
pub fn user_plan(user_id: &str, recipe_ids: &[String]) -> Vec<DeleteStep> {
    let mut steps: Vec<DeleteStep> = recipe_ids.iter().flat_map(|id| recipe_plan(id)).collect();
    steps.push(DeleteStep::ReviewsByReviewer(user_id.to_string()));
    steps.push(DeleteStep::User(user_id.to_string()));
    steps
}

/// 级联删除协调器，不做所有权校验，调用方负责
pub struct CascadeCoordinator {
    store: Arc<dyn EntityStore>,
}

impl CascadeCoordinator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn delete_recipe(&self, recipe_id: &str) -> AppResult<CascadeOutcome> {
        let outcome = self
            .store
            .apply_cascade(&recipe_plan(recipe_id))
            .await
            .map_err(|e| cascade_error(e, "recipe", recipe_id))?;

        tracing::info!(
            recipe_id,
            removed_reviews = outcome.removed_reviews.len(),
            "Recipe deleted"
        );
        Ok(outcome)
    }

    pub async fn delete_user(&self, user_id: &str) -> AppResult<CascadeOutcome> {
        let recipe_ids: Vec<String> = self
            .store
            .find_recipes_by_owner(user_id)
            .await?
            .into_iter()
            .map(|r| r.recipe_id)
            .collect();

        // 枚举之后新建的食谱会让外键检查失败，整个删除回滚
        let outcome = self
            .store
            .apply_cascade(&user_plan(user_id, &recipe_ids))
            .await
            .map_err(|e| cascade_error(e, "user", user_id))?;

        tracing::info!(
            user_id,
            removed_recipes = outcome.removed_recipes.len(),
            removed_reviews = outcome.removed_reviews.len(),
            "User deleted"
        );
        Ok(outcome)
    }
}

fn cascade_error(err: StoreError, kind: &str, id: &str) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found(format!("{kind} with id: {id} not found")),
        StoreError::Conflict(detail) | StoreError::Reference(detail) => {
            tracing::warn!("Cascade delete of {} {} aborted: {}", kind, id, detail);
            AppError::Conflict(format!(
                "{kind} with id: {id} changed during deletion, please retry"
            ))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_plan_children_first() {
        assert_eq!(
            recipe_plan("r1"),
            vec![
                DeleteStep::ReviewsOfRecipe("r1".into()),
                DeleteStep::Recipe("r1".into()),
            ]
        );
    }

    #[test]
    fn test_user_plan_order() {
        let plan = user_plan("u1", &["r1".into(), "r2".into()]);
        assert_eq!(
            plan,
            vec![
                DeleteStep::ReviewsOfRecipe("r1".into()),
                DeleteStep::Recipe("r1".into()),
                DeleteStep::ReviewsOfRecipe("r2".into()),
                DeleteStep::Recipe("r2".into()),
                DeleteStep::ReviewsByReviewer("u1".into()),
                DeleteStep::User("u1".into()),
            ]
        );
    }

    #[test]
    fn test_user_plan_without_recipes() {
        assert_eq!(
            user_plan("u1", &[]),
            vec![
                DeleteStep::ReviewsByReviewer("u1".into()),
                DeleteStep::User("u1".into()),
            ]
        );
    }
}
