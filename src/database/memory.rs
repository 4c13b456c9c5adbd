// 内存存储
// 与 PostgreSQL 实现遵守相同的唯一约束和外键约束，用于测试和本地开发

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::entities::{
    ContactMessageEntity, RecipeEntity, RecipePatch, ReviewEntity, ReviewPatch, UserEntity,
};
use super::store::{CascadeOutcome, DeleteStep, EntityStore, StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    // Vec 保持插入顺序，即创建时间顺序
    users: Vec<UserEntity>,
    recipes: Vec<RecipeEntity>,
    reviews: Vec<ReviewEntity>,
    contacts: Vec<ContactMessageEntity>,
}

impl MemoryState {
    /// 模拟外键检查
    fn check_references(&self) -> StoreResult<()> {
        for recipe in &self.recipes {
            if !self.users.iter().any(|u| u.user_id == recipe.added_by) {
                return Err(StoreError::Reference(format!(
                    "recipe {} references missing user {}",
                    recipe.recipe_id, recipe.added_by
                )));
            }
        }
        for review in &self.reviews {
            if !self.recipes.iter().any(|r| r.recipe_id == review.recipe_id) {
                return Err(StoreError::Reference(format!(
                    "review {} references missing recipe {}",
                    review.review_id, review.recipe_id
                )));
            }
            if !self.users.iter().any(|u| u.user_id == review.reviewer_id) {
                return Err(StoreError::Reference(format!(
                    "review {} references missing user {}",
                    review.review_id, review.reviewer_id
                )));
            }
        }
        Ok(())
    }
}

/// 基于 `RwLock` 的内存实体存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_user(&self, user: &UserEntity) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} already exists", user.email)));
        }
        if state.users.iter().any(|u| u.user_id == user.user_id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.user_id)));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserEntity>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserEntity>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, user_ids: &[String]) -> StoreResult<Vec<UserEntity>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.user_id))
            .cloned()
            .collect())
    }

    async fn insert_recipe(&self, recipe: &RecipeEntity) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.user_id == recipe.added_by) {
            return Err(StoreError::Reference(format!(
                "recipe owner {} does not exist",
                recipe.added_by
            )));
        }
        state.recipes.push(recipe.clone());
        Ok(())
    }

    async fn find_recipe(&self, recipe_id: &str) -> StoreResult<Option<RecipeEntity>> {
        let state = self.state.read().await;
        Ok(state.recipes.iter().find(|r| r.recipe_id == recipe_id).cloned())
    }

    async fn list_recipes(&self) -> StoreResult<Vec<RecipeEntity>> {
        Ok(self.state.read().await.recipes.clone())
    }

    async fn find_recipes_by_owner(&self, user_id: &str) -> StoreResult<Vec<RecipeEntity>> {
        let state = self.state.read().await;
        Ok(state
            .recipes
            .iter()
            .filter(|r| r.added_by == user_id)
            .cloned()
            .collect())
    }

    async fn update_recipe(
        &self,
        recipe_id: &str,
        patch: &RecipePatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<RecipeEntity>> {
        let mut state = self.state.write().await;
        let Some(recipe) = state.recipes.iter_mut().find(|r| r.recipe_id == recipe_id) else {
            return Ok(None);
        };
        patch.apply(recipe);
        recipe.updated_at = updated_at;
        Ok(Some(recipe.clone()))
    }

    async fn insert_review(&self, review: &ReviewEntity) -> StoreResult<()> {
        let mut state = self.state.write().await;
        // 检查和写入在同一把写锁内完成，等价于唯一索引
        if state
            .reviews
            .iter()
            .any(|r| r.recipe_id == review.recipe_id && r.reviewer_id == review.reviewer_id)
        {
            return Err(StoreError::Conflict(format!(
                "review for recipe {} by {} already exists",
                review.recipe_id, review.reviewer_id
            )));
        }
        if !state.recipes.iter().any(|r| r.recipe_id == review.recipe_id) {
            return Err(StoreError::Reference(format!(
                "recipe {} does not exist",
                review.recipe_id
            )));
        }
        if !state.users.iter().any(|u| u.user_id == review.reviewer_id) {
            return Err(StoreError::Reference(format!(
                "reviewer {} does not exist",
                review.reviewer_id
            )));
        }
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn find_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>> {
        let state = self.state.read().await;
        Ok(state.reviews.iter().find(|r| r.review_id == review_id).cloned())
    }

    async fn find_reviews_by_recipes(
        &self,
        recipe_ids: &[String],
    ) -> StoreResult<Vec<ReviewEntity>> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .iter()
            .filter(|r| recipe_ids.contains(&r.recipe_id))
            .cloned()
            .collect())
    }

    async fn update_review(
        &self,
        review_id: &str,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ReviewEntity>> {
        let mut state = self.state.write().await;
        let Some(review) = state.reviews.iter_mut().find(|r| r.review_id == review_id) else {
            return Ok(None);
        };
        patch.apply(review);
        review.updated_at = updated_at;
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>> {
        let mut state = self.state.write().await;
        let position = state.reviews.iter().position(|r| r.review_id == review_id);
        Ok(position.map(|idx| state.reviews.remove(idx)))
    }

    async fn apply_cascade(&self, steps: &[DeleteStep]) -> StoreResult<CascadeOutcome> {
        let mut state = self.state.write().await;
        // 在副本上执行，全部成功后才替换，相当于事务
        let mut draft = state.clone();
        let mut outcome = CascadeOutcome::default();

        for step in steps {
            match step {
                DeleteStep::ReviewsOfRecipe(recipe_id) => {
                    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut draft.reviews)
                        .into_iter()
                        .partition(|r| &r.recipe_id == recipe_id);
                    draft.reviews = kept;
                    outcome.removed_reviews.extend(removed);
                }
                DeleteStep::ReviewsByReviewer(user_id) => {
                    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut draft.reviews)
                        .into_iter()
                        .partition(|r| &r.reviewer_id == user_id);
                    draft.reviews = kept;
                    outcome.removed_reviews.extend(removed);
                }
                DeleteStep::Recipe(recipe_id) => {
                    let idx = draft
                        .recipes
                        .iter()
                        .position(|r| &r.recipe_id == recipe_id)
                        .ok_or_else(|| StoreError::NotFound(format!("recipe {recipe_id}")))?;
                    if draft.reviews.iter().any(|r| &r.recipe_id == recipe_id) {
                        return Err(StoreError::Reference(format!(
                            "recipe {recipe_id} still has reviews"
                        )));
                    }
                    outcome.removed_recipes.push(draft.recipes.remove(idx));
                }
                DeleteStep::User(user_id) => {
                    let idx = draft
                        .users
                        .iter()
                        .position(|u| &u.user_id == user_id)
                        .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
                    draft.users.remove(idx);
                }
            }
        }

        draft.check_references()?;
        *state = draft;
        Ok(outcome)
    }

    async fn insert_contact(&self, message: &ContactMessageEntity) -> StoreResult<()> {
        self.state.write().await.contacts.push(message.clone());
        Ok(())
    }
}
