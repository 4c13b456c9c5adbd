// 食谱操作
// 创建、修改、删除以及聚合读取

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::aggregate::{
    RecipeFullView, RecipeView, UserSummary, join_recipes, recipe_views, referenced_users,
};
use super::cascade::CascadeCoordinator;
use super::guard::authorize_recipe;
use crate::database::EntityStore;
use crate::database::entities::{Difficulty, RecipeEntity, RecipePatch, UserEntity};
use crate::error::{AppError, AppResult};
use crate::notify::{Notification, Notifier};

/// 校验通过的新食谱
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub cooking_time: f64,
    pub description: String,
    pub difficulty: Difficulty,
    pub servings: i32,
}

pub struct RecipeOperation {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl RecipeOperation {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// 所有食谱，只展开作者
    pub async fn list(&self) -> AppResult<Vec<RecipeView>> {
        let recipes = self.store.list_recipes().await?;
        let users = self
            .store
            .find_users(&referenced_users(&recipes, &[]))
            .await?;
        Ok(recipe_views(recipes, &users))
    }

    pub async fn get_full(&self, recipe_id: &str) -> AppResult<RecipeFullView> {
        let recipe = self
            .store
            .find_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe with id: {recipe_id} not found")))?;

        let mut views = self.assemble(vec![recipe]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal(format!("recipe {recipe_id} lost during join")))
    }

    pub async fn get_all_full(&self) -> AppResult<Vec<RecipeFullView>> {
        let recipes = self.store.list_recipes().await?;
        self.assemble(recipes).await
    }

    async fn assemble(&self, recipes: Vec<RecipeEntity>) -> AppResult<Vec<RecipeFullView>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<String> = recipes.iter().map(|r| r.recipe_id.clone()).collect();
        let reviews = self.store.find_reviews_by_recipes(&recipe_ids).await?;
        let users = self
            .store
            .find_users(&referenced_users(&recipes, &reviews))
            .await?;
        Ok(join_recipes(recipes, reviews, &users))
    }

    pub async fn create(&self, acting_user_id: &str, input: NewRecipe) -> AppResult<RecipeView> {
        let owner = self.acting_user(acting_user_id).await?;

        let now = Utc::now();
        let recipe = RecipeEntity {
            recipe_id: Uuid::new_v4().to_string(),
            title: input.title,
            ingredients: input.ingredients,
            instructions: input.instructions,
            tags: input.tags,
            cooking_time: input.cooking_time,
            description: input.description,
            difficulty: input.difficulty,
            servings: input.servings,
            added_by: owner.user_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_recipe(&recipe).await?;
        tracing::info!(recipe_id = %recipe.recipe_id, user_id = %owner.user_id, "Recipe created");

        self.notifier.publish(Notification::RecipeCreated {
            title: recipe.title.clone(),
            author: owner.name.clone(),
        });
        Ok(RecipeView::new(recipe, UserSummary::from(&owner)))
    }

    pub async fn update(
        &self,
        recipe_id: &str,
        acting_user_id: &str,
        patch: RecipePatch,
    ) -> AppResult<RecipeView> {
        if patch.is_empty() {
            return Err(AppError::validation("At least one field is required"));
        }
        let existing = self.store.find_recipe(recipe_id).await?;
        authorize_recipe(acting_user_id, recipe_id, existing)?;

        let updated = self
            .store
            .update_recipe(recipe_id, &patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe with id: {recipe_id} not found")))?;

        let owner = self.owner_summary(&updated.added_by).await?;
        self.notifier.publish(Notification::RecipeUpdated {
            title: updated.title.clone(),
            author: owner.name.clone(),
        });
        Ok(RecipeView::new(updated, owner))
    }

    /// 删除食谱及其全部评价
    pub async fn remove(&self, recipe_id: &str, acting_user_id: &str) -> AppResult<()> {
        let existing = self.store.find_recipe(recipe_id).await?;
        let recipe = authorize_recipe(acting_user_id, recipe_id, existing)?;

        CascadeCoordinator::new(self.store.clone())
            .delete_recipe(recipe_id)
            .await?;

        let owner = self.owner_summary(&recipe.added_by).await?;
        self.notifier.publish(Notification::RecipeDeleted {
            title: recipe.title,
            author: owner.name,
        });
        Ok(())
    }

    async fn acting_user(&self, user_id: &str) -> AppResult<UserEntity> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("User not found, please log in again"))
    }

    async fn owner_summary(&self, user_id: &str) -> AppResult<UserSummary> {
        let users = self.store.find_users(&[user_id.to_string()]).await?;
        Ok(users.first().map(UserSummary::from).unwrap_or(UserSummary {
            id: user_id.to_string(),
            name: String::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::entities::ReviewEntity;

    async fn seed_user(store: &MemoryStore, id: &str) {
        let now = Utc::now();
        store
            .insert_user(&UserEntity {
                user_id: id.into(),
                email: format!("{id}@example.com"),
                name: format!("name-{id}"),
                password_hash: String::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    fn soup() -> NewRecipe {
        NewRecipe {
            title: "Lentil soup".into(),
            ingredients: vec!["lentils".into(), "onion".into()],
            instructions: vec!["simmer 30 minutes".into()],
            tags: vec!["vegan".into(), "soup".into()],
            cooking_time: 30.0,
            description: "warming".into(),
            difficulty: Difficulty::Easy,
            servings: 4,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, RecipeOperation) {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store, "owner").await;
        seed_user(&store, "critic").await;
        let ops = RecipeOperation::new(store.clone(), Notifier::disabled());
        (store, ops)
    }

    #[tokio::test]
    async fn test_create_then_get_full_round_trip() {
        let (_, ops) = setup().await;
        let created = ops.create("owner", soup()).await.unwrap();
        assert_eq!(created.added_by.id, "owner");

        let full = ops.get_full(&created.id).await.unwrap();
        assert_eq!(full.recipe, created);
        assert!(full.reviews.is_empty());
        assert_eq!(full.reviews_count, 0);
        assert_eq!(full.average_rating, None);
    }

    #[tokio::test]
    async fn test_create_requires_existing_user() {
        let (_, ops) = setup().await;
        let err = ops.create("ghost", soup()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_non_owner_update_leaves_recipe_unchanged() {
        let (_, ops) = setup().await;
        let created = ops.create("owner", soup()).await.unwrap();
        let before = ops.get_full(&created.id).await.unwrap();

        let patch = RecipePatch {
            title: Some("Stolen soup".into()),
            ..Default::default()
        };
        let err = ops.update(&created.id, "critic", patch).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let after = ops.get_full(&created.id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_missing_recipe_is_not_found() {
        let (_, ops) = setup().await;
        let patch = RecipePatch {
            servings: Some(2),
            ..Default::default()
        };
        let err = ops.update("nope", "owner", patch).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_update_keeps_owner() {
        let (_, ops) = setup().await;
        let created = ops.create("owner", soup()).await.unwrap();
        let patch = RecipePatch {
            servings: Some(6),
            tags: Some(vec!["winter".into()]),
            ..Default::default()
        };
        let updated = ops.update(&created.id, "owner", patch).await.unwrap();
        assert_eq!(updated.servings, 6);
        assert_eq!(updated.tags, vec!["winter".to_string()]);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.added_by.id, "owner");
    }

    #[tokio::test]
    async fn test_remove_cascades_reviews() {
        let (store, ops) = setup().await;
        let created = ops.create("owner", soup()).await.unwrap();
        let now = Utc::now();
        store
            .insert_review(&ReviewEntity {
                review_id: "v1".into(),
                recipe_id: created.id.clone(),
                reviewer_id: "critic".into(),
                rating: 5,
                comment: "perfect soup".into(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let err = ops.remove(&created.id, "critic").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        ops.remove(&created.id, "owner").await.unwrap();
        assert!(store.find_review("v1").await.unwrap().is_none());
        assert!(matches!(
            ops.get_full(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_all_full_includes_unreviewed() {
        let (_, ops) = setup().await;
        ops.create("owner", soup()).await.unwrap();
        ops.create("critic", soup()).await.unwrap();
        let all = ops.get_all_full().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|v| v.reviews_count == 0));
        assert_eq!(ops.list().await.unwrap().len(), 2);
    }
}
