// 评价生命周期
// absent → created → (updated)* → deleted

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::UserSummary;
use super::guard::{authorize_review, same_id};
use crate::database::entities::{ReviewEntity, ReviewPatch};
use crate::database::{EntityStore, StoreError};
use crate::error::{AppError, AppResult};
use crate::notify::{Notification, Notifier};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const MIN_COMMENT_CHARS: usize = 5;
pub const MAX_COMMENT_CHARS: usize = 1000;

/// 校验通过的新评价
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

/// 展开后的食谱引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
}

/// 展开了食谱标题和评价者名字的评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetail {
    pub id: String,
    pub recipe: RecipeSummary,
    pub reviewer: UserSummary,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 未展开的评价，更新接口返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: String,
    pub recipe: String,
    pub reviewer: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewEntity> for ReviewRecord {
    fn from(review: ReviewEntity) -> Self {
        Self {
            id: review.review_id,
            recipe: review.recipe_id,
            reviewer: review.reviewer_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

pub struct ReviewOperation {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl ReviewOperation {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// 某个食谱下的全部评价，食谱不存在返回 NotFound
    pub async fn list_for_recipe(&self, recipe_id: &str) -> AppResult<Vec<ReviewDetail>> {
        let recipe = self
            .store
            .find_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("recipe not found"))?;

        let mut reviews = self
            .store
            .find_reviews_by_recipes(&[recipe.recipe_id.clone()])
            .await?;
        reviews.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.review_id.cmp(&b.review_id))
        });

        let mut reviewer_ids: Vec<String> = reviews.iter().map(|r| r.reviewer_id.clone()).collect();
        reviewer_ids.sort();
        reviewer_ids.dedup();
        let users = self.store.find_users(&reviewer_ids).await?;

        let summary = RecipeSummary {
            id: recipe.recipe_id,
            title: recipe.title,
        };
        Ok(reviews
            .into_iter()
            .map(|review| {
                let reviewer = users
                    .iter()
                    .find(|u| u.user_id == review.reviewer_id)
                    .map(UserSummary::from)
                    .unwrap_or_else(|| UserSummary {
                        id: review.reviewer_id.clone(),
                        name: String::new(),
                    });
                detail(review, summary.clone(), reviewer)
            })
            .collect())
    }

    pub async fn get(&self, review_id: &str) -> AppResult<ReviewDetail> {
        let review = self
            .store
            .find_review(review_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review with id: {review_id} not found")))?;
        self.expand(review).await
    }

    pub async fn create(
        &self,
        recipe_id: &str,
        reviewer_id: &str,
        input: NewReview,
    ) -> AppResult<ReviewDetail> {
        let reviewer = self
            .store
            .find_user(reviewer_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("You must be logged in"))?;
        let recipe = self
            .store
            .find_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("no recipe was found"))?;

        if same_id(&reviewer.user_id, &recipe.added_by) {
            return Err(AppError::forbidden(
                "you cannot review your own recipe, be honest!",
            ));
        }

        let now = Utc::now();
        let review = ReviewEntity {
            review_id: Uuid::new_v4().to_string(),
            recipe_id: recipe.recipe_id.clone(),
            reviewer_id: reviewer.user_id.clone(),
            rating: input.rating,
            comment: input.comment,
            created_at: now,
            updated_at: now,
        };

        // 唯一性由存储层保证，这里不做先查后写
        self.store
            .insert_review(&review)
            .await
            .map_err(insert_review_error)?;
        tracing::info!(review_id = %review.review_id, recipe_id, reviewer_id, "Review created");

        self.notifier.publish(Notification::ReviewCreated {
            recipe_title: recipe.title.clone(),
            reviewer: reviewer.name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
        });

        Ok(detail(
            review,
            RecipeSummary {
                id: recipe.recipe_id,
                title: recipe.title,
            },
            UserSummary::from(&reviewer),
        ))
    }

    pub async fn update(
        &self,
        review_id: &str,
        acting_user_id: &str,
        patch: ReviewPatch,
    ) -> AppResult<ReviewRecord> {
        if patch.is_empty() {
            return Err(AppError::validation("at least one field is needed"));
        }
        let existing = self.store.find_review(review_id).await?;
        authorize_review(acting_user_id, review_id, existing)?;

        let updated = self
            .store
            .update_review(review_id, &patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review with id: {review_id} not found")))?;

        let expanded = self.expand(updated.clone()).await?;
        self.notifier.publish(Notification::ReviewUpdated {
            recipe_title: expanded.recipe.title,
            reviewer: expanded.reviewer.name,
            rating: updated.rating,
            comment: updated.comment.clone(),
        });
        Ok(ReviewRecord::from(updated))
    }

    pub async fn delete(&self, review_id: &str, acting_user_id: &str) -> AppResult<()> {
        let existing = self.store.find_review(review_id).await?;
        let review = authorize_review(acting_user_id, review_id, existing)?;
        let expanded = self.expand(review).await?;

        self.store
            .delete_review(review_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review with id: {review_id} not found")))?;
        tracing::info!(review_id, "Review deleted");

        self.notifier.publish(Notification::ReviewDeleted {
            recipe_title: expanded.recipe.title,
            reviewer: expanded.reviewer.name,
        });
        Ok(())
    }

    async fn expand(&self, review: ReviewEntity) -> AppResult<ReviewDetail> {
        let recipe = self.store.find_recipe(&review.recipe_id).await?;
        let reviewer = self.store.find_user(&review.reviewer_id).await?;

        let recipe = RecipeSummary {
            id: review.recipe_id.clone(),
            title: recipe.map(|r| r.title).unwrap_or_default(),
        };
        let reviewer = match reviewer {
            Some(user) => UserSummary::from(&user),
            None => UserSummary {
                id: review.reviewer_id.clone(),
                name: String::new(),
            },
        };
        Ok(detail(review, recipe, reviewer))
    }
}

/// 唯一约束冲突是重复评价；外键失败说明食谱在查询之后被删除
fn insert_review_error(err: StoreError) -> AppError {
    match err {
        StoreError::Conflict(detail) => {
            tracing::debug!("Duplicate review rejected: {}", detail);
            AppError::Conflict("You have already reviewed this recipe.".into())
        }
        StoreError::Reference(detail) => {
            tracing::debug!("Review target vanished before insert: {}", detail);
            AppError::not_found("no recipe was found")
        }
        other => other.into(),
    }
}

fn detail(review: ReviewEntity, recipe: RecipeSummary, reviewer: UserSummary) -> ReviewDetail {
    ReviewDetail {
        id: review.review_id,
        recipe,
        reviewer,
        rating: review.rating,
        comment: review.comment,
        created_at: review.created_at,
        updated_at: review.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::entities::{Difficulty, RecipeEntity, UserEntity};
    use crate::notify::RecordingSink;
    use std::time::Duration;

    async fn seed(store: &MemoryStore) {
        let now = Utc::now();
        for (id, name) in [("owner", "Olive"), ("critic", "Carl"), ("other", "Omar")] {
            store
                .insert_user(&UserEntity {
                    user_id: id.into(),
                    email: format!("{id}@example.com"),
                    name: name.into(),
                    password_hash: String::new(),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }
        store
            .insert_recipe(&RecipeEntity {
                recipe_id: "r1".into(),
                title: "Pancakes".into(),
                ingredients: vec!["flour".into(), "milk".into()],
                instructions: vec!["fry".into()],
                tags: vec!["breakfast".into()],
                cooking_time: 15.0,
                description: "fluffy".into(),
                difficulty: Difficulty::Easy,
                servings: 2,
                added_by: "owner".into(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn setup() -> (Arc<MemoryStore>, ReviewOperation) {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let ops = ReviewOperation::new(store.clone(), Notifier::disabled());
        (store, ops)
    }

    fn input(rating: i32) -> NewReview {
        NewReview {
            rating,
            comment: "really good".into(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_expanded_review() {
        let (_, ops) = setup().await;
        let review = ops.create("r1", "critic", input(4)).await.unwrap();
        assert_eq!(review.recipe.title, "Pancakes");
        assert_eq!(review.reviewer.name, "Carl");
        assert_eq!(review.rating, 4);
    }

    #[tokio::test]
    async fn test_second_review_conflicts() {
        let (store, ops) = setup().await;
        ops.create("r1", "critic", input(4)).await.unwrap();
        let err = ops.create("r1", "critic", input(2)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(
            store.find_reviews_by_recipes(&["r1".into()]).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_leave_one_review() {
        let (store, ops) = setup().await;
        let ops = Arc::new(ops);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ops = ops.clone();
                tokio::spawn(async move { ops.create("r1", "critic", input(3)).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, AppError::Conflict(_))),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(
            store.find_reviews_by_recipes(&["r1".into()]).await.unwrap().len(),
            1
        );
    }

    #[test]
    fn test_insert_errors_distinguish_duplicate_from_vanished_recipe() {
        assert_eq!(
            insert_review_error(StoreError::Conflict("uq_reviews_recipe_reviewer".into())),
            AppError::Conflict("You have already reviewed this recipe.".into())
        );
        assert_eq!(
            insert_review_error(StoreError::Reference("reviews_recipe_id_fkey".into())),
            AppError::not_found("no recipe was found")
        );
        assert!(matches!(
            insert_review_error(StoreError::Unavailable("timeout".into())),
            AppError::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_self_review_forbidden() {
        let (store, ops) = setup().await;
        let err = ops.create("r1", "owner", input(5)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(
            store
                .find_reviews_by_recipes(&["r1".into()])
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_missing_recipe_and_reviewer() {
        let (_, ops) = setup().await;
        assert!(matches!(
            ops.create("missing", "critic", input(3)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ops.create("r1", "ghost", input(3)).await,
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_only_reviewer_may_update_or_delete() {
        let (_, ops) = setup().await;
        let review = ops.create("r1", "critic", input(4)).await.unwrap();
        let patch = ReviewPatch {
            rating: Some(1),
            comment: None,
        };

        let err = ops.update(&review.id, "other", patch.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = ops.delete(&review.id, "owner").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(ops.get(&review.id).await.unwrap().rating, 4);

        let updated = ops.update(&review.id, "critic", patch).await.unwrap();
        assert_eq!(updated.rating, 1);
        assert_eq!(updated.comment, "really good");
        assert_eq!(updated.reviewer, "critic");

        ops.delete(&review.id, "critic").await.unwrap();
        assert!(matches!(ops.get(&review.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_update_rejected_before_lookup() {
        let (_, ops) = setup().await;
        let err = ops
            .update("does-not-exist", "critic", ReviewPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_for_recipe() {
        let (_, ops) = setup().await;
        assert!(ops.list_for_recipe("r1").await.unwrap().is_empty());
        ops.create("r1", "critic", input(4)).await.unwrap();
        ops.create("r1", "other", input(2)).await.unwrap();

        let reviews = ops.list_for_recipe("r1").await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.recipe.title == "Pancakes"));
        assert!(matches!(
            ops.list_for_recipe("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_publishes_notification() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let sink = Arc::new(RecordingSink::default());
        let ops = ReviewOperation::new(store, Notifier::spawn(sink.clone()));

        ops.create("r1", "critic", input(5)).await.unwrap();

        let delivered = sink.wait_for(1, Duration::from_secs(2)).await;
        assert_eq!(
            delivered,
            vec![Notification::ReviewCreated {
                recipe_title: "Pancakes".into(),
                reviewer: "Carl".into(),
                rating: 5,
                comment: "really good".into(),
            }]
        );
    }
}
