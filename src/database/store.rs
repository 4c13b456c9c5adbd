// 实体存储接口
// 业务层只依赖这个 trait，PostgreSQL 和内存实现都在这里之外

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::entities::{
    ContactMessageEntity, RecipeEntity, RecipePatch, ReviewEntity, ReviewPatch, UserEntity,
};

/// 存储层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 要修改或删除的记录不存在
    #[error("{0} not found")]
    NotFound(String),
    /// 违反唯一约束
    #[error("conflict: {0}")]
    Conflict(String),
    /// 违反外键约束：引用的记录不存在，或被删除的记录仍被引用
    #[error("broken reference: {0}")]
    Reference(String),
    /// 存储不可用（连接失败、超时）
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 级联删除中的一个步骤，按顺序执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStep {
    /// 删除某个食谱下的所有评价
    ReviewsOfRecipe(String),
    /// 删除某个用户写过的所有评价
    ReviewsByReviewer(String),
    /// 删除食谱本身，不存在时整个计划失败
    Recipe(String),
    /// 删除用户本身，不存在时整个计划失败
    User(String),
}

/// 级联删除的执行结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutcome {
    pub removed_reviews: Vec<ReviewEntity>,
    pub removed_recipes: Vec<RecipeEntity>,
}

/// 持久化的四类实体：用户、食谱、评价、留言
///
/// 列表结果按创建时间升序返回，创建时间相同按 ID 排序。
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// 插入用户，邮箱重复返回 `Conflict`
    async fn insert_user(&self, user: &UserEntity) -> StoreResult<()>;
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserEntity>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserEntity>>;
    async fn find_users(&self, user_ids: &[String]) -> StoreResult<Vec<UserEntity>>;

    async fn insert_recipe(&self, recipe: &RecipeEntity) -> StoreResult<()>;
    async fn find_recipe(&self, recipe_id: &str) -> StoreResult<Option<RecipeEntity>>;
    async fn list_recipes(&self) -> StoreResult<Vec<RecipeEntity>>;
    async fn find_recipes_by_owner(&self, user_id: &str) -> StoreResult<Vec<RecipeEntity>>;
    async fn update_recipe(
        &self,
        recipe_id: &str,
        patch: &RecipePatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<RecipeEntity>>;

    /// 插入评价，(recipe_id, reviewer_id) 已存在时返回 `Conflict`，食谱或评价者不存在时返回 `Reference`
    async fn insert_review(&self, review: &ReviewEntity) -> StoreResult<()>;
    async fn find_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>>;
    async fn find_reviews_by_recipes(&self, recipe_ids: &[String])
    -> StoreResult<Vec<ReviewEntity>>;
    async fn update_review(
        &self,
        review_id: &str,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ReviewEntity>>;
    async fn delete_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>>;

    /// 在同一个事务里按顺序执行删除步骤，任何一步失败都整体回滚
    async fn apply_cascade(&self, steps: &[DeleteStep]) -> StoreResult<CascadeOutcome>;

    async fn insert_contact(&self, message: &ContactMessageEntity) -> StoreResult<()>;
}
