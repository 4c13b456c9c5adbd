// PostgreSQL 实体存储
// 唯一约束和外键由数据库保证，级联删除在一个事务里按顺序执行

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::entities::{
    ContactMessageEntity, Difficulty, RecipeEntity, RecipePatch, ReviewEntity, ReviewPatch,
    UserEntity,
};
use super::store::{CascadeOutcome, DeleteStep, EntityStore, StoreError, StoreResult};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const RECIPE_COLUMNS: &str = r#"
    recipe_id, title, ingredients, instructions, tags, cooking_time,
    description, difficulty, servings, added_by, created_at, updated_at
"#;

const REVIEW_COLUMNS: &str = r#"
    review_id, recipe_id, reviewer_id, rating, comment, created_at, updated_at
"#;

const USER_COLUMNS: &str = r#"
    user_id, email, name, password_hash, created_at, updated_at
"#;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict(
                    db.constraint().unwrap_or("unique constraint").to_string(),
                ),
                Some(FOREIGN_KEY_VIOLATION) => StoreError::Reference(
                    db.constraint().unwrap_or("foreign key").to_string(),
                ),
                _ => StoreError::Query(err.to_string()),
            },
            sqlx::Error::RowNotFound => StoreError::NotFound("row".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

// difficulty 在表里是 TEXT，这里做一次转换
#[derive(Debug, FromRow)]
struct RecipeRow {
    recipe_id: String,
    title: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    tags: Vec<String>,
    cooking_time: f64,
    description: String,
    difficulty: String,
    servings: i32,
    added_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for RecipeEntity {
    type Error = StoreError;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(StoreError::Query)?;
        Ok(RecipeEntity {
            recipe_id: row.recipe_id,
            title: row.title,
            ingredients: row.ingredients,
            instructions: row.instructions,
            tags: row.tags,
            cooking_time: row.cooking_time,
            description: row.description,
            difficulty,
            servings: row.servings,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_recipes(rows: Vec<RecipeRow>) -> StoreResult<Vec<RecipeEntity>> {
    rows.into_iter().map(RecipeEntity::try_from).collect()
}

/// 基于 sqlx 连接池的实体存储
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 执行 migrations 目录下的建表脚本
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn delete_step(
        tx: &mut Transaction<'_, Postgres>,
        step: &DeleteStep,
        outcome: &mut CascadeOutcome,
    ) -> StoreResult<()> {
        match step {
            DeleteStep::ReviewsOfRecipe(recipe_id) => {
                let removed = sqlx::query_as::<_, ReviewEntity>(&format!(
                    "DELETE FROM reviews WHERE recipe_id = $1 RETURNING {REVIEW_COLUMNS}"
                ))
                .bind(recipe_id)
                .fetch_all(&mut **tx)
                .await?;
                outcome.removed_reviews.extend(removed);
            }
            DeleteStep::ReviewsByReviewer(user_id) => {
                let removed = sqlx::query_as::<_, ReviewEntity>(&format!(
                    "DELETE FROM reviews WHERE reviewer_id = $1 RETURNING {REVIEW_COLUMNS}"
                ))
                .bind(user_id)
                .fetch_all(&mut **tx)
                .await?;
                outcome.removed_reviews.extend(removed);
            }
            DeleteStep::Recipe(recipe_id) => {
                let row = sqlx::query_as::<_, RecipeRow>(&format!(
                    "DELETE FROM recipes WHERE recipe_id = $1 RETURNING {RECIPE_COLUMNS}"
                ))
                .bind(recipe_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("recipe {recipe_id}")))?;
                outcome.removed_recipes.push(row.try_into()?);
            }
            DeleteStep::User(user_id) => {
                let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(StoreError::NotFound(format!("user {user_id}")));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_user(&self, user: &UserEntity) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, email, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<UserEntity>> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserEntity>> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_users(&self, user_ids: &[String]) -> StoreResult<Vec<UserEntity>> {
        let users = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_recipe(&self, recipe: &RecipeEntity) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO recipes ({RECIPE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(&recipe.recipe_id)
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.tags)
        .bind(recipe.cooking_time)
        .bind(&recipe.description)
        .bind(recipe.difficulty.as_str())
        .bind(recipe.servings)
        .bind(&recipe.added_by)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_recipe(&self, recipe_id: &str) -> StoreResult<Option<RecipeEntity>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE recipe_id = $1"
        ))
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RecipeEntity::try_from).transpose()
    }

    async fn list_recipes(&self) -> StoreResult<Vec<RecipeEntity>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY created_at, recipe_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        into_recipes(rows)
    }

    async fn find_recipes_by_owner(&self, user_id: &str) -> StoreResult<Vec<RecipeEntity>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE added_by = $1 \
             ORDER BY created_at, recipe_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        into_recipes(rows)
    }

    async fn update_recipe(
        &self,
        recipe_id: &str,
        patch: &RecipePatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<RecipeEntity>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            UPDATE recipes SET
                title = COALESCE($2, title),
                ingredients = COALESCE($3, ingredients),
                instructions = COALESCE($4, instructions),
                tags = COALESCE($5, tags),
                cooking_time = COALESCE($6, cooking_time),
                description = COALESCE($7, description),
                difficulty = COALESCE($8, difficulty),
                servings = COALESCE($9, servings),
                updated_at = $10
            WHERE recipe_id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(recipe_id)
        .bind(&patch.title)
        .bind(&patch.ingredients)
        .bind(&patch.instructions)
        .bind(&patch.tags)
        .bind(patch.cooking_time)
        .bind(&patch.description)
        .bind(patch.difficulty.map(|d| d.as_str()))
        .bind(patch.servings)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RecipeEntity::try_from).transpose()
    }

    async fn insert_review(&self, review: &ReviewEntity) -> StoreResult<()> {
        // 唯一索引 uq_reviews_recipe_reviewer 兜底并发重复提交
        sqlx::query(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(&review.review_id)
        .bind(&review.recipe_id)
        .bind(&review.reviewer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>> {
        let review = sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1"
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn find_reviews_by_recipes(
        &self,
        recipe_ids: &[String],
    ) -> StoreResult<Vec<ReviewEntity>> {
        let reviews = sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE recipe_id = ANY($1) \
             ORDER BY created_at, review_id"
        ))
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn update_review(
        &self,
        review_id: &str,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ReviewEntity>> {
        let review = sqlx::query_as::<_, ReviewEntity>(&format!(
            r#"
            UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = $4
            WHERE review_id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(review_id)
        .bind(patch.rating)
        .bind(&patch.comment)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete_review(&self, review_id: &str) -> StoreResult<Option<ReviewEntity>> {
        let review = sqlx::query_as::<_, ReviewEntity>(&format!(
            "DELETE FROM reviews WHERE review_id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn apply_cascade(&self, steps: &[DeleteStep]) -> StoreResult<CascadeOutcome> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = CascadeOutcome::default();

        for step in steps {
            // 出错时 tx 被 drop，事务自动回滚
            Self::delete_step(&mut tx, step, &mut outcome).await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    async fn insert_contact(&self, message: &ContactMessageEntity) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages (message_id, name, email, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&message.message_id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
