use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 评价实体，对应数据库中的 reviews 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReviewEntity {
    /// 评价ID
    pub review_id: String,
    /// 被评价的食谱ID
    pub recipe_id: String,
    /// 评价者用户ID
    pub reviewer_id: String,
    /// 评分 1-5
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 评价的部分更新，None 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }

    pub fn apply(&self, review: &mut ReviewEntity) {
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(comment) = &self.comment {
            review.comment = comment.clone();
        }
    }
}
