// 食谱聚合
// 食谱 LEFT JOIN 评价 LEFT JOIN 评价者，没有评价的食谱也必须保留

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::entities::{Difficulty, RecipeEntity, ReviewEntity, UserEntity};

/// 展开后的用户公开信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

impl UserSummary {
    fn lookup(users: &HashMap<&str, &UserEntity>, user_id: &str) -> Self {
        match users.get(user_id) {
            Some(user) => Self {
                id: user.user_id.clone(),
                name: user.name.clone(),
            },
            None => {
                // 外键保证不会发生，出现说明数据被绕过应用层修改过
                tracing::warn!("Referenced user {} is missing", user_id);
                Self {
                    id: user_id.to_string(),
                    name: String::new(),
                }
            }
        }
    }
}

impl From<&UserEntity> for UserSummary {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.user_id.clone(),
            name: user.name.clone(),
        }
    }
}

/// 食谱读模型，addedBy 展开为 {id, name}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub cooking_time: f64,
    pub description: String,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub added_by: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeView {
    pub fn new(recipe: RecipeEntity, added_by: UserSummary) -> Self {
        Self {
            id: recipe.recipe_id,
            title: recipe.title,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            tags: recipe.tags,
            cooking_time: recipe.cooking_time,
            description: recipe.description,
            difficulty: recipe.difficulty,
            servings: recipe.servings,
            added_by,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

/// 聚合视图中的单条评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub reviewer: UserSummary,
}

/// 完整食谱：食谱字段 + 评价列表 + 统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFullView {
    #[serde(flatten)]
    pub recipe: RecipeView,
    /// 按创建时间升序
    pub reviews: Vec<ReviewSummary>,
    pub reviews_count: usize,
    /// 满分 10 分（平均分乘 2），没有评价时为 null，不做四舍五入
    pub average_rating: Option<f64>,
}

/// 平均分乘 2，换算为 10 分制
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(sum as f64 / ratings.len() as f64 * 2.0)
}

/// 展开食谱作者
pub fn recipe_views(recipes: Vec<RecipeEntity>, users: &[UserEntity]) -> Vec<RecipeView> {
    let index = index_users(users);
    recipes
        .into_iter()
        .map(|recipe| {
            let added_by = UserSummary::lookup(&index, &recipe.added_by);
            RecipeView::new(recipe, added_by)
        })
        .collect()
}

/// 把食谱、评价、用户拼成完整视图
///
/// 保留食谱的原有顺序；不属于任何给定食谱的评价会被忽略。
pub fn join_recipes(
    recipes: Vec<RecipeEntity>,
    reviews: Vec<ReviewEntity>,
    users: &[UserEntity],
) -> Vec<RecipeFullView> {
    let index = index_users(users);

    let mut by_recipe: HashMap<String, Vec<ReviewEntity>> = HashMap::new();
    for review in reviews {
        by_recipe
            .entry(review.recipe_id.clone())
            .or_default()
            .push(review);
    }

    recipes
        .into_iter()
        .map(|recipe| {
            let mut matched = by_recipe.remove(&recipe.recipe_id).unwrap_or_default();
            matched.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.review_id.cmp(&b.review_id))
            });

            let ratings: Vec<i32> = matched.iter().map(|r| r.rating).collect();
            let reviews: Vec<ReviewSummary> = matched
                .into_iter()
                .map(|review| ReviewSummary {
                    reviewer: UserSummary::lookup(&index, &review.reviewer_id),
                    id: review.review_id,
                    rating: review.rating,
                    comment: review.comment,
                    created_at: review.created_at,
                })
                .collect();

            let added_by = UserSummary::lookup(&index, &recipe.added_by);
            RecipeFullView {
                recipe: RecipeView::new(recipe, added_by),
                reviews_count: reviews.len(),
                average_rating: average_rating(&ratings),
                reviews,
            }
        })
        .collect()
}

/// 收集需要展开的用户ID，去重
pub fn referenced_users(recipes: &[RecipeEntity], reviews: &[ReviewEntity]) -> Vec<String> {
    let mut ids: Vec<String> = recipes
        .iter()
        .map(|r| r.added_by.clone())
        .chain(reviews.iter().map(|r| r.reviewer_id.clone()))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn index_users(users: &[UserEntity]) -> HashMap<&str, &UserEntity> {
    users.iter().map(|u| (u.user_id.as_str(), u)).collect()
}
