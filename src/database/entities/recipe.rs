use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// 食谱实体，对应数据库中的 recipes 表
///
/// `added_by` 创建后不可修改，所有权不会转移。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEntity {
    pub recipe_id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    /// 烹饪时间，单位按约定为分钟
    pub cooking_time: f64,
    pub description: String,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 食谱的部分更新，没有 added_by 字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub cooking_time: Option<f64>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        *self == RecipePatch::default()
    }

    pub fn apply(&self, recipe: &mut RecipeEntity) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(ingredients) = &self.ingredients {
            recipe.ingredients = ingredients.clone();
        }
        if let Some(instructions) = &self.instructions {
            recipe.instructions = instructions.clone();
        }
        if let Some(tags) = &self.tags {
            recipe.tags = tags.clone();
        }
        if let Some(cooking_time) = self.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        if let Some(description) = &self.description {
            recipe.description = description.clone();
        }
        if let Some(difficulty) = self.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(servings) = self.servings {
            recipe.servings = servings;
        }
    }
}
