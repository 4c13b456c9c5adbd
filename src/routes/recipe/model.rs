use serde::Deserialize;

use crate::database::entities::RecipePatch;
use crate::error::{AppError, AppResult};
use crate::operations::NewRecipe;
use crate::operations::validate::{self, NumberInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub cooking_time: Option<NumberInput>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub servings: Option<NumberInput>,
}

impl CreateRecipeRequest {
    pub fn validate(self) -> AppResult<NewRecipe> {
        let (
            Some(title),
            Some(ingredients),
            Some(instructions),
            Some(tags),
            Some(cooking_time),
            Some(description),
            Some(difficulty),
            Some(servings),
        ) = (
            self.title,
            self.ingredients,
            self.instructions,
            self.tags,
            self.cooking_time,
            self.description,
            self.difficulty,
            self.servings,
        )
        else {
            return Err(AppError::validation("missing fields for recipe"));
        };

        Ok(NewRecipe {
            title: validate::trimmed_min(
                &title,
                validate::MIN_TITLE_CHARS,
                "title must be at least two characters!",
            )?,
            ingredients: validate::ingredients(&ingredients)?,
            instructions: validate::instructions(&instructions)?,
            tags: validate::tags(&tags)?,
            cooking_time: validate::cooking_time(&cooking_time)?,
            description: validate::description(&description)?,
            difficulty: validate::difficulty(&difficulty)?,
            servings: validate::servings(&servings)?,
        })
    }
}

/// 部分更新，addedBy 等未列出的字段会被忽略
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub cooking_time: Option<NumberInput>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub servings: Option<NumberInput>,
}

impl UpdateRecipeRequest {
    pub fn validate(self) -> AppResult<RecipePatch> {
        Ok(RecipePatch {
            title: self
                .title
                .map(|t| {
                    validate::trimmed_min(
                        &t,
                        validate::MIN_TITLE_CHARS,
                        "title must be at least two characters!",
                    )
                })
                .transpose()?,
            ingredients: self
                .ingredients
                .map(|i| validate::ingredients(&i))
                .transpose()?,
            instructions: self
                .instructions
                .map(|i| validate::instructions(&i))
                .transpose()?,
            tags: self.tags.map(|t| validate::tags(&t)).transpose()?,
            cooking_time: self
                .cooking_time
                .map(|c| validate::cooking_time(&c))
                .transpose()?,
            description: self
                .description
                .map(|d| validate::description(&d))
                .transpose()?,
            difficulty: self
                .difficulty
                .map(|d| validate::difficulty(&d))
                .transpose()?,
            servings: self
                .servings
                .map(|s| validate::servings(&s))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::Difficulty;
    use rstest::rstest;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> CreateRecipeRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_create_request_normalizes_input() {
        let recipe = parse(json!({
            "title": "  Shakshuka ",
            "ingredients": ["eggs", "tomatoes", " "],
            "instructions": ["simmer", "crack eggs"],
            "tags": ["breakfast", "breakfast", "vegetarian"],
            "cookingTime": "25",
            "description": "one pan",
            "difficulty": "medium",
            "servings": 2
        }))
        .validate()
        .unwrap();

        assert_eq!(recipe.title, "Shakshuka");
        assert_eq!(recipe.ingredients, vec!["eggs", "tomatoes"]);
        assert_eq!(recipe.tags, vec!["breakfast", "vegetarian"]);
        assert_eq!(recipe.cooking_time, 25.0);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Shakshuka",
            "ingredients": ["eggs", "tomatoes"],
            "instructions": ["simmer"],
            "tags": ["breakfast"],
            "cookingTime": 25,
            "description": "one pan",
            "difficulty": "Easy",
            "servings": 2
        })
    }

    #[rstest]
    #[case("title", json!(null))]
    #[case("ingredients", json!(null))]
    #[case("instructions", json!(null))]
    #[case("tags", json!(null))]
    #[case("cookingTime", json!(null))]
    #[case("description", json!(null))]
    #[case("difficulty", json!(null))]
    #[case("servings", json!(null))]
    fn test_missing_fields_rejected(#[case] field: &str, #[case] value: serde_json::Value) {
        let mut body = valid_body();
        body[field] = value;
        let err = parse(body).validate().unwrap_err();
        assert_eq!(err, AppError::validation("missing fields for recipe"));
    }

    #[rstest]
    #[case("title", json!(" T "), "title must be at least two characters!")]
    #[case("ingredients", json!(["eggs", " "]), "must have at least two ingredients!")]
    #[case("instructions", json!([]), "must have at least one instruction!")]
    #[case("tags", json!([]), "must have at least one tag!")]
    #[case("tags", json!(["  "]), "must have at least one tag!")]
    #[case("description", json!(""), "description must be at least two characters!")]
    #[case("description", json!(" x "), "description must be at least two characters!")]
    #[case("difficulty", json!("E"), "difficulty must be at least two characters!")]
    #[case("difficulty", json!("extreme"), "difficulty must be one of Easy, Medium or Hard")]
    #[case("cookingTime", json!(-5), "cookingTime must be a non-negative number")]
    #[case("servings", json!("0"), "servings must be a positive whole number")]
    fn test_create_bounds(
        #[case] field: &str,
        #[case] value: serde_json::Value,
        #[case] message: &str,
    ) {
        let mut body = valid_body();
        body[field] = value.clone();
        assert_eq!(parse(body).validate().unwrap_err(), AppError::validation(message));

        let patch: UpdateRecipeRequest = serde_json::from_value(json!({ field: value })).unwrap();
        assert_eq!(patch.validate().unwrap_err(), AppError::validation(message));
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let patch: UpdateRecipeRequest = serde_json::from_value(json!({
            "servings": "3",
            "addedBy": "someone-else"
        }))
        .unwrap();
        let patch = patch.validate().unwrap();
        assert_eq!(patch.servings, Some(3));
        assert!(patch.title.is_none());
        assert!(patch.tags.is_none());
        assert!(patch.description.is_none());
    }
}
