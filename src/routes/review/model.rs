use serde::{Deserialize, Serialize};

use crate::database::entities::ReviewPatch;
use crate::error::{AppError, AppResult};
use crate::operations::validate::{self, NumberInput};
use crate::operations::{NewReview, ReviewDetail};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: Option<NumberInput>,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(self) -> AppResult<NewReview> {
        let (Some(rating), Some(comment)) = (self.rating, self.comment) else {
            return Err(AppError::validation("rating and comment are required"));
        };
        Ok(NewReview {
            rating: validate::rating(&rating)?,
            comment: validate::comment(&comment)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<NumberInput>,
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn validate(self) -> AppResult<ReviewPatch> {
        Ok(ReviewPatch {
            rating: self
                .rating
                .map(|r| validate::rating(&r))
                .transpose()?,
            comment: self
                .comment
                .map(|c| validate::comment(&c))
                .transpose()?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewResponse {
    pub message: String,
    pub populated_rating: ReviewDetail,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub message: String,
    pub reviews: Vec<ReviewDetail>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub review: ReviewDetail,
}
