use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    utils::random_slug,
};

pub const COMMENT_SLUG_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub slug_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub votes: i64,
    #[sqlx(rename = "created_at")]
    pub created: DateTime<Utc>,
    #[sqlx(rename = "updated_at")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        request: CreateCommentRequest,
        thread_id: Uuid,
        user_id: Uuid,
        username: &str,
    ) -> Result<Self> {
        let content = request
            .content
            .ok_or_else(|| AppError::Validation("no content provided".to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            thread_id,
            slug_id: random_slug(COMMENT_SLUG_LEN),
            user_id,
            username: username.to_string(),
            content,
            votes: 0,
            created: Utc::now(),
            updated: None,
        })
    }
}

// Create comment request
#[derive(Debug, Default, Validate, Deserialize, Serialize)]
pub struct CreateCommentRequest {
    #[validate(
        required(message = "no content provided"),
        length(min = 1, max = 3000, message = "comment must be 1 to 3000 characters")
    )]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<i64>,
}

impl CreateCommentRequest {
    pub fn validate_for_save(&self) -> Result<()> {
        self.validate()?;

        if self.id.is_some() {
            return Err(AppError::Validation(
                "cannot provide id for new comment".to_string(),
            ));
        }
        if self.slug_id.is_some() {
            return Err(AppError::Validation(
                "cannot provide slug_id for new comment".to_string(),
            ));
        }
        // Zero is what a new comment starts with anyway
        if self.votes.is_some_and(|votes| votes != 0) {
            return Err(AppError::Validation(
                "cannot provide num votes when creating new comment".to_string(),
            ));
        }

        Ok(())
    }
}
