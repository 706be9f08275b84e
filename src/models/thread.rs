use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    utils::{random_slug, slug_title},
};

pub const THREAD_SLUG_LEN: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ThreadCounters {
    pub votes: i64,
    pub comments: i64,
}

/// Selects one of the counters embedded in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCounter {
    Votes,
    Comments,
}

impl ThreadCounter {
    pub fn path(&self) -> &'static str {
        match self {
            ThreadCounter::Votes => "counters.votes",
            ThreadCounter::Comments => "counters.comments",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ThreadCounter::Votes => "votes",
            ThreadCounter::Comments => "comments",
        }
    }

    pub fn apply(&self, counters: &mut ThreadCounters, delta: i64) {
        match self {
            ThreadCounter::Votes => counters.votes += delta,
            ThreadCounter::Comments => counters.comments = (counters.comments + delta).max(0),
        }
    }
}

impl fmt::Display for ThreadCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Thread {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub slug_id: String,
    pub slug_title: String,
    pub category: String,
    pub title: String,
    pub url: Option<String>,
    pub content: String,
    #[sqlx(flatten)]
    pub counters: ThreadCounters,
    #[sqlx(rename = "created_at")]
    pub created: DateTime<Utc>,
    #[sqlx(rename = "updated_at")]
    pub updated: Option<DateTime<Utc>>,
}

impl Thread {
    pub fn new(
        request: CreateThreadRequest,
        category: &str,
        user_id: Uuid,
        username: &str,
    ) -> Result<Self> {
        let title = request
            .title
            .ok_or_else(|| AppError::Validation("no title provided".to_string()))?;
        let content = request
            .content
            .ok_or_else(|| AppError::Validation("no content provided".to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            slug_id: random_slug(THREAD_SLUG_LEN),
            slug_title: slug_title(&title),
            category: category.to_string(),
            title,
            url: request.url,
            content,
            counters: ThreadCounters::default(),
            created: Utc::now(),
            updated: None,
        })
    }
}

// Create thread request
#[derive(Debug, Default, Validate, Deserialize, Serialize)]
pub struct CreateThreadRequest {
    #[validate(
        required(message = "no title provided"),
        length(min = 1, max = 300, message = "title must be 1 to 300 characters")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "no content provided"),
        length(min = 1, max = 3000, message = "content must be 1 to 3000 characters")
    )]
    pub content: Option<String>,
    #[validate(url(message = "invalid url"))]
    pub url: Option<String>,

    // Assigned by the server, rejected when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug_title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<Value>,
}

impl CreateThreadRequest {
    pub fn validate_for_save(&self) -> Result<()> {
        self.validate()?;

        let supplied = [
            ("id", self.id.is_some()),
            ("slug_id", self.slug_id.is_some()),
            ("slug_title", self.slug_title.is_some()),
            ("counters", self.counters.is_some()),
        ];
        if let Some((field, _)) = supplied.iter().find(|(_, present)| *present) {
            return Err(AppError::Validation(format!(
                "cannot provide {} for new thread",
                field
            )));
        }

        Ok(())
    }
}
