use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

use crate::models::VoteRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown Role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub threads: i64,
    pub comments: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounters {
    pub num: Counter,
    pub votes: Counter,
}

/// Selects one of the user-side aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCounter {
    NumThreads,
    NumComments,
    VotesThreads,
    VotesComments,
}

impl UserCounter {
    /// Dotted path of the counter inside `counters`.
    pub fn path(&self) -> &'static str {
        match self {
            UserCounter::NumThreads => "num.threads",
            UserCounter::NumComments => "num.comments",
            UserCounter::VotesThreads => "votes.threads",
            UserCounter::VotesComments => "votes.comments",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            UserCounter::NumThreads => "num_threads",
            UserCounter::NumComments => "num_comments",
            UserCounter::VotesThreads => "votes_threads",
            UserCounter::VotesComments => "votes_comments",
        }
    }

    /// Post counts never go below zero; vote aggregates are signed.
    pub fn is_non_negative(&self) -> bool {
        matches!(self, UserCounter::NumThreads | UserCounter::NumComments)
    }

    pub fn apply(&self, counters: &mut UserCounters, delta: i64) {
        let slot = match self {
            UserCounter::NumThreads => &mut counters.num.threads,
            UserCounter::NumComments => &mut counters.num.comments,
            UserCounter::VotesThreads => &mut counters.votes.threads,
            UserCounter::VotesComments => &mut counters.votes.comments,
        };
        *slot += delta;
        if self.is_non_negative() && *slot < 0 {
            *slot = 0;
        }
    }
}

impl fmt::Display for UserCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub validated: bool,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub email_hash: Option<String>,
    pub counters: UserCounters,
    pub votes: VoteRecord,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        username: String,
        role: Role,
        password_hash: String,
        email_hash: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            validated: false,
            username,
            password_hash,
            email_hash,
            counters: UserCounters::default(),
            votes: VoteRecord::default(),
            created: Utc::now(),
            updated: None,
            deactivated: None,
        }
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated.is_some()
    }
}

// Flat row as stored in postgres
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub validated: bool,
    pub password_hash: String,
    pub email_hash: Option<String>,
    pub num_threads: i64,
    pub num_comments: i64,
    pub votes_threads: i64,
    pub votes_comments: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl UserRow {
    pub fn into_user(self, votes: VoteRecord) -> Result<User, String> {
        Ok(User {
            id: self.id,
            role: self.role.parse()?,
            validated: self.validated,
            username: self.username,
            password_hash: self.password_hash,
            email_hash: self.email_hash,
            counters: UserCounters {
                num: Counter {
                    threads: self.num_threads,
                    comments: self.num_comments,
                },
                votes: Counter {
                    threads: self.votes_threads,
                    comments: self.votes_comments,
                },
            },
            votes,
            created: self.created_at,
            updated: self.updated_at,
            deactivated: self.deactivated_at,
        })
    }
}

// Signup / admin creation request
#[derive(Debug, Validate, Deserialize, Serialize)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "username must be 1 to 255 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
}

#[derive(Debug, Validate, Deserialize, Serialize)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "no username provided"))]
    pub username: String,
    #[validate(length(min = 1, message = "no password provided"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_counts_floor_at_zero() {
        let mut counters = UserCounters::default();
        UserCounter::NumComments.apply(&mut counters, -1);
        assert_eq!(counters.num.comments, 0);

        UserCounter::VotesComments.apply(&mut counters, -1);
        assert_eq!(counters.votes.comments, -1);
    }

    #[test]
    fn counter_paths_are_dotted() {
        assert_eq!(UserCounter::NumThreads.path(), "num.threads");
        assert_eq!(UserCounter::VotesComments.to_string(), "votes.comments");
    }

    #[test]
    fn serialized_user_hides_hashes() {
        let user = User::new(
            "alice".into(),
            Role::User,
            "$2b$hash".into(),
            Some("$2b$mail".into()),
        );
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("email_hash").is_none());
        assert_eq!(json["role"], "user");
        assert_eq!(json["counters"]["votes"]["threads"], 0);
    }
}
