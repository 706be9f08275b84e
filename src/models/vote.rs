use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

use crate::{
    error::{AppError, Result},
    models::UserCounter,
};

/// What a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    #[serde(rename = "threads", alias = "thread")]
    Thread,
    #[serde(rename = "comments", alias = "comment")]
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Thread => "threads",
            TargetType::Comment => "comments",
        }
    }

    /// The owner's aggregate that receives the same delta as the target.
    pub fn owner_counter(&self) -> UserCounter {
        match self {
            TargetType::Thread => UserCounter::VotesThreads,
            TargetType::Comment => UserCounter::VotesComments,
        }
    }
}

impl FromStr for TargetType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "threads" | "thread" => Ok(TargetType::Thread),
            "comments" | "comment" => Ok(TargetType::Comment),
            _ => Err(format!("type not found: {}", s)),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vote value in {-1, 0, +1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteValue(i8);

impl VoteValue {
    pub const DOWN: VoteValue = VoteValue(-1);
    pub const CLEAR: VoteValue = VoteValue(0);
    pub const UP: VoteValue = VoteValue(1);

    pub fn get(self) -> i8 {
        self.0
    }

    /// Counter delta applied by this vote. Always the raw value.
    pub fn delta(self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self> {
        if !(-1..=1).contains(&value) {
            return Err(AppError::Validation(
                "value cannot be lower than -1 or greater than 1".to_string(),
            ));
        }
        Ok(VoteValue(value as i8))
    }
}

// Vote request, every field optional so absence can be reported
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CastVoteRequest {
    pub slug_type: Option<String>,
    pub slug_id: Option<String>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub target_type: TargetType,
    pub slug_id: String,
    pub value: VoteValue,
}

impl CastVoteRequest {
    pub fn into_vote(self) -> Result<Vote> {
        let slug_type = self
            .slug_type
            .ok_or_else(|| AppError::Validation("no slug_type provided".to_string()))?;

        let slug_id = self
            .slug_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Validation("no slug_id provided".to_string()))?;

        let value = self
            .value
            .ok_or_else(|| AppError::Validation("no value provided".to_string()))?;
        let value = VoteValue::try_from(value)?;

        let target_type = slug_type.parse::<TargetType>().map_err(AppError::NotFound)?;

        Ok(Vote {
            target_type,
            slug_id,
            value,
        })
    }
}

/// The per-user record of the last value cast on each target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub threads: HashMap<String, i8>,
    pub comments: HashMap<String, i8>,
}

impl VoteRecord {
    pub fn get(&self, target_type: TargetType, slug_id: &str) -> Option<i8> {
        match target_type {
            TargetType::Thread => self.threads.get(slug_id).copied(),
            TargetType::Comment => self.comments.get(slug_id).copied(),
        }
    }

    pub fn set(&mut self, target_type: TargetType, slug_id: &str, value: VoteValue) {
        let map = match target_type {
            TargetType::Thread => &mut self.threads,
            TargetType::Comment => &mut self.comments,
        };
        map.insert(slug_id.to_string(), value.get());
    }

    pub fn len(&self) -> usize {
        self.threads.len() + self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
