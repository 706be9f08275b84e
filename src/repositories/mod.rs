pub mod comment_repository;
pub mod thread_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

use std::{collections::HashMap, sync::Arc};

pub use comment_repository::{CommentRepository, PgCommentRepository};
pub use thread_repository::{PgThreadRepository, ThreadRepository};
pub use user_repository::{PgUserRepository, UserRepository};

use crate::error::{AppError, Result};

/// Maps each category name to the repository holding its threads. Built once at
/// startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct CategoryRegistry {
    repositories: HashMap<String, Arc<dyn ThreadRepository>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, repository: Arc<dyn ThreadRepository>) {
        self.repositories
            .insert(repository.category().to_string(), repository);
    }

    pub fn get(&self, category: &str) -> Result<Arc<dyn ThreadRepository>> {
        self.repositories
            .get(category)
            .cloned()
            .ok_or_else(|| AppError::NotFound("thread category not found".to_string()))
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.repositories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
