//! In-memory repositories for tests.
//!
//! Each repository keeps its documents behind a `RwLock` and applies every mutation
//! to a single entry under the write lock, so per-document updates are atomic the
//! same way the Postgres rows are. Any operation can be made to fail with
//! `fail_on("operation")` to exercise partial-failure paths.

use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::RwLock,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, Role, Thread, ThreadCounter, User, UserCounter, Vote},
    repositories::{CommentRepository, ThreadRepository, UserRepository},
};

#[derive(Default)]
struct Failures(RwLock<HashSet<&'static str>>);

impl Failures {
    fn add(&self, operation: &'static str) {
        self.0.write().unwrap().insert(operation);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.0.read().unwrap().contains(operation) {
            return Err(AppError::Internal(format!("injected failure: {}", operation)));
        }
        Ok(())
    }
}

fn page<T: Clone>(items: impl Iterator<Item = T>, from: i64, size: i64) -> Vec<T> {
    items
        .skip(from.max(0) as usize)
        .take(size.max(0) as usize)
        .collect()
}

pub struct MemoryThreadRepository {
    category: String,
    threads: RwLock<Vec<Thread>>,
    failures: Failures,
}

impl MemoryThreadRepository {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            threads: RwLock::new(Vec::new()),
            failures: Failures::default(),
        }
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.failures.add(operation);
    }

    pub fn thread(&self, slug_id: &str) -> Option<Thread> {
        self.threads
            .read()
            .unwrap()
            .iter()
            .find(|t| t.slug_id == slug_id)
            .cloned()
    }
}

#[async_trait]
impl ThreadRepository for MemoryThreadRepository {
    fn category(&self) -> &str {
        &self.category
    }

    async fn create(&self, thread: &Thread) -> Result<()> {
        self.failures.check("create")?;
        self.threads.write().unwrap().push(thread.clone());
        Ok(())
    }

    async fn get(&self, slug_id: &str) -> Result<Option<Thread>> {
        self.failures.check("get")?;
        Ok(self.thread(slug_id))
    }

    async fn list(&self, from: i64, size: i64) -> Result<Vec<Thread>> {
        self.failures.check("list")?;
        let threads = self.threads.read().unwrap();
        Ok(page(threads.iter().rev().cloned(), from, size))
    }

    async fn delete(&self, slug_id: &str) -> Result<()> {
        self.failures.check("delete")?;
        let mut threads = self.threads.write().unwrap();
        let before = threads.len();
        threads.retain(|t| t.slug_id != slug_id);
        if threads.len() + 1 != before {
            return Err(AppError::NotFound("thread not found".to_string()));
        }
        Ok(())
    }

    async fn inc_counter(&self, slug_id: &str, field: ThreadCounter, delta: i64) -> Result<()> {
        self.failures.check("inc_counter")?;
        let mut threads = self.threads.write().unwrap();
        let thread = threads
            .iter_mut()
            .find(|t| t.slug_id == slug_id)
            .ok_or_else(|| AppError::NotFound("thread not found".to_string()))?;
        field.apply(&mut thread.counters, delta);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: RwLock<Vec<Comment>>,
    failures: Failures,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.failures.add(operation);
    }

    pub fn comment(&self, slug_id: &str) -> Option<Comment> {
        self.comments
            .read()
            .unwrap()
            .iter()
            .find(|c| c.slug_id == slug_id)
            .cloned()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<()> {
        self.failures.check("create")?;
        self.comments.write().unwrap().push(comment.clone());
        Ok(())
    }

    async fn get(&self, slug_id: &str) -> Result<Option<Comment>> {
        self.failures.check("get")?;
        Ok(self.comment(slug_id))
    }

    async fn list_by_thread(&self, thread_id: Uuid, from: i64, size: i64) -> Result<Vec<Comment>> {
        self.failures.check("list_by_thread")?;
        let comments = self.comments.read().unwrap();
        Ok(page(
            comments.iter().filter(|c| c.thread_id == thread_id).cloned(),
            from,
            size,
        ))
    }

    async fn list_by_username(&self, username: &str, from: i64, size: i64) -> Result<Vec<Comment>> {
        self.failures.check("list_by_username")?;
        let comments = self.comments.read().unwrap();
        Ok(page(
            comments.iter().rev().filter(|c| c.username == username).cloned(),
            from,
            size,
        ))
    }

    async fn delete(&self, slug_id: &str) -> Result<()> {
        self.failures.check("delete")?;
        let mut comments = self.comments.write().unwrap();
        let before = comments.len();
        comments.retain(|c| c.slug_id != slug_id);
        if comments.len() + 1 != before {
            return Err(AppError::NotFound("comment not found".to_string()));
        }
        Ok(())
    }

    async fn inc_votes(&self, slug_id: &str, delta: i64) -> Result<()> {
        self.failures.check("inc_votes")?;
        let mut comments = self.comments.write().unwrap();
        let comment = comments
            .iter_mut()
            .find(|c| c.slug_id == slug_id)
            .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;
        comment.votes += delta;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
    failures: Failures,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.failures.add(operation);
    }

    pub fn user(&self, username: &str) -> Option<User> {
        self.users.read().unwrap().get(username).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn ping(&self) -> Result<()> {
        self.failures.check("ping")
    }

    async fn create(&self, user: &User) -> Result<()> {
        self.failures.check("create")?;
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.username) {
            return Err(AppError::Conflict("user already exists".to_string()));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn search(
        &self,
        username: Option<&str>,
        role: Role,
        from: i64,
        size: i64,
    ) -> Result<Vec<User>> {
        self.failures.check("search")?;
        let users = self.users.read().unwrap();
        let mut matching: Vec<User> = users
            .values()
            .filter(|u| u.role == role)
            .filter(|u| username.is_none_or(|name| u.username == name))
            .cloned()
            .collect();
        matching.sort_by_key(|u| u.created);
        Ok(page(matching.into_iter(), from, size))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.failures.check("get_by_id")?;
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.id == id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.failures.check("get_by_username")?;
        Ok(self.user(username))
    }

    async fn deactivate(&self, username: &str, role: Role) -> Result<()> {
        self.failures.check("deactivate")?;
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(username)
            .filter(|u| u.role == role)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        let now = chrono::Utc::now();
        user.deactivated = Some(now);
        user.updated = Some(now);
        Ok(())
    }

    async fn delete(&self, username: &str, role: Role) -> Result<()> {
        self.failures.check("delete")?;
        let mut users = self.users.write().unwrap();
        match users.get(username) {
            Some(user) if user.role == role => {
                users.remove(username);
                Ok(())
            }
            _ => Err(AppError::NotFound("user not found".to_string())),
        }
    }

    async fn inc_counter(&self, username: &str, field: UserCounter, delta: i64) -> Result<()> {
        self.failures.check("inc_counter")?;
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(username)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        field.apply(&mut user.counters, delta);
        Ok(())
    }

    async fn upsert_vote(&self, username: &str, vote: &Vote) -> Result<()> {
        self.failures.check("upsert_vote")?;
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(username)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        user.votes.set(vote.target_type, &vote.slug_id, vote.value);
        Ok(())
    }
}
