use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

use crate::{
    database::with_deadline,
    error::{AppError, Result},
    models::{Thread, ThreadCounter},
};

/// Storage for the threads of one category.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    fn category(&self) -> &str;

    async fn create(&self, thread: &Thread) -> Result<()>;
    async fn get(&self, slug_id: &str) -> Result<Option<Thread>>;
    async fn list(&self, from: i64, size: i64) -> Result<Vec<Thread>>;
    /// Fails with `NotFound` unless exactly one thread was removed.
    async fn delete(&self, slug_id: &str) -> Result<()>;
    /// Adds `delta` to one embedded counter. Fails with `NotFound` when no thread matched.
    async fn inc_counter(&self, slug_id: &str, field: ThreadCounter, delta: i64) -> Result<()>;
}

pub struct PgThreadRepository {
    db: PgPool,
    category: String,
    table: String,
    timeout: Duration,
}

impl PgThreadRepository {
    /// `category` must already satisfy `config::is_valid_category`.
    pub fn new(db: PgPool, category: &str, timeout: Duration) -> Self {
        Self {
            db,
            category: category.to_string(),
            table: format!("threads_{}", category),
            timeout,
        }
    }

    pub async fn ensure_table(&self) -> Result<()> {
        let create = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                username TEXT NOT NULL,
                slug_id TEXT NOT NULL UNIQUE,
                slug_title TEXT NOT NULL,
                category TEXT NOT NULL,
                title TEXT NOT NULL,
                url TEXT,
                content TEXT NOT NULL,
                votes BIGINT NOT NULL DEFAULT 0,
                comments BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ
            )
            "#,
            table = self.table
        );
        let index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table} (created_at DESC)",
            table = self.table
        );

        with_deadline(self.timeout, "create thread table", async {
            sqlx::query(&create).execute(&self.db).await?;
            sqlx::query(&index).execute(&self.db).await?;
            Ok::<_, sqlx::Error>(())
        })
        .await
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    fn category(&self) -> &str {
        &self.category
    }

    async fn create(&self, thread: &Thread) -> Result<()> {
        let query = format!(
            r#"
            INSERT INTO {} (
                id, user_id, username, slug_id, slug_title, category, title, url,
                content, votes, comments, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
            self.table
        );

        with_deadline(self.timeout, "insert thread", async {
            sqlx::query(&query)
                .bind(thread.id)
                .bind(thread.user_id)
                .bind(&thread.username)
                .bind(&thread.slug_id)
                .bind(&thread.slug_title)
                .bind(&thread.category)
                .bind(&thread.title)
                .bind(&thread.url)
                .bind(&thread.content)
                .bind(thread.counters.votes)
                .bind(thread.counters.comments)
                .bind(thread.created)
                .bind(thread.updated)
                .execute(&self.db)
                .await
        })
        .await?;

        Ok(())
    }

    async fn get(&self, slug_id: &str) -> Result<Option<Thread>> {
        let query = format!("SELECT * FROM {} WHERE slug_id = $1", self.table);

        with_deadline(self.timeout, "get thread", async {
            sqlx::query_as::<_, Thread>(&query)
                .bind(slug_id)
                .fetch_optional(&self.db)
                .await
        })
        .await
    }

    async fn list(&self, from: i64, size: i64) -> Result<Vec<Thread>> {
        let query = format!(
            "SELECT * FROM {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            self.table
        );

        with_deadline(self.timeout, "list threads", async {
            sqlx::query_as::<_, Thread>(&query)
                .bind(size)
                .bind(from)
                .fetch_all(&self.db)
                .await
        })
        .await
    }

    async fn delete(&self, slug_id: &str) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE slug_id = $1", self.table);

        let result = with_deadline(self.timeout, "delete thread", async {
            sqlx::query(&query).bind(slug_id).execute(&self.db).await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("thread not found".to_string()));
        }

        Ok(())
    }

    async fn inc_counter(&self, slug_id: &str, field: ThreadCounter, delta: i64) -> Result<()> {
        let column = field.column();
        let expr = match field {
            ThreadCounter::Votes => format!("{column} + $1"),
            ThreadCounter::Comments => format!("GREATEST({column} + $1, 0)"),
        };
        let query = format!(
            "UPDATE {} SET {column} = {expr} WHERE slug_id = $2",
            self.table
        );

        let result = with_deadline(self.timeout, "increment thread counter", async {
            sqlx::query(&query)
                .bind(delta)
                .bind(slug_id)
                .execute(&self.db)
                .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("thread not found".to_string()));
        }

        Ok(())
    }
}
