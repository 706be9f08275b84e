use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    database::with_deadline,
    error::{AppError, Result},
    models::Comment,
};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<()>;
    async fn get(&self, slug_id: &str) -> Result<Option<Comment>>;
    async fn list_by_thread(&self, thread_id: Uuid, from: i64, size: i64) -> Result<Vec<Comment>>;
    async fn list_by_username(&self, username: &str, from: i64, size: i64) -> Result<Vec<Comment>>;
    async fn delete(&self, slug_id: &str) -> Result<()>;
    async fn inc_votes(&self, slug_id: &str, delta: i64) -> Result<()>;
}

pub struct PgCommentRepository {
    db: PgPool,
    timeout: Duration,
}

impl PgCommentRepository {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<()> {
        with_deadline(self.timeout, "insert comment", async {
            sqlx::query(
                r#"
                INSERT INTO comments (
                    id, thread_id, slug_id, user_id, username, content, votes,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(comment.id)
            .bind(comment.thread_id)
            .bind(&comment.slug_id)
            .bind(comment.user_id)
            .bind(&comment.username)
            .bind(&comment.content)
            .bind(comment.votes)
            .bind(comment.created)
            .bind(comment.updated)
            .execute(&self.db)
            .await
        })
        .await?;

        Ok(())
    }

    async fn get(&self, slug_id: &str) -> Result<Option<Comment>> {
        with_deadline(self.timeout, "get comment", async {
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE slug_id = $1")
                .bind(slug_id)
                .fetch_optional(&self.db)
                .await
        })
        .await
    }

    async fn list_by_thread(&self, thread_id: Uuid, from: i64, size: i64) -> Result<Vec<Comment>> {
        with_deadline(self.timeout, "list thread comments", async {
            sqlx::query_as::<_, Comment>(
                r#"
                SELECT * FROM comments
                WHERE thread_id = $1
                ORDER BY created_at ASC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(thread_id)
            .bind(size)
            .bind(from)
            .fetch_all(&self.db)
            .await
        })
        .await
    }

    async fn list_by_username(&self, username: &str, from: i64, size: i64) -> Result<Vec<Comment>> {
        with_deadline(self.timeout, "list user comments", async {
            sqlx::query_as::<_, Comment>(
                r#"
                SELECT * FROM comments
                WHERE username = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(username)
            .bind(size)
            .bind(from)
            .fetch_all(&self.db)
            .await
        })
        .await
    }

    async fn delete(&self, slug_id: &str) -> Result<()> {
        let result = with_deadline(self.timeout, "delete comment", async {
            sqlx::query("DELETE FROM comments WHERE slug_id = $1")
                .bind(slug_id)
                .execute(&self.db)
                .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        Ok(())
    }

    async fn inc_votes(&self, slug_id: &str, delta: i64) -> Result<()> {
        let result = with_deadline(self.timeout, "increment comment votes", async {
            sqlx::query("UPDATE comments SET votes = votes + $1 WHERE slug_id = $2")
                .bind(delta)
                .bind(slug_id)
                .execute(&self.db)
                .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("comment not found".to_string()));
        }

        Ok(())
    }
}
