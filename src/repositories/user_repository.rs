use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    database::{self, with_deadline},
    error::{AppError, Result},
    models::{Role, TargetType, User, UserCounter, UserRow, Vote, VoteRecord},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Round-trips to the backing store.
    async fn ping(&self) -> Result<()>;
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: &User) -> Result<()>;
    async fn search(
        &self,
        username: Option<&str>,
        role: Role,
        from: i64,
        size: i64,
    ) -> Result<Vec<User>>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn deactivate(&self, username: &str, role: Role) -> Result<()>;
    /// Removes the user together with every vote record it holds.
    async fn delete(&self, username: &str, role: Role) -> Result<()>;
    async fn inc_counter(&self, username: &str, field: UserCounter, delta: i64) -> Result<()>;
    /// Overwrites the record for `(username, target)` with `vote.value`.
    async fn upsert_vote(&self, username: &str, vote: &Vote) -> Result<()>;
}

pub struct PgUserRepository {
    db: PgPool,
    timeout: Duration,
}

impl PgUserRepository {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn load_votes(&self, username: &str) -> Result<VoteRecord> {
        let rows = with_deadline(self.timeout, "load vote records", async {
            sqlx::query("SELECT slug_type, slug_id, value FROM user_votes WHERE username = $1")
                .bind(username)
                .fetch_all(&self.db)
                .await
        })
        .await?;

        let mut record = VoteRecord::default();
        for row in rows {
            let slug_type: String = row.get("slug_type");
            let slug_id: String = row.get("slug_id");
            let value: i16 = row.get("value");

            let target_type = slug_type
                .parse::<TargetType>()
                .map_err(|e| AppError::Internal(format!("Invalid slug_type: {}", e)))?;
            let map = match target_type {
                TargetType::Thread => &mut record.threads,
                TargetType::Comment => &mut record.comments,
            };
            map.insert(slug_id, value as i8);
        }

        Ok(record)
    }

    async fn hydrate(&self, row: UserRow) -> Result<User> {
        let votes = self.load_votes(&row.username).await?;
        row.into_user(votes)
            .map_err(|e| AppError::Internal(format!("Invalid role: {}", e)))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn ping(&self) -> Result<()> {
        database::ping(&self.db, self.timeout).await
    }

    async fn create(&self, user: &User) -> Result<()> {
        let result = with_deadline(self.timeout, "insert user", async {
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, username, role, validated, password_hash, email_hash,
                    num_threads, num_comments, votes_threads, votes_comments,
                    created_at, updated_at, deactivated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(user.role.as_str())
            .bind(user.validated)
            .bind(&user.password_hash)
            .bind(&user.email_hash)
            .bind(user.counters.num.threads)
            .bind(user.counters.num.comments)
            .bind(user.counters.votes.threads)
            .bind(user.counters.votes.comments)
            .bind(user.created)
            .bind(user.updated)
            .bind(user.deactivated)
            .execute(&self.db)
            .await
        })
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                Err(AppError::Conflict("user already exists".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn search(
        &self,
        username: Option<&str>,
        role: Role,
        from: i64,
        size: i64,
    ) -> Result<Vec<User>> {
        let rows = with_deadline(self.timeout, "search users", async {
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT * FROM users
                WHERE role = $1 AND ($2::TEXT IS NULL OR username = $2)
                ORDER BY created_at ASC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(role.as_str())
            .bind(username)
            .bind(size)
            .bind(from)
            .fetch_all(&self.db)
            .await
        })
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.hydrate(row).await?);
        }

        Ok(users)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = with_deadline(self.timeout, "get user by id", async {
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await
        })
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = with_deadline(self.timeout, "get user by username", async {
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.db)
                .await
        })
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn deactivate(&self, username: &str, role: Role) -> Result<()> {
        let result = with_deadline(self.timeout, "deactivate user", async {
            sqlx::query(
                r#"
                UPDATE users
                SET deactivated_at = NOW(), updated_at = NOW()
                WHERE username = $1 AND role = $2
                "#,
            )
            .bind(username)
            .bind(role.as_str())
            .execute(&self.db)
            .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        Ok(())
    }

    async fn delete(&self, username: &str, role: Role) -> Result<()> {
        let result = with_deadline(self.timeout, "delete user", async {
            sqlx::query("DELETE FROM users WHERE username = $1 AND role = $2")
                .bind(username)
                .bind(role.as_str())
                .execute(&self.db)
                .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        Ok(())
    }

    async fn inc_counter(&self, username: &str, field: UserCounter, delta: i64) -> Result<()> {
        let column = field.column();
        let expr = if field.is_non_negative() {
            format!("GREATEST({column} + $1, 0)")
        } else {
            format!("{column} + $1")
        };
        let query = format!("UPDATE users SET {column} = {expr} WHERE username = $2");

        let result = with_deadline(self.timeout, "increment user counter", async {
            sqlx::query(&query)
                .bind(delta)
                .bind(username)
                .execute(&self.db)
                .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        Ok(())
    }

    async fn upsert_vote(&self, username: &str, vote: &Vote) -> Result<()> {
        let result = with_deadline(self.timeout, "upsert vote record", async {
            sqlx::query(
                r#"
                INSERT INTO user_votes (username, slug_type, slug_id, value)
                SELECT $1, $2, $3, $4
                WHERE EXISTS (SELECT 1 FROM users WHERE username = $1)
                ON CONFLICT (username, slug_type, slug_id)
                DO UPDATE SET value = EXCLUDED.value
                "#,
            )
            .bind(username)
            .bind(vote.target_type.as_str())
            .bind(&vote.slug_id)
            .bind(i16::from(vote.value.get()))
            .execute(&self.db)
            .await
        })
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        Ok(())
    }
}
