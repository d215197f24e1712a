use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use estate_common::models::auth::User;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. Returns `None` when the email is already registered.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO app_user (user_id, email, password_hash) VALUES ($1, $2, $3)
               ON CONFLICT (email) DO NOTHING
               RETURNING user_id, email, password_hash, created_at"#,
        )
        .bind(user_id)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(pool)
        .await
        .context("Failed to create user")?;
        Ok(row)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, email, password_hash, created_at FROM app_user WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;
        Ok(row)
    }
}
