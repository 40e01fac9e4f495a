//! User and password-reset-token data access

use crate::{
    error::AppError,
    models::user::{PasswordResetToken, User},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.db)
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok(count.0)
    }

    pub async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
        province: Option<&str>,
        district: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, province, district, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(province)
        .bind(district)
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// Full-row update used by user administration. The password hash only
    /// changes when a new one is supplied.
    pub async fn update(
        &self,
        id: Uuid,
        username: &str,
        role: &str,
        province: Option<&str>,
        district: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                username = $2,
                role = $3,
                province = $4,
                district = $5,
                email = $6,
                password_hash = COALESCE($7, password_hash)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(role)
        .bind(province)
        .bind(district)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>("UPDATE users SET active = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(active)
                .fetch_optional(&self.db)
                .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the user created any assets. Part of the delete footprint
    /// check; users with history are deactivated, never deleted.
    pub async fn has_created_assets(&self, id: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM assets WHERE created_by = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    // -- password reset tokens --

    pub async fn insert_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn find_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT * FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(token)
    }

    pub async fn mark_reset_token_used(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
