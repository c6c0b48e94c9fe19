//! Admins repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::admin::Admin,
};

#[derive(Clone)]
pub struct AdminsRepository {
    pool: Pool<Postgres>,
}

impl AdminsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get admin by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(
            r#"
            SELECT "AdminId" AS id, "Username" AS username, "PasswordHash" AS password_hash
            FROM "Admins" WHERE "AdminId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Admin with id {} not found", id)))
    }

    /// Get admin by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT "AdminId" AS id, "Username" AS username, "PasswordHash" AS password_hash
            FROM "Admins" WHERE LOWER("Username") = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Count admin accounts
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Admins""#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create an admin account
    pub async fn create(&self, username: &str, password_hash: &str) -> AppResult<Admin> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO "Admins" ("Username", "PasswordHash")
            VALUES ($1, $2)
            RETURNING "AdminId" AS id, "Username" AS username, "PasswordHash" AS password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Conflict("Username already exists".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(admin)
    }
}
