//! Fines repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::fine::{Fine, FineRow},
};

const FINE_COLUMNS: &str = r#""MultaId" AS id, "SocioId" AS member_id, "Motivo" AS reason,
    "Monto" AS amount, "FechaCreacion" AS created_at, "Estado" AS estado"#;

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get fine by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Fine> {
        let row = sqlx::query_as::<_, FineRow>(&format!(
            r#"SELECT {} FROM "Multas" WHERE "MultaId" = $1"#,
            FINE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))?;

        Ok(row.into())
    }

    /// List all fines, newest first
    pub async fn list(&self) -> AppResult<Vec<Fine>> {
        let rows = sqlx::query_as::<_, FineRow>(&format!(
            r#"SELECT {} FROM "Multas" ORDER BY "FechaCreacion" DESC"#,
            FINE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Fine::from).collect())
    }

    /// List fines for a member, newest first
    pub async fn list_by_member(&self, member_id: i32) -> AppResult<Vec<Fine>> {
        let rows = sqlx::query_as::<_, FineRow>(&format!(
            r#"SELECT {} FROM "Multas" WHERE "SocioId" = $1 ORDER BY "FechaCreacion" DESC"#,
            FINE_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Fine::from).collect())
    }

    /// Mark a fine as paid
    ///
    /// Conditional UPDATE so two racing payments cannot both succeed; the
    /// loser sees the transition error.
    pub async fn pay(&self, id: i32) -> AppResult<Fine> {
        let row = sqlx::query_as::<_, FineRow>(&format!(
            r#"
            UPDATE "Multas" SET "Estado" = 1
            WHERE "MultaId" = $1 AND "Estado" = 0
            RETURNING {}
            "#,
            FINE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let exists: bool = sqlx::query_scalar(
                    r#"SELECT EXISTS(SELECT 1 FROM "Multas" WHERE "MultaId" = $1)"#,
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

                Err(if exists {
                    AppError::InvalidState(format!("Fine {} is already paid", id))
                } else {
                    AppError::NotFound(format!("Fine with id {} not found", id))
                })
            }
        }
    }
}
