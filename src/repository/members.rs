//! Members repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, UpdateMember},
};

const MEMBER_COLUMNS: &str = r#""SocioId" AS id, "NumeroSocio" AS membership_number,
    "Nombre" AS first_name, "Apellido" AS last_name, "DNI" AS national_id,
    "Email" AS email, "Telefono" AS phone, "Direccion" AS address,
    "FechaDeAlta" AS registered_at"#;

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(&format!(
            r#"SELECT {} FROM "Socios" WHERE "SocioId" = $1"#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            r#"SELECT {} FROM "Socios" ORDER BY "Apellido", "Nombre""#,
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Check if a membership number is already issued
    pub async fn membership_number_exists(&self, number: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM "Socios" WHERE "NumeroSocio" = $1)"#,
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new member with a server-assigned membership number
    ///
    /// The unique index on `"NumeroSocio"` is the authoritative collision
    /// check; a violation surfaces as `Conflict` so the caller can retry
    /// with a fresh number.
    pub async fn create(
        &self,
        member: &CreateMember,
        membership_number: &str,
        registered_at: DateTime<Utc>,
    ) -> AppResult<Member> {
        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO "Socios"
                ("NumeroSocio", "Nombre", "Apellido", "DNI", "Email", "Telefono", "Direccion", "FechaDeAlta")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(membership_number)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.national_id)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(registered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Conflict("Membership number already issued".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(member)
    }

    /// Update a member's contact fields (membership number is immutable)
    pub async fn update(&self, id: i32, member: &UpdateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE "Socios"
            SET "Nombre" = $2, "Apellido" = $3, "DNI" = $4, "Email" = $5,
                "Telefono" = $6, "Direccion" = $7
            WHERE "SocioId" = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.national_id)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Delete a member
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_open_loans: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM "Prestamos"
                WHERE "SocioId" = $1 AND "FechaDevolucionReal" IS NULL
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_open_loans {
            return Err(AppError::Conflict(
                "Member has open loans and cannot be deleted".to_string(),
            ));
        }

        let has_unpaid_fines: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM "Multas" WHERE "SocioId" = $1 AND "Estado" = 0)"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_unpaid_fines {
            return Err(AppError::Conflict(
                "Member has unpaid fines and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query(r#"DELETE FROM "Socios" WHERE "SocioId" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if super::is_foreign_key_violation(&e) {
                    AppError::Conflict(
                        "Member has loan or fine history and cannot be deleted".to_string(),
                    )
                } else {
                    e.into()
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        Ok(())
    }

    /// Count all members
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Socios""#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
