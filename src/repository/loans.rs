//! Loans repository for database operations
//!
//! Check-out and check-in are each one transaction whose first statement
//! is a conditional UPDATE on the guarded state column. Zero rows affected
//! means another writer already moved the state; the transaction aborts
//! and the caller gets the transition error instead of a silent overwrite.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    circulation::{self, FineDraft, LoanDraft},
    error::{AppError, AppResult},
    models::{
        fine::{Fine, FineRow},
        loan::{Loan, LoanDetails},
    },
};

const LOAN_COLUMNS: &str = r#""PrestamoId" AS id, "SocioId" AS member_id, "LibroId" AS book_id,
    "FechaPrestamo" AS loan_date, "FechaDevolucionPrevista" AS due_date,
    "FechaDevolucionReal" AS returned_date"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!(
            r#"SELECT {} FROM "Prestamos" WHERE "PrestamoId" = $1"#,
            LOAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Persist an accepted check-out
    ///
    /// Flips the book to loaned and inserts the loan in one transaction.
    /// The conditional UPDATE is the concurrency guard: of two racing
    /// check-outs exactly one sees a row change.
    pub async fn check_out(&self, draft: &LoanDraft) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE "Libros" SET "Estado" = 1 WHERE "LibroId" = $1 AND "Estado" = 0"#,
        )
        .bind(draft.book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM "Libros" WHERE "LibroId" = $1)"#)
                    .bind(draft.book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::InvalidState(format!("Book {} is not available", draft.book_id))
            } else {
                AppError::NotFound(format!("Book with id {} not found", draft.book_id))
            });
        }

        let loan = sqlx::query_as::<_, Loan>(&format!(
            r#"
            INSERT INTO "Prestamos"
                ("SocioId", "LibroId", "FechaPrestamo", "FechaDevolucionPrevista", "FechaDevolucionReal")
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(draft.member_id)
        .bind(draft.book_id)
        .bind(draft.loan_date)
        .bind(draft.due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // Backstop: the partial unique index on open loans
            if super::is_unique_violation(&e) {
                AppError::InvalidState(format!("Book {} is not available", draft.book_id))
            // The book row was just updated inside this transaction, so a
            // foreign key failure here can only be the member vanishing
            // between the service's existence check and the insert.
            } else if super::is_foreign_key_violation(&e) {
                AppError::NotFound(format!("Member with id {} not found", draft.member_id))
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Persist an accepted check-in
    ///
    /// Closes the loan, returns the book to available and, when the return
    /// was late, records the overdue fine, all in one transaction. Returns
    /// the fine if one was created.
    pub async fn check_in(
        &self,
        loan: &Loan,
        returned_at: chrono::DateTime<Utc>,
        fine: Option<&FineDraft>,
    ) -> AppResult<Option<Fine>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE "Prestamos" SET "FechaDevolucionReal" = $2
            WHERE "PrestamoId" = $1 AND "FechaDevolucionReal" IS NULL
            "#,
        )
        .bind(loan.id)
        .bind(returned_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::InvalidState(format!(
                "Loan {} is already closed",
                loan.id
            )));
        }

        sqlx::query(r#"UPDATE "Libros" SET "Estado" = 0 WHERE "LibroId" = $1"#)
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        let created_fine = if let Some(fine) = fine {
            let row = sqlx::query_as::<_, FineRow>(
                r#"
                INSERT INTO "Multas" ("SocioId", "Motivo", "Monto", "FechaCreacion", "Estado")
                VALUES ($1, $2, $3, $4, 0)
                RETURNING "MultaId" AS id, "SocioId" AS member_id, "Motivo" AS reason,
                          "Monto" AS amount, "FechaCreacion" AS created_at, "Estado" AS estado
                "#,
            )
            .bind(fine.member_id)
            .bind(&fine.reason)
            .bind(fine.amount)
            .bind(fine.created_at)
            .fetch_one(&mut *tx)
            .await?;
            Some(row.into())
        } else {
            None
        };

        tx.commit().await?;

        Ok(created_fine)
    }

    /// Get loans for a member, newest first
    pub async fn get_member_loans(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            r#"
            SELECT {} FROM "Prestamos"
            WHERE "SocioId" = $1
            ORDER BY "FechaPrestamo" DESC
            "#,
            LOAN_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_details(loans).await
    }

    /// List all open loans past their due date
    pub async fn list_overdue(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            r#"
            SELECT {} FROM "Prestamos"
            WHERE "FechaDevolucionReal" IS NULL AND "FechaDevolucionPrevista" < NOW()
            ORDER BY "FechaDevolucionPrevista"
            "#,
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_details(loans).await
    }

    /// Count open loans past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM "Prestamos"
            WHERE "FechaDevolucionReal" IS NULL AND "FechaDevolucionPrevista" < NOW()
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Attach book titles and the overdue flag to raw loans
    async fn with_details(&self, loans: Vec<Loan>) -> AppResult<Vec<LoanDetails>> {
        let now = Utc::now();
        let mut result = Vec::with_capacity(loans.len());

        for loan in loans {
            let book_title: String =
                sqlx::query_scalar(r#"SELECT "Titulo" FROM "Libros" WHERE "LibroId" = $1"#)
                    .bind(loan.book_id)
                    .fetch_one(&self.pool)
                    .await?;

            let is_overdue = circulation::is_overdue(&loan, now);
            result.push(LoanDetails {
                id: loan.id,
                member_id: loan.member_id,
                book_id: loan.book_id,
                book_title,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                returned_date: loan.returned_date,
                is_overdue,
            });
        }

        Ok(result)
    }
}
