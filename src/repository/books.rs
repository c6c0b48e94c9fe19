//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookRow, CreateBook, UpdateBook},
};

const BOOK_COLUMNS: &str =
    r#""LibroId" AS id, "Titulo" AS title, "Autor" AS author, "ISBN" AS isbn, "Estado" AS estado"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"SELECT {} FROM "Libros" WHERE "LibroId" = $1"#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"SELECT {} FROM "Libros" ORDER BY "Titulo""#,
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Create a new book, always starting as available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO "Libros" ("Titulo", "Autor", "ISBN", "Estado")
            VALUES ($1, $2, $3, 0)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a book's descriptive fields
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE "Libros" SET "Titulo" = $2, "Autor" = $3, "ISBN" = $4
            WHERE "LibroId" = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_open_loan: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM "Prestamos"
                WHERE "LibroId" = $1 AND "FechaDevolucionReal" IS NULL
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_open_loan {
            return Err(AppError::Conflict(
                "Book has an open loan and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query(r#"DELETE FROM "Libros" WHERE "LibroId" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if super::is_foreign_key_violation(&e) {
                    AppError::Conflict("Book has loan history and cannot be deleted".to_string())
                } else {
                    e.into()
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Libros""#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books currently loaned out
    pub async fn count_loaned(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Libros" WHERE "Estado" = 1"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
