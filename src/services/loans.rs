//! Loan circulation service
//!
//! Applies the circulation model's transition guards to fresh snapshots,
//! then hands the accepted transition to the repository, which re-checks
//! the guard atomically on write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    circulation::{self, FeePolicy},
    error::AppResult,
    models::{
        fine::Fine,
        loan::{Loan, LoanDetails},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    fee_policy: Arc<dyn FeePolicy>,
}

impl LoansService {
    pub fn new(repository: Repository, fee_policy: Arc<dyn FeePolicy>) -> Self {
        Self {
            repository,
            fee_policy,
        }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Check a book out to a member
    pub async fn check_out(
        &self,
        member_id: i32,
        book_id: i32,
        due_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        // Verify the member exists before touching the book state
        self.repository.members.get_by_id(member_id).await?;
        let book = self.repository.books.get_by_id(book_id).await?;

        let draft = circulation::check_out(&book, member_id, due_date, Utc::now())?;
        self.repository.loans.check_out(&draft).await
    }

    /// Check a loan back in, fining the member when it closes late
    pub async fn check_in(&self, loan_id: i32) -> AppResult<(Loan, Option<Fine>)> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        let outcome = circulation::check_in(&loan, Utc::now(), self.fee_policy.as_ref())?;
        let fine = self
            .repository
            .loans
            .check_in(&loan, outcome.returned_at, outcome.fine.as_ref())
            .await?;

        let closed = Loan {
            returned_date: Some(outcome.returned_at),
            ..loan
        };
        Ok((closed, fine))
    }

    /// Get loans for a member
    pub async fn get_member_loans(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.loans.get_member_loans(member_id).await
    }

    /// List all overdue loans
    pub async fn list_overdue(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_overdue().await
    }
}
