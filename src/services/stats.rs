//! Dashboard statistics service

use crate::{error::AppResult, repository::Repository};

/// The four dashboard counters
#[derive(Debug, Clone, Copy)]
pub struct DashboardCounts {
    pub loaned_books: i64,
    pub overdue_loans: i64,
    pub total_members: i64,
    pub total_books: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Gather the dashboard counters
    ///
    /// Four independent reads; a check-in committing between them is fine,
    /// the dashboard tolerates snapshot staleness within one request.
    pub async fn dashboard(&self) -> AppResult<DashboardCounts> {
        Ok(DashboardCounts {
            loaned_books: self.repository.books.count_loaned().await?,
            overdue_loans: self.repository.loans.count_overdue().await?,
            total_members: self.repository.members.count().await?,
            total_books: self.repository.books.count().await?,
        })
    }
}
