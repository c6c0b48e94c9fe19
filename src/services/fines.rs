//! Fine management service

use crate::{circulation, error::AppResult, models::fine::Fine, repository::Repository};

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all fines
    pub async fn list(&self) -> AppResult<Vec<Fine>> {
        self.repository.fines.list().await
    }

    /// List fines for a member
    pub async fn list_by_member(&self, member_id: i32) -> AppResult<Vec<Fine>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.fines.list_by_member(member_id).await
    }

    /// Pay a fine
    ///
    /// The guard runs twice: here on a fresh snapshot for an early
    /// rejection, and again inside the repository's conditional UPDATE so
    /// a second payment loses even under a race.
    pub async fn pay(&self, id: i32) -> AppResult<Fine> {
        let fine = self.repository.fines.get_by_id(id).await?;
        circulation::pay_fine(&fine)?;
        self.repository.fines.pay(id).await
    }
}
