//! Member registry service

use chrono::Utc;
use validator::Validate;

use crate::{
    circulation,
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, UpdateMember},
    repository::Repository,
};

/// Attempts at allocating a fresh membership number before giving up
const MEMBERSHIP_NUMBER_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Register a new member
    ///
    /// The registration date and membership number are assigned here. The
    /// generator cannot see already-issued numbers, so the insert leans on
    /// the unique index and retries with a fresh number on collision.
    pub async fn create(&self, member: CreateMember) -> AppResult<Member> {
        member.validate()?;

        let registered_at = Utc::now();
        let mut last_err = None;

        for _ in 0..MEMBERSHIP_NUMBER_ATTEMPTS {
            let number = circulation::generate_membership_number();
            if self
                .repository
                .members
                .membership_number_exists(&number)
                .await?
            {
                continue;
            }

            match self
                .repository
                .members
                .create(&member, &number, registered_at)
                .await
            {
                Ok(member) => return Ok(member),
                Err(AppError::Conflict(msg)) => last_err = Some(AppError::Conflict(msg)),
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            AppError::Conflict("Could not allocate a unique membership number".to_string())
        }))
    }

    /// Update a member's contact fields
    pub async fn update(&self, id: i32, member: UpdateMember) -> AppResult<Member> {
        member.validate()?;
        self.repository.members.update(id, &member).await
    }

    /// Delete a member
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.members.delete(id).await
    }
}
