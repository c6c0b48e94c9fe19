//! Business logic services

pub mod auth;
pub mod books;
pub mod fines;
pub mod loans;
pub mod members;
pub mod stats;

use std::sync::Arc;

use crate::{
    circulation::DailyRatePolicy,
    config::{AuthConfig, FinesConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub fines: fines::FinesService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, fines_config: FinesConfig) -> Self {
        let fee_policy = Arc::new(DailyRatePolicy {
            daily_rate: fines_config.daily_rate,
        });

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), fee_policy),
            fines: fines::FinesService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }
}
