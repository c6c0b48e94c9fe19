//! Authentication service for librarian accounts

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::admin::{Admin, AdminClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a librarian and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = self
            .repository
            .admins
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&admin, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token(&admin)?;
        Ok((token, admin))
    }

    /// Create JWT token for an admin
    fn create_token(&self, admin: &Admin) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = AdminClaims {
            sub: admin.username.clone(),
            admin_id: admin.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify an admin password
    fn verify_password(&self, admin: &Admin, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&admin.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get admin by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Admin> {
        self.repository.admins.get_by_id(id).await
    }

    /// Create the bootstrap account when no admin exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.admins.count().await? > 0 {
            return Ok(());
        }

        let hash = self.hash_password(&self.config.bootstrap_password)?;
        self.repository
            .admins
            .create(&self.config.bootstrap_username, &hash)
            .await?;

        tracing::info!(
            "Created bootstrap admin account '{}'",
            self.config.bootstrap_username
        );
        Ok(())
    }
}
