//! Account registration and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account with the default `user` role
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref domain) = self.config.allowed_email_domain {
            if !request.email.ends_with(&format!("@{}", domain)) {
                return Err(AppError::Validation(format!(
                    "Registration requires a @{} email address",
                    domain
                )));
            }
        }

        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.username, &request.email, &hash, Role::User)
            .await
    }

    /// Authenticate by email and password, returning a JWT and the account.
    ///
    /// Unknown email and wrong password produce the same message.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user.password, password) {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            email: user.email.clone(),
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
