// ABOUTME: Authentication and session management: registration, login, tokens, account lifecycle
// ABOUTME: Classifies provider-style auth failures and keeps bcrypt work off the async executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! Auth session manager
//!
//! All handlers delegate here. Registration and login surface the classified
//! error kinds the client shows inline (wrong password, user not found,
//! invalid email, email already in use); verification and reset flows use
//! hashed single-use tokens with a TTL; the local [`SessionStore`] remembers
//! the last authenticated user so the initial route can be picked before any
//! network round trip.

mod session;

pub use session::{LocalSession, SessionStore};

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::storage::MediaStore;

/// Session token lifetime in hours
const TOKEN_TTL_HOURS: i64 = 24;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 8;

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier
    pub sub: String,
    /// Account email
    pub email: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Signs and validates session JWTs
#[derive(Clone)]
pub struct AuthManager {
    jwt_secret: String,
}

impl AuthManager {
    /// Create a manager around a signing secret
    #[must_use]
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Issue a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Validate a session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if the token is malformed, tampered, or expired
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::auth_invalid("Invalid or expired session token"))
    }
}

/// Outcome of a successful registration
#[derive(Debug)]
pub struct RegisterOutcome {
    /// The created account id
    pub user_id: Uuid,
    /// Raw verification token, to be delivered to the account email
    pub verification_token: String,
}

/// Outcome of a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    /// Signed session token
    pub token: String,
    /// The authenticated account
    pub user: User,
}

/// Authentication service for business logic
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: AuthManager,
    sessions: SessionStore,
}

impl AuthService {
    /// Create a new authentication service
    #[must_use]
    pub const fn new(db: Database, tokens: AuthManager, sessions: SessionStore) -> Self {
        Self {
            db,
            tokens,
            sessions,
        }
    }

    /// Register a new account
    ///
    /// Issues an email verification token as part of the flow; delivery is
    /// the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns a classified error for an invalid email, weak password, or an
    /// email that is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<RegisterOutcome> {
        info!("User registration attempt");

        if !Self::is_valid_email(email) {
            return Err(AppError::invalid_email("Email address is not valid"));
        }
        if !Self::is_valid_password(password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(AppError::email_in_use("Email is already registered"));
        }

        let password_hash = Self::hash_password(password.to_owned()).await?;
        let user = User::new(
            email.to_owned(),
            password_hash,
            display_name.map(ToOwned::to_owned),
        );
        let user_id = self.db.create_user(&user).await?;

        let verification_token = self.issue_verification_token(user_id).await?;

        info!(user_id = %user_id, "User registered");

        Ok(RegisterOutcome {
            user_id,
            verification_token,
        })
    }

    /// Authenticate with email and password
    ///
    /// On success the local session is updated and a signed token returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthUserNotFound` when no account exists for the email and
    /// `AuthWrongPassword` when the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        debug!("User login attempt");

        if !Self::is_valid_email(email) {
            return Err(AppError::invalid_email("Email address is not valid"));
        }

        let user = self.db.get_user_by_email_required(email).await?;

        if !Self::verify_password(password.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::wrong_password("Wrong password"));
        }

        self.db.update_last_active(user.id).await?;

        let token = self.tokens.generate_token(&user)?;

        self.sessions.save(&LocalSession {
            user_id: Some(user.id),
            email_verified: user.email_verified,
            onboarding_complete: user.onboarding_complete,
        })?;

        Ok(LoginOutcome { token, user })
    }

    /// Resolve the account behind a session token
    ///
    /// Returns `None` for a missing, invalid, or expired token: the caller
    /// treats that as signed-out, not as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the user lookup itself fails
    pub async fn current_user(&self, token: &str) -> AppResult<Option<User>> {
        let Ok(claims) = self.tokens.validate_token(token) else {
            return Ok(None);
        };
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::internal(format!("Invalid subject in token: {e}")))?;
        self.db.get_user(user_id).await
    }

    /// Issue a fresh email verification token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored
    pub async fn issue_verification_token(&self, user_id: Uuid) -> AppResult<String> {
        let raw = generate_raw_token();
        self.db
            .store_email_verification_token(user_id, &hash_token(&raw))
            .await?;
        Ok(raw)
    }

    /// Consume a verification token and mark the account email verified
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an invalid, expired, or reused token
    pub async fn verify_email(&self, raw_token: &str) -> AppResult<Uuid> {
        let user_id = self
            .db
            .consume_email_verification_token(&hash_token(raw_token))
            .await?;
        self.db.mark_email_verified(user_id).await?;

        // Keep the locally remembered flags in step when it's the same account
        let mut session = self.sessions.load()?;
        if session.user_id == Some(user_id) {
            session.email_verified = true;
            self.sessions.save(&session)?;
        }

        Ok(user_id)
    }

    /// Issue a password reset token for the account behind an email
    ///
    /// # Errors
    ///
    /// Returns `AuthUserNotFound` when no account exists for the email
    pub async fn request_password_reset(&self, email: &str) -> AppResult<String> {
        let user = self.db.get_user_by_email_required(email).await?;
        let raw = generate_raw_token();
        self.db
            .store_password_reset_token(user.id, &hash_token(&raw))
            .await?;
        Ok(raw)
    }

    /// Consume a reset token and set a new password
    ///
    /// Remaining unused reset tokens for the account are invalidated.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an invalid token and `InvalidInput`
    /// for a weak replacement password.
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> AppResult<Uuid> {
        if !Self::is_valid_password(new_password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user_id = self
            .db
            .consume_password_reset_token(&hash_token(raw_token))
            .await?;

        let password_hash = Self::hash_password(new_password.to_owned()).await?;
        self.db.update_password_hash(user_id, &password_hash).await?;
        self.db.invalidate_user_reset_tokens(user_id).await?;

        Ok(user_id)
    }

    /// Change the password of an authenticated account
    ///
    /// # Errors
    ///
    /// Returns `AuthWrongPassword` if the current password does not match
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if !Self::is_valid_password(new_password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found("Account no longer exists"))?;

        if !Self::verify_password(current.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::wrong_password("Wrong password"));
        }

        let password_hash = Self::hash_password(new_password.to_owned()).await?;
        self.db.update_password_hash(user_id, &password_hash).await?;
        self.db.invalidate_user_reset_tokens(user_id).await?;

        Ok(())
    }

    /// Replace the profile image
    ///
    /// The blob is stored before the user row is touched, so a failed upload
    /// leaves the previous image URI unchanged.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the upload fails; the account keeps its
    /// prior avatar in that case.
    pub async fn update_avatar(
        &self,
        store: &MediaStore,
        user_id: Uuid,
        data: &[u8],
        extension: Option<&str>,
    ) -> AppResult<String> {
        let uri = store.store(data, extension).await?;
        self.db.set_avatar_url(user_id, &uri).await?;
        Ok(uri)
    }

    /// Forget the local session (sign-out)
    ///
    /// The session JWT simply stops being presented; only local state is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be removed
    pub fn sign_out(&self) -> AppResult<()> {
        self.sessions.clear()
    }

    /// Delete the account and everything it owns
    ///
    /// The database cascade runs first, then the local session is cleared. A
    /// mid-sequence failure surfaces as an error with earlier deletes already
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns `AuthWrongPassword` if the confirmation password is wrong, or
    /// the first delete failure.
    pub async fn delete_account(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found("Account no longer exists"))?;

        if !Self::verify_password(password.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::wrong_password("Wrong password"));
        }

        self.db.delete_user_cascade(user_id).await?;
        self.sessions.clear()?;

        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    /// Local session accessor for route-level gating
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    async fn hash_password(password: String) -> AppResult<String> {
        task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
        task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
    }

    /// Minimal structural email validation
    fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !email.contains(char::is_whitespace)
    }

    fn is_valid_password(password: &str) -> bool {
        password.len() >= MIN_PASSWORD_LEN
    }
}

/// SHA-256 hash of a raw token, hex-encoded, for at-rest storage
#[must_use]
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Generate a 32-byte random token, hex-encoded
#[must_use]
pub fn generate_raw_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(AuthService::is_valid_email("alice@example.com"));
        assert!(!AuthService::is_valid_email("alice"));
        assert!(!AuthService::is_valid_email("@example.com"));
        assert!(!AuthService::is_valid_email("alice@nodot"));
        assert!(!AuthService::is_valid_email("alice @example.com"));
    }

    #[test]
    fn token_hash_is_deterministic_and_opaque() {
        let raw = generate_raw_token();
        assert_eq!(hash_token(&raw), hash_token(&raw));
        assert_ne!(hash_token(&raw), raw);
    }

    #[test]
    fn session_tokens_roundtrip() {
        let manager = AuthManager::new("test-secret");
        let user = User::new(
            "alice@example.com".to_owned(),
            "hash".to_owned(),
            Some("Alice".to_owned()),
        );

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let manager = AuthManager::new("test-secret");
        let other = AuthManager::new("other-secret");
        let user = User::new("a@b.com".to_owned(), "hash".to_owned(), None);

        let token = manager.generate_token(&user).unwrap();
        assert!(other.validate_token(&token).is_err());
        assert!(manager.validate_token("not-a-token").is_err());
    }
}
