// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account registration, login, and session tokens.
//!
//! Passwords are stored as Argon2id PHC strings. Session tokens are random
//! bytes, URL-safe base64 encoded, and expire at the end of the UTC day on
//! which they were issued.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use concierge_config::model::AuthConfig;
use concierge_core::types::{now_timestamp, NewUser, User};
use concierge_core::{AccountStore, ConciergeError};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

/// Message for any token that does not resolve to an active user.
pub const INVALID_SESSION: &str = "Invalid or expired session";

/// Message for a failed login. Deliberately the same for unknown users and bad passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// A freshly issued login token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
}

/// Account operations on top of an [`AccountStore`].
pub struct Accounts {
    store: Arc<dyn AccountStore>,
    config: AuthConfig,
}

impl Accounts {
    pub fn new(store: Arc<dyn AccountStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }

    /// Creates the user and logs them in.
    ///
    /// A taken username or email comes back as [`ConciergeError::Conflict`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginSession, ConciergeError> {
        let password_hash = self.hash_password(password).await?;
        let user_id = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;
        info!(user_id, "user registered");
        self.issue_token(user_id).await
    }

    /// Verifies credentials. `None` for an unknown user or a wrong password.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<LoginSession>, ConciergeError> {
        let Some((user, stored_hash)) = self.store.find_user(username).await? else {
            debug!("login for unknown user");
            return Ok(None);
        };
        if !verify_password(password.to_string(), stored_hash).await? {
            debug!(user_id = user.id, "login with wrong password");
            return Ok(None);
        }
        self.store.touch_login(user.id).await?;
        self.issue_token(user.id).await.map(Some)
    }

    /// The active user a token belongs to, if it has not expired.
    pub async fn verify(&self, token: &str) -> Result<Option<User>, ConciergeError> {
        self.store.user_for_token(token, &now_timestamp()).await
    }

    /// Requires `token` to belong to `user_id`.
    pub async fn authorize(&self, token: &str, user_id: i64) -> Result<User, ConciergeError> {
        match self.verify(token).await? {
            Some(user) if user.id == user_id => Ok(user),
            _ => Err(ConciergeError::Unauthorized("Unauthorized".into())),
        }
    }

    async fn issue_token(&self, user_id: i64) -> Result<LoginSession, ConciergeError> {
        let mut bytes = vec![0u8; self.config.token_bytes];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(&bytes);
        let expires_at = end_of_utc_day();
        self.store
            .create_login_session(user_id, &token, &expires_at)
            .await?;
        Ok(LoginSession {
            user_id,
            token,
            expires_at,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, ConciergeError> {
        let params = Params::new(
            self.config.memory_cost_kib,
            self.config.iterations,
            self.config.parallelism,
            None,
        )
        .map_err(|e| ConciergeError::Config(format!("invalid Argon2id parameters: {e}")))?;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || {
            let mut salt = [0u8; 16];
            OsRng.fill_bytes(&mut salt);
            let salt = SaltString::encode_b64(&salt)
                .map_err(|e| ConciergeError::Internal(format!("salt encoding failed: {e}")))?;
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| ConciergeError::Internal(format!("password hashing failed: {e}")))
        })
        .await
        .map_err(|e| ConciergeError::Internal(format!("hashing task failed: {e}")))?
    }
}

/// Checks `password` against a PHC string. Parameters come from the hash itself.
async fn verify_password(password: String, stored_hash: String) -> Result<bool, ConciergeError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| ConciergeError::Internal(format!("stored hash unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| ConciergeError::Internal(format!("verification task failed: {e}")))?
}

/// `YYYY-MM-DDT23:59:59.999Z` for the current UTC date.
pub fn end_of_utc_day() -> String {
    format!("{}T23:59:59.999Z", Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_end_of_today_and_sorts_after_now() {
        let expiry = end_of_utc_day();
        assert!(expiry.ends_with("T23:59:59.999Z"));
        assert_eq!(expiry.len(), now_timestamp().len());
        assert!(expiry.as_str() >= now_timestamp().as_str());
    }

    #[tokio::test]
    async fn hash_round_trip() {
        let params = Params::new(1024, 1, 1, None).unwrap();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::encode_b64(&[7u8; 16]).unwrap();
        let hash = argon2
            .hash_password(b"hunter2", &salt)
            .unwrap()
            .to_string();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("hunter2".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter3".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        assert!(verify_password("x".into(), "not-a-hash".into()).await.is_err());
    }
}
