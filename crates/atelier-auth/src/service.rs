// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration and login over the account store.
//!
//! Passwords are hashed with argon2id at registration and verified against
//! the stored PHC string at login. Plaintext never reaches storage.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;
use serde::Deserialize;
use tracing::{debug, info};

use atelier_core::types::{Account, AccountKind, AccountProfile, now_timestamp};
use atelier_core::{AccountStore, AtelierError};

use crate::validation::{validate_email, validate_name, validate_password, validate_phone};

/// Registration input as submitted by the signup form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Account registration and credential verification.
pub struct AuthService {
    store: Arc<dyn AccountStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Validates and registers a new account, returning its public profile.
    pub async fn register(&self, new: NewAccount) -> Result<AccountProfile, AtelierError> {
        validate_name(&new.name)?;
        validate_email(&new.email)?;

        if self
            .store
            .find_account_by_email(&new.email)
            .await?
            .is_some()
        {
            return Err(AtelierError::Validation {
                field: "email",
                message: "this email is already registered".to_string(),
            });
        }

        // Phone is collected (and therefore required) only for customers.
        if new.kind == AccountKind::Customer {
            validate_phone(new.phone.as_deref().unwrap_or(""))?;
        }

        validate_password(&new.password)?;
        if new.password != new.confirm_password {
            return Err(AtelierError::Validation {
                field: "confirm_password",
                message: "passwords do not match".to_string(),
            });
        }

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            kind: new.kind,
            name: new.name,
            email: new.email,
            phone: new.phone,
            password_hash: hash_password(&new.password)?,
            created_at: now_timestamp(),
        };
        self.store.insert_account(&account).await?;

        info!(account_id = %account.id, kind = %account.kind, "account registered");
        Ok(account.profile())
    }

    /// Verifies credentials and returns the matching public profile.
    ///
    /// Unknown email and wrong password produce distinct field-level errors,
    /// matching the form behavior this service backs.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccountProfile, AtelierError> {
        validate_email(email)?;
        validate_password(password)?;

        let account = self
            .store
            .find_account_by_email(email)
            .await?
            .ok_or_else(|| AtelierError::Validation {
                field: "email",
                message: "email is not registered".to_string(),
            })?;

        if !verify_password(password, &account.password_hash) {
            debug!(account_id = %account.id, "login rejected: password mismatch");
            return Err(AtelierError::Validation {
                field: "password",
                message: "incorrect password".to_string(),
            });
        }

        info!(account_id = %account.id, "login succeeded");
        Ok(account.profile())
    }
}

/// Hashes a password with argon2id default parameters, producing a
/// self-describing PHC string.
pub fn hash_password(password: &str) -> Result<String, AtelierError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AtelierError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored PHC string. An unparsable hash
/// verifies as false rather than erroring: it means the stored credential is
/// unusable either way.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
