// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field-level validation for account registration and login forms.
//!
//! Failures are returned as [`AtelierError::Validation`] naming the field,
//! so the caller can surface them next to the input that produced them.

use std::sync::LazyLock;

use atelier_core::AtelierError;
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Email must be non-empty and shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), AtelierError> {
    if email.is_empty() {
        return Err(AtelierError::Validation {
            field: "email",
            message: "email is required".to_string(),
        });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AtelierError::Validation {
            field: "email",
            message: "invalid email".to_string(),
        });
    }
    Ok(())
}

/// Password must be at least 6 characters.
pub fn validate_password(password: &str) -> Result<(), AtelierError> {
    if password.is_empty() {
        return Err(AtelierError::Validation {
            field: "password",
            message: "password is required".to_string(),
        });
    }
    if password.chars().count() < 6 {
        return Err(AtelierError::Validation {
            field: "password",
            message: "password must be at least 6 characters".to_string(),
        });
    }
    Ok(())
}

/// Name must be at least 3 characters.
pub fn validate_name(name: &str) -> Result<(), AtelierError> {
    if name.is_empty() {
        return Err(AtelierError::Validation {
            field: "name",
            message: "name is required".to_string(),
        });
    }
    if name.chars().count() < 3 {
        return Err(AtelierError::Validation {
            field: "name",
            message: "name must be at least 3 characters".to_string(),
        });
    }
    Ok(())
}

/// Phone must contain at least 10 digits, ignoring formatting characters.
pub fn validate_phone(phone: &str) -> Result<(), AtelierError> {
    if phone.is_empty() {
        return Err(AtelierError::Validation {
            field: "phone",
            message: "phone is required".to_string(),
        });
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 10 {
        return Err(AtelierError::Validation {
            field: "phone",
            message: "invalid phone number".to_string(),
        });
    }
    Ok(())
}
