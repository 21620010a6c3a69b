// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account validation, password hashing, and login for the Atelier support
//! desk.

pub mod seed;
pub mod service;
pub mod validation;

pub use seed::seed_demo_accounts;
pub use service::{AuthService, NewAccount, hash_password, verify_password};
pub use validation::{validate_email, validate_name, validate_password, validate_phone};
