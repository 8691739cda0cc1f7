//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::ValidateEmail;

use docvault_core::AppError;
use docvault_core::types::PrincipalId;

/// A user identity. Email is the sole login key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: PrincipalId,
    /// Unique email address.
    pub email: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Inactive principals cannot authenticate.
    pub is_active: bool,
    /// Staff flag, informational only.
    pub is_staff: bool,
    /// Set once, the first time this principal successfully created content.
    pub content_bootstrapped_at: Option<DateTime<Utc>>,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Whether the one-time content capability bootstrap has run.
    pub fn is_bootstrapped(&self) -> bool {
        self.content_bootstrapped_at.is_some()
    }
}

/// Data required to provision a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    /// Email address (normalized to lowercase on insert).
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Staff flag.
    pub is_staff: bool,
}

impl CreatePrincipal {
    /// Check the provisioning input before it reaches the store.
    pub fn validate(&self) -> Result<(), AppError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if !email.validate_email() {
            return Err(AppError::validation(format!(
                "Invalid email address: '{email}'"
            )));
        }
        if self.display_name.trim().is_empty() {
            return Err(AppError::validation("Display name is required"));
        }
        Ok(())
    }

    /// The email as stored: trimmed and lowercased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
