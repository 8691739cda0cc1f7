//! Principal repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::PrincipalId;
use docvault_entity::principal::{CreatePrincipal, Principal};

use crate::error::{database, is_unique_violation};

/// Repository for principal provisioning and lookup.
#[derive(Debug, Clone)]
pub struct PrincipalRepository {
    pool: SqlitePool,
}

impl PrincipalRepository {
    /// Create a new principal repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a principal by primary key.
    pub async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database(e, "Failed to find principal by id"))
    }

    /// Find a principal by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database(e, "Failed to find principal by email"))
    }

    /// List all principals, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals ORDER BY created_at, email")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database(e, "Failed to list principals"))
    }

    /// Insert a new principal.
    pub async fn create(&self, data: &CreatePrincipal) -> AppResult<Principal> {
        data.validate()?;
        let email = data.normalized_email();

        sqlx::query_as::<_, Principal>(
            "INSERT INTO principals (id, email, display_name, is_active, is_staff, created_at) \
             VALUES (?, ?, ?, 1, ?, ?) RETURNING *",
        )
        .bind(PrincipalId::new())
        .bind(&email)
        .bind(data.display_name.trim())
        .bind(data.is_staff)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::validation(format!("A user with email '{email}' already exists"))
            } else {
                database(e, "Failed to create principal")
            }
        })
    }

    /// Enable or disable a principal.
    pub async fn set_active(&self, id: PrincipalId, active: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE principals SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database(e, "Failed to update principal status"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Principal {id} not found")));
        }
        Ok(())
    }

    /// Stamp the one-time content bootstrap.
    ///
    /// Returns `true` only for the call that actually set the stamp.
    pub async fn mark_bootstrapped(&self, id: PrincipalId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE principals SET content_bootstrapped_at = ? \
             WHERE id = ? AND content_bootstrapped_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to bootstrap principal"))?;

        Ok(result.rows_affected() == 1)
    }
}
