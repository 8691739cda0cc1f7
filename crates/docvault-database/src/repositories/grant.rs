//! Permission grant repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool, Transaction};

use docvault_core::result::AppResult;
use docvault_core::types::{NodeId, PrincipalId};
use docvault_entity::permission::{Capability, CapabilitySet, PermissionGrant};

use crate::error::{classify, database};

/// A grant joined with the grantee's email, for owner-facing listings.
#[derive(Debug, Clone, FromRow)]
pub struct GrantWithEmail {
    /// Grantee.
    pub principal_id: PrincipalId,
    /// Grantee email.
    pub email: String,
    /// Granted capability.
    pub capability: Capability,
    /// When the grant was written.
    pub created_at: DateTime<Utc>,
}

/// Repository for chain-root capability grants.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: SqlitePool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction for a grant/revoke sequence.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| classify(e, "Failed to begin grant transaction"))
    }

    /// Stored capabilities of a principal on a chain root.
    pub async fn find_capabilities(
        &self,
        principal: PrincipalId,
        root_id: NodeId,
    ) -> AppResult<CapabilitySet> {
        Self::capabilities_with(&self.pool, principal, root_id).await
    }

    /// Same as [`Self::find_capabilities`] on a caller-supplied executor,
    /// so an open transaction sees its own writes.
    pub async fn capabilities_with<'e, E>(
        executor: E,
        principal: PrincipalId,
        root_id: NodeId,
    ) -> AppResult<CapabilitySet>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_scalar::<_, Capability>(
            "SELECT capability FROM permission_grants WHERE principal_id = ? AND root_id = ?",
        )
        .bind(principal)
        .bind(root_id)
        .fetch_all(executor)
        .await
        .map_err(|e| database(e, "Failed to load grants"))?;

        Ok(CapabilitySet::from_grants(rows))
    }

    /// All grants on a chain root with grantee emails.
    pub async fn find_by_root(&self, root_id: NodeId) -> AppResult<Vec<GrantWithEmail>> {
        sqlx::query_as::<_, GrantWithEmail>(
            "SELECT g.principal_id, p.email, g.capability, g.created_at \
             FROM permission_grants g JOIN principals p ON p.id = g.principal_id \
             WHERE g.root_id = ? ORDER BY p.email, g.capability",
        )
        .bind(root_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to list grants"))
    }

    /// Write a grant. Re-granting an existing capability is a no-op apart
    /// from recording the latest grantor.
    pub async fn upsert(
        conn: &mut SqliteConnection,
        principal: PrincipalId,
        root_id: NodeId,
        capability: Capability,
        granted_by: PrincipalId,
    ) -> AppResult<PermissionGrant> {
        sqlx::query_as::<_, PermissionGrant>(
            "INSERT INTO permission_grants (principal_id, root_id, capability, granted_by, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (principal_id, root_id, capability) \
             DO UPDATE SET granted_by = excluded.granted_by \
             RETURNING *",
        )
        .bind(principal)
        .bind(root_id)
        .bind(capability)
        .bind(granted_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|e| classify(e, "Failed to write grant"))
    }

    /// Remove one capability. Returns whether a grant existed.
    pub async fn revoke(
        conn: &mut SqliteConnection,
        principal: PrincipalId,
        root_id: NodeId,
        capability: Capability,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM permission_grants WHERE principal_id = ? AND root_id = ? AND capability = ?",
        )
        .bind(principal)
        .bind(root_id)
        .bind(capability)
        .execute(conn)
        .await
        .map_err(|e| classify(e, "Failed to revoke grant"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every capability a principal holds on a chain root.
    pub async fn revoke_all(
        conn: &mut SqliteConnection,
        principal: PrincipalId,
        root_id: NodeId,
    ) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM permission_grants WHERE principal_id = ? AND root_id = ?")
                .bind(principal)
                .bind(root_id)
                .execute(conn)
                .await
                .map_err(|e| classify(e, "Failed to revoke grants"))?;

        Ok(result.rows_affected())
    }
}
