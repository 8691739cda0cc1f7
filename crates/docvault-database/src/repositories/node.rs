//! Version node repository implementation.
//!
//! Reads go straight to the pool. Chain mutation goes through
//! [`ChainWrite`], a transaction that takes the database write lock before
//! it reads anything, so the "read latest, insert successor" sequence runs
//! against the current chain state.

use chrono::Utc;
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use docvault_core::result::AppResult;
use docvault_core::types::{NodeId, PrincipalId};
use docvault_entity::node::{NewVersionNode, VersionNode};

use crate::error::{classify, database};

/// A chain root shared with some principal, plus its owner's email.
#[derive(Debug, Clone, FromRow)]
pub struct SharedRoot {
    /// The chain root.
    #[sqlx(flatten)]
    pub node: VersionNode,
    /// Email of the chain owner.
    pub owner_email: String,
}

/// Repository for version node queries.
#[derive(Debug, Clone)]
pub struct VersionNodeRepository {
    pool: SqlitePool,
}

impl VersionNodeRepository {
    /// Create a new version node repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a node by primary key.
    pub async fn find_by_id(&self, id: NodeId) -> AppResult<Option<VersionNode>> {
        sqlx::query_as::<_, VersionNode>("SELECT * FROM version_nodes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database(e, "Failed to find version node"))
    }

    /// Chain roots owned by a principal, oldest first.
    pub async fn find_roots_by_owner(&self, owner: PrincipalId) -> AppResult<Vec<VersionNode>> {
        sqlx::query_as::<_, VersionNode>(
            "SELECT * FROM version_nodes \
             WHERE owner_id = ? AND previous_version_id IS NULL \
             ORDER BY created_at, id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to list owned documents"))
    }

    /// Chain roots not owned by the principal on which it holds `view`.
    pub async fn find_roots_shared_with(
        &self,
        principal: PrincipalId,
    ) -> AppResult<Vec<SharedRoot>> {
        sqlx::query_as::<_, SharedRoot>(
            "SELECT n.*, p.email AS owner_email FROM version_nodes n \
             JOIN principals p ON p.id = n.owner_id \
             WHERE n.previous_version_id IS NULL AND n.owner_id <> ? \
             AND EXISTS (SELECT 1 FROM permission_grants g \
                         WHERE g.root_id = n.id AND g.principal_id = ? AND g.capability = 'view') \
             ORDER BY n.created_at, n.id",
        )
        .bind(principal)
        .bind(principal)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to list shared documents"))
    }

    /// Every node of a chain, newest version first.
    pub async fn find_chain(&self, root_id: NodeId) -> AppResult<Vec<VersionNode>> {
        sqlx::query_as::<_, VersionNode>(
            "SELECT * FROM version_nodes WHERE id = ? OR root_id = ? \
             ORDER BY version_number DESC",
        )
        .bind(root_id)
        .bind(root_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to list versions"))
    }

    /// Every node at a virtual path across all owners, newest version first.
    pub async fn find_by_path(&self, virtual_path: &str) -> AppResult<Vec<VersionNode>> {
        sqlx::query_as::<_, VersionNode>(
            "SELECT * FROM version_nodes WHERE virtual_path = ? \
             ORDER BY version_number DESC, created_at",
        )
        .bind(virtual_path)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database(e, "Failed to resolve path"))
    }

    /// Open a chain mutation transaction for one virtual path.
    pub async fn begin_chain_write(&self, virtual_path: &str) -> AppResult<ChainWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify(e, "Failed to begin upload transaction"))?;

        sqlx::query(
            "INSERT INTO path_locks (virtual_path, locked_at) VALUES (?, ?) \
             ON CONFLICT (virtual_path) DO UPDATE SET locked_at = excluded.locked_at",
        )
        .bind(virtual_path)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify(e, "Failed to lock virtual path"))?;

        debug!(virtual_path, "Acquired chain write lock");
        Ok(ChainWrite { tx })
    }
}

/// An open chain mutation. Dropping it without [`ChainWrite::commit`]
/// rolls everything back.
pub struct ChainWrite {
    tx: Transaction<'static, Sqlite>,
}

impl ChainWrite {
    /// The transaction's connection, for lookups that must see its state.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Chain roots at a path, oldest first.
    pub async fn find_roots_at_path(&mut self, virtual_path: &str) -> AppResult<Vec<VersionNode>> {
        sqlx::query_as::<_, VersionNode>(
            "SELECT * FROM version_nodes \
             WHERE virtual_path = ? AND previous_version_id IS NULL \
             ORDER BY created_at, id",
        )
        .bind(virtual_path)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to resolve chain roots"))
    }

    /// The node with the highest version number in a chain.
    pub async fn find_latest(&mut self, root_id: NodeId) -> AppResult<Option<VersionNode>> {
        sqlx::query_as::<_, VersionNode>(
            "SELECT * FROM version_nodes WHERE id = ? OR root_id = ? \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(root_id)
        .bind(root_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to find latest version"))
    }

    /// Whether any node of the chain already has this checksum.
    pub async fn chain_contains_checksum(
        &mut self,
        root_id: NodeId,
        checksum: &str,
    ) -> AppResult<bool> {
        let matches = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM version_nodes \
             WHERE (id = ? OR root_id = ?) AND checksum = ?",
        )
        .bind(root_id)
        .bind(root_id)
        .bind(checksum)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to check for duplicate content"))?;

        Ok(matches > 0)
    }

    /// Insert a node. Uniqueness violations surface as `Conflict`.
    pub async fn insert(&mut self, data: NewVersionNode) -> AppResult<VersionNode> {
        sqlx::query_as::<_, VersionNode>(
            "INSERT INTO version_nodes (id, name, mime_type, size_bytes, checksum, blob_handle, \
             virtual_path, version_number, owner_id, uploader_id, previous_version_id, root_id, \
             notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.checksum)
        .bind(&data.blob_handle)
        .bind(&data.virtual_path)
        .bind(data.version_number)
        .bind(data.owner_id)
        .bind(data.uploader_id)
        .bind(data.previous_version_id)
        .bind(data.root_id)
        .bind(&data.notes)
        .bind(Utc::now())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to insert version node"))
    }

    /// Commit the transaction.
    pub async fn commit(self) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| classify(e, "Failed to commit upload transaction"))
    }
}
