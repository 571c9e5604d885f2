//! Transactional Goods Repository
//!
//! This module provides the durable write path against the relational store.
//! Update and remove run their existence check and write inside one
//! transaction at REPEATABLE READ; create is serialized by the lock alone
//! (see the note on [`GoodsRepository::create`]'s implementation). Every
//! check-then-act sequence is guarded by a readers-writer lock owned by the
//! repository instance: `get_list` takes the shared side, mutations take the
//! exclusive side.
//!
//! Mutations re-read the persisted row after commit so the values returned
//! to callers (timestamps, defaults, assigned ids) are store-authoritative
//! rather than locally assembled.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use stockroom_core::{Good, GoodId, GoodPage, ProjectId, RepoError};
use tokio::sync::RwLock;
use tokio_postgres::{IsolationLevel, Row};

/// Default page size when `limit` is given as 0.
const DEFAULT_PAGE_LIMIT: i64 = 10;

const GOOD_COLUMNS: &str = "id, project_id, name, description, priority, removed, created_at";

// ============================================================================
// REPOSITORY TRAIT
// ============================================================================

/// Storage seam for goods operations.
///
/// The interactor talks to this trait; `PgGoodsRepository` is the production
/// implementation and tests substitute an in-memory one.
#[async_trait]
pub trait GoodsRepository: Send + Sync {
    /// Create a good under an existing project, assigning the next priority.
    async fn create(&self, project_id: ProjectId, name: &str) -> Result<Good, RepoError>;

    /// Update name (and, when non-empty, description) of an existing good.
    async fn update(
        &self,
        id: GoodId,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> Result<Good, RepoError>;

    /// Set the soft-delete flag on an existing good.
    async fn remove(
        &self,
        id: GoodId,
        project_id: ProjectId,
        removed: bool,
    ) -> Result<Good, RepoError>;

    /// Read one page ordered by id ascending. A `limit` of 0 defaults to 10.
    async fn get_list(&self, limit: i64, offset: i64) -> Result<GoodPage, RepoError>;
}

// ============================================================================
// POSTGRES IMPLEMENTATION
// ============================================================================

/// Goods repository backed by a deadpool-postgres pool.
pub struct PgGoodsRepository {
    pool: Pool,
    /// Serializes check-then-act sequences across concurrent requests.
    /// Reads take the shared side, mutations the exclusive side.
    lock: RwLock<()>,
}

impl PgGoodsRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            lock: RwLock::new(()),
        }
    }

    async fn get_conn(&self) -> Result<deadpool_postgres::Object, RepoError> {
        self.pool
            .get()
            .await
            .map_err(|e| RepoError::store(format!("failed to acquire connection: {e}")))
    }

    /// Re-read the persisted row so returned values are store-authoritative.
    async fn get_good(&self, id: GoodId, project_id: ProjectId) -> Result<Good, RepoError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                format!("SELECT {GOOD_COLUMNS} FROM goods WHERE id = $1 AND project_id = $2")
                    .as_str(),
                &[&id, &project_id],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?
            .ok_or(RepoError::GoodNotFound { id, project_id })?;

        Ok(row_to_good(&row))
    }
}

#[async_trait]
impl GoodsRepository for PgGoodsRepository {
    // Unlike update/remove, create runs without an explicit transaction:
    // the exclusive lock already serializes the check/read/insert sequence,
    // and the lenient max-priority fallback has to keep issuing statements
    // after a failed query, which an aborted transaction would not allow.
    async fn create(&self, project_id: ProjectId, name: &str) -> Result<Good, RepoError> {
        let _guard = self.lock.write().await;
        tracing::debug!(project_id, "create good");

        let conn = self.get_conn().await?;

        let project_exists: bool = conn
            .query_one(
                "SELECT EXISTS (SELECT id FROM projects WHERE id = $1)",
                &[&project_id],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?
            .get(0);

        if !project_exists {
            return Err(RepoError::ProjectNotFound { project_id });
        }

        // Lenient fallback: a failed or empty max query yields 0 rather than
        // failing the whole create, so the first insert gets priority 1.
        let max_priority: i32 = match conn.query_one("SELECT max(priority) FROM goods", &[]).await {
            Ok(row) => row.get::<_, Option<i32>>(0).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "max priority query failed, defaulting to 0");
                0
            }
        };

        let inserted: GoodId = conn
            .query_one(
                "INSERT INTO goods (project_id, name, description, priority, removed) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[&project_id, &name, &"", &(max_priority + 1), &false],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?
            .get(0);

        self.get_good(inserted, project_id).await
    }

    async fn update(
        &self,
        id: GoodId,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> Result<Good, RepoError> {
        let _guard = self.lock.write().await;
        tracing::debug!(id, project_id, "update good");

        let mut conn = self.get_conn().await?;
        let tx = conn
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .start()
            .await
            .map_err(|e| RepoError::store(e.to_string()))?;

        let exists: bool = tx
            .query_one(
                "SELECT EXISTS (SELECT id FROM goods WHERE id = $1 AND project_id = $2)",
                &[&id, &project_id],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?
            .get(0);

        if !exists {
            rollback(tx).await;
            return Err(RepoError::GoodNotFound { id, project_id });
        }

        // An empty description means "leave unchanged", not "clear the field".
        let write = if description.is_empty() {
            tx.execute(
                "UPDATE goods SET name = $1 WHERE id = $2 AND project_id = $3",
                &[&name, &id, &project_id],
            )
            .await
        } else {
            tx.execute(
                "UPDATE goods SET name = $1, description = $2 WHERE id = $3 AND project_id = $4",
                &[&name, &description, &id, &project_id],
            )
            .await
        };

        if let Err(e) = write {
            rollback(tx).await;
            return Err(RepoError::store(e.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::store(e.to_string()))?;

        self.get_good(id, project_id).await
    }

    async fn remove(
        &self,
        id: GoodId,
        project_id: ProjectId,
        removed: bool,
    ) -> Result<Good, RepoError> {
        let _guard = self.lock.write().await;
        tracing::debug!(id, project_id, removed, "remove good");

        let mut conn = self.get_conn().await?;
        let tx = conn
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .start()
            .await
            .map_err(|e| RepoError::store(e.to_string()))?;

        let exists: bool = tx
            .query_one(
                "SELECT EXISTS (SELECT id FROM goods WHERE id = $1 AND project_id = $2)",
                &[&id, &project_id],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?
            .get(0);

        if !exists {
            rollback(tx).await;
            return Err(RepoError::GoodNotFound { id, project_id });
        }

        // Existence was just confirmed, so a failed write here is a lost
        // race with a concurrent mutation rather than a missing row.
        match tx
            .execute(
                "UPDATE goods SET removed = $1 WHERE id = $2 AND project_id = $3",
                &[&removed, &id, &project_id],
            )
            .await
        {
            Ok(affected) if affected > 0 => {}
            Ok(_) => {
                rollback(tx).await;
                return Err(RepoError::UpdateFailed { id });
            }
            Err(e) => {
                tracing::error!(id, error = %e, "remove write failed");
                rollback(tx).await;
                return Err(RepoError::UpdateFailed { id });
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::store(e.to_string()))?;

        self.get_good(id, project_id).await
    }

    async fn get_list(&self, limit: i64, offset: i64) -> Result<GoodPage, RepoError> {
        let _guard = self.lock.read().await;
        tracing::debug!(limit, offset, "list goods");

        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                format!(
                    "SELECT {GOOD_COLUMNS} FROM goods ORDER BY id \
                     OFFSET $1 LIMIT COALESCE(NULLIF($2, 0), {DEFAULT_PAGE_LIMIT})"
                )
                .as_str(),
                &[&offset, &limit],
            )
            .await
            .map_err(|e| RepoError::store(e.to_string()))?;

        let goods = rows.iter().map(row_to_good).collect();
        Ok(GoodPage::from_rows(goods, limit, offset))
    }
}

fn row_to_good(row: &Row) -> Good {
    Good {
        id: row.get("id"),
        project_id: row.get("project_id"),
        name: row.get("name"),
        description: row.get("description"),
        priority: row.get("priority"),
        removed: row.get("removed"),
        created_at: row.get("created_at"),
    }
}

/// Roll back explicitly so a rollback failure is logged instead of silently
/// swallowed on drop; the original error is what the caller sees either way.
async fn rollback(tx: deadpool_postgres::Transaction<'_>) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, "transaction rollback failed");
    }
}
