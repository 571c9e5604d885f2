//! Goods Interactor
//!
//! Orchestration layer composing the transactional repository, the read
//! cache, and the change notifier per use case. Owns the per-call deadline:
//! every operation is wrapped in a timeout, and exceeding it aborts the
//! in-flight store calls and returns a timeout error.
//!
//! Mutations follow one shape: durable repository write, whole-page cache
//! invalidation, then a best-effort publish of the post-mutation entity
//! state. The publish is explicitly non-atomic with the write — its failure
//! is reported on the outcome but never rolls the committed mutation back.

use crate::cache::{CacheStore, LIST_CACHE_KEY};
use crate::error::{ApiError, ApiResult};
use crate::pubsub::{PubSub, EVENT_TOPIC};
use crate::repo::GoodsRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stockroom_core::{CacheError, Good, GoodId, GoodPage, ProjectId};

/// Result of a mutating operation.
///
/// `good` is the committed, store-authoritative entity state. When the
/// change notification could not be sent, `publish_failed` carries the
/// reason; the mutation itself stands regardless.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub good: Good,
    pub publish_failed: Option<String>,
}

/// Orchestrates goods use cases over repository, cache, and notifier.
pub struct GoodsInteractor {
    repo: Arc<dyn GoodsRepository>,
    cache: Arc<dyn CacheStore>,
    bus: PubSub,
    /// Deadline applied to each externally-facing call.
    timeout: Duration,
    /// TTL for the cached list page.
    cache_ttl: Duration,
}

impl GoodsInteractor {
    pub fn new(
        repo: Arc<dyn GoodsRepository>,
        cache: Arc<dyn CacheStore>,
        bus: PubSub,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            bus,
            timeout,
            cache_ttl,
        }
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Create a good under a project.
    pub async fn create_good(&self, project_id: ProjectId, name: &str) -> ApiResult<MutationOutcome> {
        self.deadline("create_good", async {
            let good = self.repo.create(project_id, name).await?;
            Ok(self.finish_mutation(good).await)
        })
        .await
    }

    /// Update name (and, when non-empty, description) of a good.
    pub async fn update_good(
        &self,
        id: GoodId,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> ApiResult<MutationOutcome> {
        self.deadline("update_good", async {
            let good = self.repo.update(id, project_id, name, description).await?;
            Ok(self.finish_mutation(good).await)
        })
        .await
    }

    /// Soft-delete a good.
    pub async fn remove_good(&self, id: GoodId, project_id: ProjectId) -> ApiResult<MutationOutcome> {
        self.deadline("remove_good", async {
            let good = self.repo.remove(id, project_id, true).await?;
            Ok(self.finish_mutation(good).await)
        })
        .await
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Read one list page, cache-aside.
    ///
    /// Cache hit: deserialize and return without touching the repository.
    /// Cache miss: read from the repository, populate the cache (failure to
    /// populate is logged, not fatal), return. Any other cache failure is
    /// surfaced — the read path fails closed to keep cache outages visible.
    pub async fn get_list(&self, limit: i64, offset: i64) -> ApiResult<GoodPage> {
        self.deadline("get_list", async {
            match self.cache.get(LIST_CACHE_KEY).await {
                Ok(bytes) => {
                    let page: GoodPage = serde_json::from_slice(&bytes).map_err(|e| {
                        tracing::error!(error = %e, "cached list page is corrupt");
                        ApiError::internal_error("Corrupt cache entry")
                    })?;
                    Ok(page)
                }
                Err(CacheError::Miss) => {
                    let page = self.repo.get_list(limit, offset).await?;

                    match serde_json::to_vec(&page) {
                        Ok(bytes) => {
                            if let Err(e) =
                                self.cache.set(LIST_CACHE_KEY, bytes, self.cache_ttl).await
                            {
                                tracing::warn!(error = %e, "failed to populate list cache");
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to serialize list page"),
                    }

                    Ok(page)
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Invalidate the cached page and publish the post-mutation state.
    ///
    /// Both steps run after the repository commit. Invalidation failure is
    /// logged (the TTL still bounds staleness); publish failure is carried
    /// on the outcome as a soft flag.
    async fn finish_mutation(&self, good: Good) -> MutationOutcome {
        if let Err(e) = self.cache.delete(LIST_CACHE_KEY).await {
            tracing::error!(error = %e, "failed to invalidate list cache");
        }

        let publish_failed = match serde_json::to_vec(&good) {
            Ok(payload) => self
                .bus
                .publish(EVENT_TOPIC, payload)
                .err()
                .map(|e| e.to_string()),
            Err(e) => Some(format!("failed to serialize entity: {e}")),
        };

        if let Some(reason) = &publish_failed {
            tracing::error!(good_id = good.id, %reason, "change notification not published");
        }

        MutationOutcome {
            good,
            publish_failed,
        }
    }

    async fn deadline<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = ApiResult<T>>,
    ) -> ApiResult<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ApiError::timeout(operation))?
    }
}
