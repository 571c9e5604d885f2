//! Shared fakes for integration tests.
//!
//! `MemoryGoodsRepository` implements the repository contract over plain
//! vectors so interactor-level behavior (priorities, soft deletes, cache
//! interplay, timeouts) can be exercised without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stockroom_api::cache::CacheStore;
use stockroom_api::repo::GoodsRepository;
use stockroom_core::{CacheError, Good, GoodId, GoodPage, ProjectId, RepoError};
use tokio::sync::Mutex;

/// In-memory stand-in for the Postgres repository.
#[derive(Default)]
pub struct MemoryGoodsRepository {
    state: Mutex<Inner>,
    /// Number of `get_list` calls served, for cache-hit assertions.
    pub list_calls: AtomicUsize,
    /// Artificial delay applied to every operation, for timeout tests.
    pub delay: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    projects: HashSet<ProjectId>,
    goods: Vec<Good>,
    next_id: GoodId,
}

impl MemoryGoodsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn add_project(&self, project_id: ProjectId) {
        self.state.lock().await.projects.insert(project_id);
    }

    pub async fn get(&self, id: GoodId) -> Option<Good> {
        self.state
            .lock()
            .await
            .goods
            .iter()
            .find(|g| g.id == id)
            .cloned()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GoodsRepository for MemoryGoodsRepository {
    async fn create(&self, project_id: ProjectId, name: &str) -> Result<Good, RepoError> {
        self.pause().await;
        let mut state = self.state.lock().await;

        if !state.projects.contains(&project_id) {
            return Err(RepoError::ProjectNotFound { project_id });
        }

        let max_priority = state.goods.iter().map(|g| g.priority).max().unwrap_or(0);
        state.next_id += 1;
        let good = Good {
            id: state.next_id,
            project_id,
            name: name.to_string(),
            description: String::new(),
            priority: max_priority + 1,
            removed: false,
            created_at: Utc::now(),
        };
        state.goods.push(good.clone());
        Ok(good)
    }

    async fn update(
        &self,
        id: GoodId,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> Result<Good, RepoError> {
        self.pause().await;
        let mut state = self.state.lock().await;

        let good = state
            .goods
            .iter_mut()
            .find(|g| g.id == id && g.project_id == project_id)
            .ok_or(RepoError::GoodNotFound { id, project_id })?;

        good.name = name.to_string();
        if !description.is_empty() {
            good.description = description.to_string();
        }
        Ok(good.clone())
    }

    async fn remove(
        &self,
        id: GoodId,
        project_id: ProjectId,
        removed: bool,
    ) -> Result<Good, RepoError> {
        self.pause().await;
        let mut state = self.state.lock().await;

        let good = state
            .goods
            .iter_mut()
            .find(|g| g.id == id && g.project_id == project_id)
            .ok_or(RepoError::GoodNotFound { id, project_id })?;

        good.removed = removed;
        Ok(good.clone())
    }

    async fn get_list(&self, limit: i64, offset: i64) -> Result<GoodPage, RepoError> {
        self.pause().await;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;

        let effective_limit = if limit == 0 { 10 } else { limit };
        let goods: Vec<Good> = state
            .goods
            .iter()
            .skip(offset.max(0) as usize)
            .take(effective_limit.max(0) as usize)
            .cloned()
            .collect();

        Ok(GoodPage::from_rows(goods, limit, offset))
    }
}

/// Cache store whose reads and writes always fail, for fail-closed tests.
pub struct BrokenCacheStore;

#[async_trait]
impl CacheStore for BrokenCacheStore {
    async fn get(&self, _key: &str) -> Result<Vec<u8>, CacheError> {
        Err(CacheError::backend("cache down"))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("cache down"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("cache down"))
    }
}
