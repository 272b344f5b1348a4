use easyholmes_core::AppResult;

use crate::response_cache::{CacheCategory, CacheScope, CacheStats};

use super::*;

impl HolmesService {
    /// Returns the cache size and keys.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drops every cached response.
    pub async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    /// Drops everything cached for one process: the process, its history
    /// pages and its template.
    pub async fn invalidate_process(&self, process_id: &str) -> usize {
        self.cache
            .invalidate_scope(&CacheScope::Process(process_id.to_owned()))
            .await
    }

    /// Drops the process list and every history page, then reloads the list.
    pub async fn refresh_processes(&self) -> AppResult<Vec<ProcessView>> {
        self.cache.invalidate(&CacheKey::ProcessList).await;
        self.cache
            .invalidate_scope(&CacheScope::Category(CacheCategory::ProcessHistory))
            .await;
        self.list_process_views().await
    }

    /// Drops every history page and task detail so task views are rebuilt.
    pub async fn refresh_tasks(&self) -> usize {
        let history = self
            .cache
            .invalidate_scope(&CacheScope::Category(CacheCategory::ProcessHistory))
            .await;
        let tasks = self
            .cache
            .invalidate_scope(&CacheScope::Category(CacheCategory::TaskDetails))
            .await;
        history + tasks
    }
}
