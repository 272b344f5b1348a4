use easyholmes_application::CacheStats;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cache-stats-response.ts"
)]
pub struct CacheStatsResponse {
    pub size: usize,
    pub keys: Vec<String>,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            size: stats.size,
            keys: stats.keys,
        }
    }
}

/// Number of cache entries dropped by an invalidation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cache-invalidation-response.ts"
)]
pub struct CacheInvalidationResponse {
    pub removed: usize,
}
