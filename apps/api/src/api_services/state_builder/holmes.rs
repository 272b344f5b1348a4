use std::sync::Arc;

use easyholmes_application::{HolmesService, ResponseCache, TaskAggregator};
use easyholmes_core::AppError;
use easyholmes_infrastructure::HttpHolmesGateway;
use tracing::info;

use crate::api_config::ApiConfig;

pub(super) struct HolmesServices {
    pub(super) holmes_service: HolmesService,
    pub(super) task_aggregator: TaskAggregator,
}

pub(super) fn build_holmes_services(config: &ApiConfig) -> Result<HolmesServices, AppError> {
    let gateway = Arc::new(HttpHolmesGateway::new(
        &config.holmes.base_url,
        &config.holmes.api_token,
        config.holmes.timeout,
    )?);
    info!(
        base_url = %config.holmes.base_url,
        timeout_seconds = config.holmes.timeout.as_secs(),
        "holmes gateway configured"
    );

    let holmes_service = HolmesService::new(
        gateway,
        Arc::new(ResponseCache::new()),
        config.cache_ttl,
        config.catalog.clone(),
    );
    let task_aggregator = TaskAggregator::new(holmes_service.clone(), config.aggregation.clone());

    Ok(HolmesServices {
        holmes_service,
        task_aggregator,
    })
}
