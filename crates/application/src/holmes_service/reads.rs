use std::collections::HashMap;

use futures::future::{join_all, try_join_all};
use tracing::{debug, warn};

use easyholmes_core::AppResult;
use easyholmes_domain::{
    HistoryPage, HistoryQuery, InstanceOption, ProcessTemplate, TaskDetails,
    instance_search_query,
};

use super::*;

impl HolmesService {
    /// Lists every process Holmes knows about.
    pub async fn list_processes(&self) -> AppResult<Vec<Process>> {
        let key = CacheKey::ProcessList;
        let ttl = self.ttl(&key);
        self.cache
            .get_or_fetch(key, ttl, || self.gateway.list_processes())
            .await
    }

    /// Lists processes with `displayName` and `description` added.
    pub async fn list_process_views(&self) -> AppResult<Vec<ProcessView>> {
        Ok(self
            .list_processes()
            .await?
            .into_iter()
            .map(ProcessView::from)
            .collect())
    }

    /// Returns one process.
    pub async fn get_process(&self, process_id: &str) -> AppResult<Process> {
        let key = CacheKey::process(process_id);
        let ttl = self.ttl(&key);
        self.cache
            .get_or_fetch(key, ttl, || self.gateway.get_process(process_id))
            .await
    }

    /// Returns one page of a process's history.
    pub async fn process_history(
        &self,
        process_id: &str,
        query: &HistoryQuery,
    ) -> AppResult<HistoryPage> {
        let key = CacheKey::process_history(process_id, query);
        let ttl = self.ttl(&key);
        self.cache
            .get_or_fetch(key, ttl, || self.gateway.process_history(process_id, query))
            .await
    }

    /// Returns one task's details.
    pub async fn task_details(&self, task_id: &str) -> AppResult<TaskDetails> {
        let key = CacheKey::task_details(task_id);
        let ttl = self.ttl(&key);
        self.cache
            .get_or_fetch(key, ttl, || self.gateway.task_details(task_id))
            .await
    }

    /// Fetches several task details concurrently.
    ///
    /// Fails as a whole when any single fetch fails.
    pub async fn multiple_task_details(
        &self,
        task_ids: &[String],
    ) -> AppResult<HashMap<String, TaskDetails>> {
        debug!(count = task_ids.len(), "fetching task details concurrently");
        let details = try_join_all(task_ids.iter().map(|task_id| self.task_details(task_id))).await?;

        Ok(task_ids.iter().cloned().zip(details).collect())
    }

    /// Runs an instance search over one entity.
    pub async fn search_instances(
        &self,
        entity_id: &str,
        query: &serde_json::Value,
    ) -> AppResult<serde_json::Value> {
        let key = CacheKey::instances(entity_id, query);
        let ttl = self.ttl(&key);
        self.cache
            .get_or_fetch(key, ttl, || self.gateway.search_instances(entity_id, query))
            .await
    }

    /// Lists the instances a new process can be attached to.
    pub async fn instance_options(&self) -> AppResult<Vec<InstanceOption>> {
        let entity_id = self.catalog.instance_entity_id.as_str();
        let query = instance_search_query(entity_id, &self.catalog.instance_sort_field);
        let response = self.search_instances(entity_id, &query).await?;

        Ok(InstanceOption::from_search_response(&response))
    }

    /// Lists the options of a property catalogue.
    pub async fn property_options(&self, property_type_id: &str) -> AppResult<Vec<InstanceOption>> {
        let key = CacheKey::property_options(property_type_id);
        let ttl = self.ttl(&key);
        let query = instance_search_query(property_type_id, &self.catalog.instance_sort_field);
        let response = self
            .cache
            .get_or_fetch(key, ttl, || {
                self.gateway.search_instances(property_type_id, &query)
            })
            .await?;

        Ok(InstanceOption::from_search_response(&response))
    }

    /// Returns a task's form properties with their option lists.
    ///
    /// A property whose catalogue cannot be loaded is returned without options.
    pub async fn task_properties(&self, task_id: &str) -> AppResult<Vec<TaskPropertyView>> {
        let details = self.task_details(task_id).await?;

        let views = details.properties.into_iter().map(|property| async move {
            let options = match property.property_type.as_deref() {
                Some(property_type) if !property_type.trim().is_empty() => {
                    match self.property_options(property_type).await {
                        Ok(options) => options,
                        Err(error) => {
                            warn!(
                                task_id,
                                property_id = %property.id,
                                %error,
                                "failed to load property options"
                            );
                            Vec::new()
                        }
                    }
                }
                _ => Vec::new(),
            };
            TaskPropertyView { property, options }
        });

        Ok(join_all(views).await)
    }

    /// Returns the process's BPMN XML, synthesized when Holmes has no template.
    pub async fn process_template(&self, process_id: &str) -> AppResult<String> {
        let key = CacheKey::template(process_id);
        let ttl = self.ttl(&key);
        let template: ProcessTemplate = self
            .cache
            .get_or_fetch(key, ttl, || self.gateway.process_template(process_id))
            .await?;

        Ok(template.into_xml(process_id))
    }

    /// Checks Holmes reachability with an uncached process listing.
    pub async fn check_connection(&self) -> AppResult<ConnectionCheck> {
        let processes = self.gateway.list_processes().await?;
        Ok(ConnectionCheck {
            processes_count: processes.len(),
            sample_process: processes.into_iter().next(),
        })
    }
}
