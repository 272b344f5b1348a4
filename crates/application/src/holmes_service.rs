//! Facade over the Holmes gateway.
//!
//! The only component that calls [`HolmesGateway`] directly. Reads go through
//! the [`ResponseCache`] with the category TTL; mutations call Holmes and
//! invalidate the affected entries only after the call succeeded.

mod cache_control;
mod mutations;
mod reads;


use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use easyholmes_domain::{InstanceOption, Process, TaskProperty};

use crate::response_cache::{CacheKey, CacheTtlPolicy, ResponseCache};
use crate::HolmesGateway;

/// Holmes identifiers used by process creation and instance lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolmesCatalogSettings {
    /// Entity whose instances populate the instance dropdown.
    pub instance_entity_id: String,
    /// Property used to sort instance searches.
    pub instance_sort_field: String,
    /// Workflow started by process creation.
    pub process_workflow_id: String,
    /// Start event of that workflow.
    pub process_start_event: String,
    /// Property receiving the discipline value.
    pub discipline_property_id: String,
    /// Property receiving the stage value.
    pub stage_property_id: String,
}

impl Default for HolmesCatalogSettings {
    fn default() -> Self {
        Self {
            instance_entity_id: "68597a8e0b52b4fa33e34995".to_owned(),
            instance_sort_field: "8547a640-504b-11f0-a2c8-75d9e0938171".to_owned(),
            process_workflow_id: "684b215594374c145b750317".to_owned(),
            process_start_event: "StartEvent_1".to_owned(),
            discipline_property_id: "f59f23f0-4aec-11f0-83f5-4dfed4731510".to_owned(),
            stage_property_id: "f1f6dc70-4aec-11f0-83f5-4dfed4731510".to_owned(),
        }
    }
}

/// Process decorated with display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessView {
    /// Holmes process, passed through.
    #[serde(flatten)]
    pub process: Process,
    /// Identifier, or name when there is none.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// `name (status)`.
    pub description: String,
}

impl From<Process> for ProcessView {
    fn from(process: Process) -> Self {
        Self {
            display_name: process.display_name().to_owned(),
            description: process.description(),
            process,
        }
    }
}

/// Task property with the options a user can pick from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPropertyView {
    /// Property as Holmes describes it.
    #[serde(flatten)]
    pub property: TaskProperty,
    /// Options from the property's catalogue; empty for free-form properties.
    pub options: Vec<InstanceOption>,
}

/// Result of a Holmes connection check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionCheck {
    /// Number of processes Holmes returned.
    pub processes_count: usize,
    /// First process, if any.
    pub sample_process: Option<Process>,
}

/// Input for process creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProcessInput {
    /// Discipline value.
    pub discipline: String,
    /// Stage value.
    pub stage: String,
    /// Instance the new process is attached to.
    pub instance_id: String,
}

/// Input for completing a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteTaskInput {
    /// Owning process, when the caller knows it.
    pub process_id: Option<String>,
    /// Action to take; the first available action when absent.
    pub action_id: Option<String>,
    /// Property values submitted with the action.
    pub property_values: Vec<Value>,
}

/// Cached access to Holmes.
#[derive(Clone)]
pub struct HolmesService {
    gateway: Arc<dyn HolmesGateway>,
    cache: Arc<ResponseCache>,
    ttl_policy: CacheTtlPolicy,
    catalog: HolmesCatalogSettings,
}

impl HolmesService {
    /// Creates a new facade.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn HolmesGateway>,
        cache: Arc<ResponseCache>,
        ttl_policy: CacheTtlPolicy,
        catalog: HolmesCatalogSettings,
    ) -> Self {
        Self {
            gateway,
            cache,
            ttl_policy,
            catalog,
        }
    }

    fn ttl(&self, key: &CacheKey) -> Duration {
        self.ttl_policy.ttl_for(key.category())
    }
}
