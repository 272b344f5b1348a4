use std::fmt::{Display, Formatter};

use easyholmes_domain::{HistoryQuery, canonical_json};
use serde_json::Value;

/// Logical resource kind of a cached response. Selects the TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// `GET /processes/`.
    ProcessList,
    /// History pages of one process.
    ProcessHistory,
    /// `GET /tasks/{id}`.
    TaskDetails,
    /// Option catalogues backing task properties.
    PropertyOptions,
    /// BPMN templates.
    Template,
    /// Everything else (single process, instance searches).
    Default,
}

/// Structured cache key: a category tag plus the arguments of the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// Process list.
    ProcessList,
    /// One process.
    Process {
        /// Holmes process id.
        process_id: String,
    },
    /// One history page of one process.
    ProcessHistory {
        /// Holmes process id.
        process_id: String,
        /// Canonical JSON of the history query.
        query: String,
    },
    /// Task detail.
    TaskDetails {
        /// Holmes task id.
        task_id: String,
    },
    /// Instance search over one entity.
    Instances {
        /// Holmes entity id.
        entity_id: String,
        /// Canonical JSON of the search body.
        query: String,
    },
    /// Option catalogue for one property type.
    PropertyOptions {
        /// Entity id backing the property.
        property_type_id: String,
    },
    /// BPMN template of one process.
    Template {
        /// Holmes process id.
        process_id: String,
    },
}

impl CacheKey {
    /// Key of one process.
    #[must_use]
    pub fn process(process_id: &str) -> Self {
        Self::Process {
            process_id: process_id.to_owned(),
        }
    }

    /// Key of one history page.
    #[must_use]
    pub fn process_history(process_id: &str, query: &HistoryQuery) -> Self {
        Self::ProcessHistory {
            process_id: process_id.to_owned(),
            query: query.canonical_json(),
        }
    }

    /// Key of one task detail.
    #[must_use]
    pub fn task_details(task_id: &str) -> Self {
        Self::TaskDetails {
            task_id: task_id.to_owned(),
        }
    }

    /// Key of one instance search.
    #[must_use]
    pub fn instances(entity_id: &str, query: &Value) -> Self {
        Self::Instances {
            entity_id: entity_id.to_owned(),
            query: canonical_json(query),
        }
    }

    /// Key of one option catalogue.
    #[must_use]
    pub fn property_options(property_type_id: &str) -> Self {
        Self::PropertyOptions {
            property_type_id: property_type_id.to_owned(),
        }
    }

    /// Key of one BPMN template.
    #[must_use]
    pub fn template(process_id: &str) -> Self {
        Self::Template {
            process_id: process_id.to_owned(),
        }
    }

    /// Returns the TTL category of this key.
    #[must_use]
    pub fn category(&self) -> CacheCategory {
        match self {
            Self::ProcessList => CacheCategory::ProcessList,
            Self::ProcessHistory { .. } => CacheCategory::ProcessHistory,
            Self::TaskDetails { .. } => CacheCategory::TaskDetails,
            Self::PropertyOptions { .. } => CacheCategory::PropertyOptions,
            Self::Template { .. } => CacheCategory::Template,
            Self::Process { .. } | Self::Instances { .. } => CacheCategory::Default,
        }
    }

    /// Returns the process this key belongs to, if any.
    #[must_use]
    pub fn process_id(&self) -> Option<&str> {
        match self {
            Self::Process { process_id }
            | Self::ProcessHistory { process_id, .. }
            | Self::Template { process_id } => Some(process_id.as_str()),
            _ => None,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProcessList => formatter.write_str("processes"),
            Self::Process { process_id } => write!(formatter, "process_{process_id}"),
            Self::ProcessHistory { process_id, query } => {
                write!(formatter, "history_{process_id}_{query}")
            }
            Self::TaskDetails { task_id } => write!(formatter, "task_{task_id}"),
            Self::Instances { entity_id, query } => {
                write!(formatter, "instances_{entity_id}_{query}")
            }
            Self::PropertyOptions { property_type_id } => {
                write!(formatter, "property_options_{property_type_id}")
            }
            Self::Template { process_id } => write!(formatter, "template_{process_id}"),
        }
    }
}

/// Set of cache entries selected for invalidation.
///
/// Matching is done on the structured key, never on its string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    /// Every entry of one category.
    Category(CacheCategory),
    /// Every history page of one process.
    ProcessHistory(String),
    /// Every entry owned by one process: the process, its history, its template.
    Process(String),
}

impl CacheScope {
    /// Returns whether `key` falls inside this scope.
    #[must_use]
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Self::Category(category) => key.category() == *category,
            Self::ProcessHistory(process_id) => matches!(
                key,
                CacheKey::ProcessHistory { process_id: owner, .. } if owner == process_id
            ),
            Self::Process(process_id) => key.process_id() == Some(process_id.as_str()),
        }
    }
}

impl Display for CacheScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(category) => write!(formatter, "category {category:?}"),
            Self::ProcessHistory(process_id) => write!(formatter, "history of {process_id}"),
            Self::Process(process_id) => write!(formatter, "process {process_id}"),
        }
    }
}
