use std::time::Duration;

use easyholmes_core::{AppError, AppResult};

use super::CacheCategory;

/// Time-to-live of each cache category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlPolicy {
    /// Process list.
    pub process_list: Duration,
    /// Process history pages.
    pub process_history: Duration,
    /// Task details.
    pub task_details: Duration,
    /// Property option catalogues.
    pub property_options: Duration,
    /// BPMN templates.
    pub template: Duration,
    /// Anything else.
    pub default: Duration,
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        Self {
            process_list: Duration::from_secs(10 * 60),
            process_history: Duration::from_secs(30),
            task_details: Duration::from_secs(5 * 60),
            property_options: Duration::from_secs(30 * 60),
            template: Duration::from_secs(60 * 60),
            default: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheTtlPolicy {
    /// Returns the TTL for `category`.
    #[must_use]
    pub fn ttl_for(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::ProcessList => self.process_list,
            CacheCategory::ProcessHistory => self.process_history,
            CacheCategory::TaskDetails => self.task_details,
            CacheCategory::PropertyOptions => self.property_options,
            CacheCategory::Template => self.template,
            CacheCategory::Default => self.default,
        }
    }

    /// Checks that every TTL is positive and that volatile resources expire
    /// first: history < task details < process list < template.
    pub fn validate(&self) -> AppResult<()> {
        let all = [
            ("process_list", self.process_list),
            ("process_history", self.process_history),
            ("task_details", self.task_details),
            ("property_options", self.property_options),
            ("template", self.template),
            ("default", self.default),
        ];
        if let Some((name, _)) = all.iter().find(|(_, ttl)| ttl.is_zero()) {
            return Err(AppError::Validation(format!(
                "cache ttl '{name}' must be greater than zero"
            )));
        }

        let ordered = [
            ("process_history", self.process_history),
            ("task_details", self.task_details),
            ("process_list", self.process_list),
            ("template", self.template),
        ];
        for pair in ordered.windows(2) {
            if let [(shorter, shorter_ttl), (longer, longer_ttl)] = pair
                && shorter_ttl >= longer_ttl
            {
                return Err(AppError::Validation(format!(
                    "cache ttl '{shorter}' ({}s) must be shorter than '{longer}' ({}s)",
                    shorter_ttl.as_secs(),
                    longer_ttl.as_secs()
                )));
            }
        }

        Ok(())
    }
}
