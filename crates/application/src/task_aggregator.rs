//! Task views reconstructed from process history.
//!
//! Per process: fetch every history page, discover tasks (first occurrence
//! wins), mark the ones with a `history.take_action` event completed (latest
//! completion wins), then attach due dates to the tasks still in progress.
//! Across processes the results are merged by task id and sorted newest first.

mod enrichment;
mod fold;


use std::cmp::Ordering;
use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use easyholmes_core::AppResult;
use easyholmes_domain::{
    AggregatedTask, HistoryEvent, HistoryQuery, Process, TaskStatus, compare_timestamps,
};

use crate::HolmesService;

pub use fold::fold_history;

/// Pagination and selection settings for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSettings {
    /// History page size.
    pub history_per_page: u32,
    /// Maximum number of history pages fetched per process.
    pub history_max_pages: u32,
    /// Number of processes whose history is fetched at the same time.
    pub history_concurrency: usize,
    /// Only processes with this workflow name are aggregated, when set.
    pub process_name_filter: Option<String>,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            history_per_page: 100,
            history_max_pages: 10,
            history_concurrency: 4,
            process_name_filter: None,
        }
    }
}

/// Owning process as seen by the fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessContext {
    /// Holmes process id.
    pub process_id: String,
    /// Workflow name.
    pub process_name: String,
    /// Instance identifier.
    pub process_identifier: String,
}

impl ProcessContext {
    fn from_process(process: &Process) -> Self {
        let process_identifier = if process.identifier.trim().is_empty() {
            process.id.clone()
        } else {
            process.identifier.clone()
        };
        let process_name = if process.name.trim().is_empty() {
            process_identifier.clone()
        } else {
            process.name.clone()
        };

        Self {
            process_id: process.id.clone(),
            process_name,
            process_identifier,
        }
    }
}

/// Filter and page of a task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Restrict to one process.
    pub process_id: Option<String>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
    /// Page size.
    pub limit: usize,
    /// Number of tasks skipped.
    pub offset: usize,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            process_id: None,
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// One page of aggregated tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks in the page.
    pub tasks: Vec<AggregatedTask>,
    /// Number of tasks matching the filter before paging.
    pub total: usize,
    /// Page size used.
    pub limit: usize,
    /// Offset used.
    pub offset: usize,
}

/// Builds task views on top of [`HolmesService`].
#[derive(Clone)]
pub struct TaskAggregator {
    holmes_service: HolmesService,
    settings: AggregationSettings,
}

impl TaskAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub fn new(holmes_service: HolmesService, settings: AggregationSettings) -> Self {
        Self {
            holmes_service,
            settings,
        }
    }

    /// Tasks of one process, in history order.
    pub async fn tasks_for_process(&self, process_id: &str) -> AppResult<Vec<AggregatedTask>> {
        let context = match self.holmes_service.get_process(process_id).await {
            Ok(process) => ProcessContext {
                process_id: process_id.to_owned(),
                ..ProcessContext::from_process(&process)
            },
            Err(error) => {
                warn!(process_id, %error, "failed to resolve process, using its id as identifier");
                ProcessContext {
                    process_id: process_id.to_owned(),
                    process_name: process_id.to_owned(),
                    process_identifier: process_id.to_owned(),
                }
            }
        };

        let events = self.fetch_history(process_id).await?;
        let mut tasks = fold_history(&events, &context);
        self.enrich(&mut tasks).await;
        Ok(tasks)
    }

    /// Tasks of every eligible process, deduplicated and newest first.
    ///
    /// Processes whose history cannot be fetched are logged and skipped.
    pub async fn tasks_for_all_processes(&self) -> AppResult<Vec<AggregatedTask>> {
        let processes = self.eligible_processes().await?;
        debug!(count = processes.len(), "aggregating tasks across processes");

        let folded: Vec<Vec<AggregatedTask>> = stream::iter(processes)
            .map(|process| async move {
                let context = ProcessContext::from_process(&process);
                match self.fetch_history(&process.id).await {
                    Ok(events) => fold_history(&events, &context),
                    Err(error) => {
                        warn!(process_id = %process.id, %error, "skipping process with unreadable history");
                        Vec::new()
                    }
                }
            })
            .buffered(self.settings.history_concurrency.max(1))
            .collect()
            .await;

        let mut seen = HashSet::new();
        let mut tasks: Vec<AggregatedTask> = folded
            .into_iter()
            .flatten()
            .filter(|task| seen.insert(task.task_id.clone()))
            .collect();

        self.enrich(&mut tasks).await;
        tasks.sort_by(newest_first);
        Ok(tasks)
    }

    /// Filters and pages aggregated tasks.
    pub async fn query_tasks(&self, query: &TaskQuery) -> AppResult<TaskPage> {
        let tasks = match query.process_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(process_id) => self.tasks_for_process(process_id).await?,
            None => self.tasks_for_all_processes().await?,
        };

        let matching: Vec<AggregatedTask> = tasks
            .into_iter()
            .filter(|task| query.status.is_none_or(|status| status.matches(task.status)))
            .collect();
        let total = matching.len();

        Ok(TaskPage {
            tasks: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .collect(),
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Processes included in cross-process views: not cancelled, and matching
    /// the configured workflow name when one is set.
    pub async fn eligible_processes(&self) -> AppResult<Vec<Process>> {
        let processes = self.holmes_service.list_processes().await?;
        Ok(processes
            .into_iter()
            .filter(|process| !process.id.trim().is_empty() && !process.is_cancelled())
            .filter(|process| {
                self.settings
                    .process_name_filter
                    .as_deref()
                    .is_none_or(|name| process.name == name)
            })
            .collect())
    }

    /// Every history event of a process, page by page through the cache.
    ///
    /// Stops at the first short page or at the page cap.
    async fn fetch_history(&self, process_id: &str) -> AppResult<Vec<HistoryEvent>> {
        let per_page = self.settings.history_per_page.max(1);
        let first_page = HistoryQuery::first_page(per_page);
        let mut events = Vec::new();

        for page in 1..=self.settings.history_max_pages.max(1) {
            let histories = self
                .holmes_service
                .process_history(process_id, &first_page.with_page(page))
                .await?
                .histories;
            let fetched = histories.len();
            events.extend(histories);

            if fetched < per_page as usize {
                break;
            }
        }

        debug!(process_id, events = events.len(), "history fetched");
        Ok(events)
    }
}

fn newest_first(left: &AggregatedTask, right: &AggregatedTask) -> Ordering {
    compare_timestamps(&right.created_at, &left.created_at)
}
