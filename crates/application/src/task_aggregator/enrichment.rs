use std::collections::HashMap;

use tracing::{debug, warn};

use easyholmes_domain::{AggregatedTask, TaskDetails};

use super::TaskAggregator;

impl TaskAggregator {
    /// Attaches due dates to tasks still in progress.
    ///
    /// Details are fetched as one concurrent batch. When the batch fails, each
    /// task is fetched on its own and failures only leave that task without a
    /// due date. Completed tasks are never fetched.
    pub(super) async fn enrich(&self, tasks: &mut [AggregatedTask]) {
        let pending: Vec<String> = tasks
            .iter()
            .filter(|task| !task.is_completed())
            .map(|task| task.task_id.clone())
            .collect();
        if pending.is_empty() {
            return;
        }

        let details = match self.holmes_service.multiple_task_details(&pending).await {
            Ok(details) => details,
            Err(error) => {
                warn!(%error, pending = pending.len(), "batch task detail fetch failed, fetching one by one");
                self.fetch_details_sequentially(&pending).await
            }
        };

        for task in tasks.iter_mut().filter(|task| !task.is_completed()) {
            if let Some(due_date) = details.get(&task.task_id).and_then(TaskDetails::due_date) {
                task.due_date = Some(due_date.to_owned());
            }
        }
        debug!(pending = pending.len(), enriched = details.len(), "task enrichment finished");
    }

    async fn fetch_details_sequentially(&self, task_ids: &[String]) -> HashMap<String, TaskDetails> {
        let mut details = HashMap::with_capacity(task_ids.len());
        for task_id in task_ids {
            match self.holmes_service.task_details(task_id).await {
                Ok(task_details) => {
                    details.insert(task_id.clone(), task_details);
                }
                Err(error) => {
                    warn!(task_id = %task_id, %error, "failed to fetch task details");
                }
            }
        }
        details
    }
}
