use std::collections::HashMap;

use easyholmes_domain::{AggregatedTask, HistoryEvent};

use super::ProcessContext;

/// Folds one process's history into its tasks, in discovery order.
///
/// Pass one discovers tasks from any event carrying a task id; the first
/// occurrence fixes the creation time. Pass two applies every completion event
/// that refers to a discovered task, keeping the latest completion time.
/// The result depends only on `events`, so folding the same stream twice
/// yields the same tasks.
#[must_use]
pub fn fold_history(events: &[HistoryEvent], context: &ProcessContext) -> Vec<AggregatedTask> {
    let mut tasks: Vec<AggregatedTask> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for event in events {
        let Some(task_id) = event.task_id() else {
            continue;
        };
        if positions.contains_key(task_id) {
            continue;
        }
        if let Some(task) = AggregatedTask::discovered(
            event,
            &context.process_id,
            &context.process_name,
            &context.process_identifier,
        ) {
            positions.insert(task_id.to_owned(), tasks.len());
            tasks.push(task);
        }
    }

    for event in events.iter().filter(|event| event.is_completion()) {
        let Some(position) = event.task_id().and_then(|task_id| positions.get(task_id)) else {
            continue;
        };
        if let Some(task) = tasks.get_mut(*position) {
            task.record_completion(&event.created_at);
        }
    }

    tasks
}
