use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use easyholmes_core::{AppError, AppResult};
use easyholmes_domain::{
    HistoryEvent, HistoryPage, HistoryQuery, Process, ProcessTemplate, TaskActionInput,
    TaskDetails, TaskStatus,
};

use crate::{
    AggregationSettings, CacheTtlPolicy, HolmesCatalogSettings, HolmesGateway, HolmesService,
    ResponseCache, TaskAggregator,
};

/// In-memory Holmes used by service and aggregator tests.
#[derive(Default)]
pub(crate) struct FakeHolmesGateway {
    pub processes: Mutex<Vec<Process>>,
    pub histories: Mutex<HashMap<String, Vec<HistoryEvent>>>,
    pub failing_histories: Mutex<HashSet<String>>,
    pub task_details: Mutex<HashMap<String, TaskDetails>>,
    pub failing_tasks: Mutex<HashSet<String>>,
    pub templates: Mutex<HashMap<String, ProcessTemplate>>,
    pub search_response: Mutex<Value>,
    pub reject_mutations: AtomicBool,
    pub process_list_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub task_detail_calls: Mutex<Vec<String>>,
    pub mutations: Mutex<Vec<String>>,
    pub started_workflows: Mutex<Vec<(String, Value)>>,
}

impl FakeHolmesGateway {
    pub async fn with_process(&self, id: &str, name: &str, identifier: &str, status: &str) {
        self.processes.lock().await.push(process(id, name, identifier, status));
    }

    pub async fn with_history(&self, process_id: &str, events: Vec<HistoryEvent>) {
        self.histories
            .lock()
            .await
            .insert(process_id.to_owned(), events);
    }

    pub async fn with_due_date(&self, task_id: &str, due_date: &str) {
        self.task_details.lock().await.insert(
            task_id.to_owned(),
            TaskDetails {
                id: task_id.to_owned(),
                due_date: Some(due_date.to_owned()),
                ..TaskDetails::default()
            },
        );
    }

    pub async fn fail_task(&self, task_id: &str) {
        self.failing_tasks.lock().await.insert(task_id.to_owned());
    }

    pub async fn detail_calls_for(&self, task_id: &str) -> usize {
        self.task_detail_calls
            .lock()
            .await
            .iter()
            .filter(|called| called.as_str() == task_id)
            .count()
    }
}

#[async_trait]
impl HolmesGateway for FakeHolmesGateway {
    async fn list_processes(&self) -> AppResult<Vec<Process>> {
        self.process_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.processes.lock().await.clone())
    }

    async fn get_process(&self, process_id: &str) -> AppResult<Process> {
        self.processes
            .lock()
            .await
            .iter()
            .find(|process| process.id == process_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("failed to fetch process {process_id}")))
    }

    async fn process_history(
        &self,
        process_id: &str,
        query: &HistoryQuery,
    ) -> AppResult<HistoryPage> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_histories.lock().await.contains(process_id) {
            return Err(AppError::Upstream(format!(
                "failed to fetch history of process {process_id}"
            )));
        }

        let events = self
            .histories
            .lock()
            .await
            .get(process_id)
            .cloned()
            .unwrap_or_default();
        let per_page = query.per_page.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * per_page;

        Ok(HistoryPage {
            histories: events.into_iter().skip(skip).take(per_page).collect(),
            ..HistoryPage::default()
        })
    }

    async fn task_details(&self, task_id: &str) -> AppResult<TaskDetails> {
        self.task_detail_calls.lock().await.push(task_id.to_owned());
        if self.failing_tasks.lock().await.contains(task_id) {
            return Err(AppError::Upstream(format!(
                "failed to fetch task details {task_id}"
            )));
        }

        Ok(self
            .task_details
            .lock()
            .await
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| TaskDetails {
                id: task_id.to_owned(),
                ..TaskDetails::default()
            }))
    }

    async fn process_template(&self, process_id: &str) -> AppResult<ProcessTemplate> {
        self.templates
            .lock()
            .await
            .get(process_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream("failed to fetch BPMN template".to_owned()))
    }

    async fn search_instances(&self, _entity_id: &str, _query: &Value) -> AppResult<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.search_response.lock().await.clone())
    }

    async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> AppResult<Value> {
        self.mutate(format!("status {task_id} {status}")).await
    }

    async fn execute_task_action(
        &self,
        task_id: &str,
        action: &TaskActionInput,
    ) -> AppResult<Value> {
        self.mutate(format!("action {task_id} {}", action.action_id))
            .await
    }

    async fn start_workflow(&self, workflow_id: &str, payload: &Value) -> AppResult<Value> {
        self.started_workflows
            .lock()
            .await
            .push((workflow_id.to_owned(), payload.clone()));
        self.mutate(format!("start {workflow_id}")).await
    }
}

impl FakeHolmesGateway {
    async fn mutate(&self, description: String) -> AppResult<Value> {
        if self.reject_mutations.load(Ordering::SeqCst) {
            return Err(AppError::Forbidden(
                "task is not assigned to the current user".to_owned(),
            ));
        }
        self.mutations.lock().await.push(description);
        Ok(json!({"ok": true}))
    }
}

pub(crate) fn process(id: &str, name: &str, identifier: &str, status: &str) -> Process {
    Process {
        id: id.to_owned(),
        name: name.to_owned(),
        identifier: identifier.to_owned(),
        status: status.to_owned(),
        extra: serde_json::Map::new(),
    }
}

pub(crate) fn event(key: &str, task_id: &str, created_at: &str) -> HistoryEvent {
    match serde_json::from_value(json!({
        "key": key,
        "created_at": created_at,
        "properties": {
            "task_id": task_id,
            "task_name": format!("Task {task_id}"),
            "long_link": format!("https://app.holmesdoc.io/tasks/{task_id}")
        }
    })) {
        Ok(event) => event,
        Err(error) => panic!("history event should deserialize: {error}"),
    }
}

pub(crate) fn service(gateway: Arc<FakeHolmesGateway>) -> HolmesService {
    HolmesService::new(
        gateway,
        Arc::new(ResponseCache::new()),
        CacheTtlPolicy::default(),
        HolmesCatalogSettings::default(),
    )
}

pub(crate) fn aggregator(gateway: Arc<FakeHolmesGateway>, settings: AggregationSettings) -> TaskAggregator {
    TaskAggregator::new(service(gateway), settings)
}
