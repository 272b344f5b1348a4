//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod bpmn;
mod history;
mod instance;
mod process;
mod task;
mod user;

pub use bpmn::{BpmnStep, synthesize_bpmn};
pub use history::{
    COMPLETION_EVENT_KEY, HistoryEvent, HistoryEventProperties, HistoryPage, HistoryQuery,
    HistorySort, canonical_json, compare_timestamps,
};
pub use instance::{InstanceOption, instance_search_query};
pub use process::{Process, ProcessTemplate};
pub use task::{
    AggregatedTask, TaskAction, TaskActionInput, TaskDetails, TaskProgress, TaskProperty,
    TaskStatus,
};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, USER_NAME_MAX_LENGTH,
    USER_NAME_MIN_LENGTH, UserId, validate_password, validate_user_name,
};
