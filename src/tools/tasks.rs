//! Task tools: add, list, list-by-priority, update, delete over the task
//! store. This layer owns validation and orchestration; storage mechanics
//! live in [`crate::store`].

use std::sync::Arc;

use serde_json::{json, Value};

use crate::store::{
    NewTask, Priority, Status, TaskPatch, TaskStore, PRIORITY_VALUES, STATUS_VALUES,
};
use crate::tools::context::ToolCtx;
use crate::tools::descriptor::{ParamKind, ParamSpec};
use crate::tools::error::ToolError;
use crate::tools::registry::{BoxFuture, RegistryError, Tool, ToolRegistry};

const TAGS: &[&str] = &["tasks", "todo"];

const ADD_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("title", ParamKind::String),
    ParamSpec::required("description", ParamKind::String),
    ParamSpec::required("created_date", ParamKind::Date),
    ParamSpec::required("status", ParamKind::Enum(STATUS_VALUES)),
    ParamSpec::required("priority", ParamKind::Enum(PRIORITY_VALUES)),
];

const LIST_PARAMS: &[ParamSpec] = &[];

const LIST_BY_PRIORITY_PARAMS: &[ParamSpec] =
    &[ParamSpec::required("priority", ParamKind::Enum(PRIORITY_VALUES))];

const UPDATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("task_id", ParamKind::Integer),
    ParamSpec::optional("title", ParamKind::String),
    ParamSpec::optional("description", ParamKind::String),
    ParamSpec::optional("status", ParamKind::Enum(STATUS_VALUES)),
    ParamSpec::optional("priority", ParamKind::Enum(PRIORITY_VALUES)),
    ParamSpec::optional("email", ParamKind::String),
];

const DELETE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("task_id", ParamKind::Integer),
    ParamSpec::optional("email", ParamKind::String),
];

// --- argument helpers (dispatcher has already validated/coerced) ---

fn str_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| ToolError::Internal(format!("missing coerced argument '{key}'")))
}

fn opt_str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(String::from)
}

fn id_arg(args: &Value) -> Result<i64, ToolError> {
    args.get("task_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::Internal("missing coerced argument 'task_id'".to_string()))
}

fn status_arg(args: &Value, key: &str) -> Result<Status, ToolError> {
    let s = str_arg(args, key)?;
    Status::parse(&s)
        .ok_or_else(|| ToolError::Internal(format!("uncoerced status value '{s}'")))
}

fn priority_arg(args: &Value, key: &str) -> Result<Priority, ToolError> {
    let s = str_arg(args, key)?;
    Priority::parse(&s)
        .ok_or_else(|| ToolError::Internal(format!("uncoerced priority value '{s}'")))
}

fn opt_status_arg(args: &Value, key: &str) -> Result<Option<Status>, ToolError> {
    match args.get(key).and_then(Value::as_str) {
        Some(s) => Status::parse(s)
            .map(Some)
            .ok_or_else(|| ToolError::Internal(format!("uncoerced status value '{s}'"))),
        None => Ok(None),
    }
}

fn opt_priority_arg(args: &Value, key: &str) -> Result<Option<Priority>, ToolError> {
    match args.get(key).and_then(Value::as_str) {
        Some(s) => Priority::parse(s)
            .map(Some)
            .ok_or_else(|| ToolError::Internal(format!("uncoerced priority value '{s}'"))),
        None => Ok(None),
    }
}

/// Exact-equality gate against the configured authorized identity.
fn authorize(ctx: &ToolCtx, supplied: Option<&str>, authorized: &str) -> Result<(), ToolError> {
    if supplied != Some(authorized) {
        ctx.error("authorization failed", &Value::Null);
        return Err(ToolError::Unauthorized(
            "invalid email address, provide the verified email".to_string(),
        ));
    }
    Ok(())
}

// --- tools ---

/// add_task tool.
pub struct AddTask {
    store: Arc<TaskStore>,
}

impl AddTask {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }
}

impl Tool for AddTask {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Add a new task to the task list"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        ADD_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let task = NewTask {
                title: str_arg(args, "title")?,
                description: str_arg(args, "description")?,
                created_date: str_arg(args, "created_date")?,
                status: status_arg(args, "status")?,
                priority: priority_arg(args, "priority")?,
            };
            ctx.debug(
                "adding task",
                &json!({ "title": &task.title, "priority": task.priority.as_str() }),
            );
            let store = Arc::clone(&self.store);
            let id = tokio::task::spawn_blocking(move || store.add(&task))
                .await
                .map_err(|e| ToolError::Internal(format!("store task join: {e}")))??;
            ctx.info("task added", &json!({ "id": id }));
            Ok(json!({ "id": id, "message": "Task added successfully" }))
        })
    }
}

/// list_all_tasks tool.
pub struct ListAllTasks {
    store: Arc<TaskStore>,
}

impl ListAllTasks {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }
}

impl Tool for ListAllTasks {
    fn name(&self) -> &str {
        "list_all_tasks"
    }

    fn description(&self) -> &str {
        "List all tasks, most recent first"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        LIST_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        _args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let store = Arc::clone(&self.store);
            let tasks = tokio::task::spawn_blocking(move || store.list_all())
                .await
                .map_err(|e| ToolError::Internal(format!("store task join: {e}")))??;
            ctx.info("listed tasks", &json!({ "count": tasks.len() }));
            Ok(json!({ "tasks": tasks }))
        })
    }
}

/// list_tasks_by_priority tool.
pub struct ListTasksByPriority {
    store: Arc<TaskStore>,
}

impl ListTasksByPriority {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }
}

impl Tool for ListTasksByPriority {
    fn name(&self) -> &str {
        "list_tasks_by_priority"
    }

    fn description(&self) -> &str {
        "List tasks with the given priority, most recent first"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        LIST_BY_PRIORITY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            // membership was checked by the dispatcher, before any store access
            let priority = priority_arg(args, "priority")?;
            let store = Arc::clone(&self.store);
            let tasks = tokio::task::spawn_blocking(move || store.list_by_priority(priority))
                .await
                .map_err(|e| ToolError::Internal(format!("store task join: {e}")))??;
            ctx.info(
                "listed tasks by priority",
                &json!({ "priority": priority.as_str(), "count": tasks.len() }),
            );
            Ok(json!({ "tasks": tasks }))
        })
    }
}

/// update_task tool. Mutating: gated by the configured authorized identity.
pub struct UpdateTask {
    store: Arc<TaskStore>,
    authorized_email: String,
}

impl UpdateTask {
    pub fn new(store: Arc<TaskStore>, authorized_email: &str) -> Self {
        Self {
            store,
            authorized_email: authorized_email.to_string(),
        }
    }
}

impl Tool for UpdateTask {
    fn name(&self) -> &str {
        "update_task"
    }

    fn description(&self) -> &str {
        "Update fields of a task by its ID"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        UPDATE_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            // authorization precedes the existence check
            let email = opt_str_arg(args, "email");
            authorize(ctx, email.as_deref(), &self.authorized_email)?;

            let id = id_arg(args)?;
            let patch = TaskPatch {
                title: opt_str_arg(args, "title"),
                description: opt_str_arg(args, "description"),
                status: opt_status_arg(args, "status")?,
                priority: opt_priority_arg(args, "priority")?,
            };
            if patch.is_empty() {
                return Err(ToolError::InvalidArgument(
                    "no fields provided to update".to_string(),
                ));
            }

            ctx.debug("updating task", &json!({ "task_id": id }));
            let store = Arc::clone(&self.store);
            let rows = tokio::task::spawn_blocking(move || store.update(id, &patch))
                .await
                .map_err(|e| ToolError::Internal(format!("store task join: {e}")))??;
            if rows == 0 {
                return Err(ToolError::NotFound("no task found with that id".to_string()));
            }
            ctx.info("task updated", &json!({ "task_id": id }));
            Ok(json!({ "message": format!("Task {id} updated successfully") }))
        })
    }
}

/// delete_task tool. Mutating: gated by the configured authorized identity.
pub struct DeleteTask {
    store: Arc<TaskStore>,
    authorized_email: String,
}

impl DeleteTask {
    pub fn new(store: Arc<TaskStore>, authorized_email: &str) -> Self {
        Self {
            store,
            authorized_email: authorized_email.to_string(),
        }
    }
}

impl Tool for DeleteTask {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn description(&self) -> &str {
        "Delete a task by its ID"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        DELETE_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            // authorization precedes the existence check
            let email = opt_str_arg(args, "email");
            authorize(ctx, email.as_deref(), &self.authorized_email)?;

            let id = id_arg(args)?;
            ctx.debug("deleting task", &json!({ "task_id": id }));
            let store = Arc::clone(&self.store);
            let rows = tokio::task::spawn_blocking(move || store.delete(id))
                .await
                .map_err(|e| ToolError::Internal(format!("store task join: {e}")))??;
            if rows == 0 {
                return Err(ToolError::NotFound("no task found with that id".to_string()));
            }
            ctx.info("task deleted", &json!({ "task_id": id }));
            Ok(json!({ "message": format!("Task {id} deleted successfully") }))
        })
    }
}

/// Register the task tool group. `authorized_email` gates the mutating
/// operations.
pub fn register(
    registry: &ToolRegistry,
    store: Arc<TaskStore>,
    authorized_email: &str,
) -> Result<(), RegistryError> {
    registry.register(AddTask::new(Arc::clone(&store)))?;
    registry.register(ListAllTasks::new(Arc::clone(&store)))?;
    registry.register(ListTasksByPriority::new(Arc::clone(&store)))?;
    registry.register(UpdateTask::new(Arc::clone(&store), authorized_email))?;
    registry.register(DeleteTask::new(store, authorized_email))?;
    tracing::info!("registered task tools");
    Ok(())
}
