/// Task endpoints
///
/// # Endpoints
///
/// ```text
/// GET    /tasks        # List tasks (page, limit, status, search, sort_by, order_by)
/// POST   /tasks        # Create task {name, description}
/// GET    /tasks/:id    # Get task by id
/// PUT    /tasks/:id    # Update task {status?, assignee?}
/// DELETE /tasks/:id    # Soft-delete task
/// ```
///
/// The update endpoint accepts optional `status` and optional `assignee`
/// in one body; each is validated and applied independently when present.
/// For `assignee`, an explicit null or empty string clears the assignment,
/// while leaving the field out leaves it unchanged.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use taskboard_shared::models::task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask};
use taskboard_shared::models::user::User;
use taskboard_shared::validation::{capitalize, parse_id, require_non_empty, sanitize};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task name
    #[validate(length(max = 255, message = "Name value must be at most 255 characters"))]
    pub name: String,

    /// Task description
    pub description: String,
}

/// Update task request
///
/// `assignee` distinguishes three cases: field absent (leave unchanged),
/// explicit null/empty (clear), and a candidate user id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    /// Target status
    #[serde(default)]
    pub status: Option<String>,

    /// Target assignee
    #[serde(default, deserialize_with = "double_option")]
    pub assignee: Option<Option<String>>,
}

/// Wraps any present value (including null) in Some, so an absent field
/// and an explicit null stay distinguishable.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// List response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListData {
    pub tasks: Vec<Task>,
    pub page: i64,
    pub total_pages: i64,
}

/// List tasks handler
///
/// Unknown query keys fail the request before anything touches storage;
/// empty values are dropped.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<TaskListData>>> {
    let filter = TaskFilter::from_query(&raw)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Get Task List Failed."))?;

    let page = Task::list(&state.db, &filter).await?;

    Ok(Envelope::ok(
        TaskListData {
            tasks: page.items,
            page: page.page,
            total_pages: page.total_pages,
        },
        "Get Task List Successfully!",
    ))
}

/// Get task by id handler
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Task>>> {
    let task_id = parse_id("Task Id", &id)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Get Task By Id Failed."))?;

    let task = Task::find_by_id(&state.db, task_id).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("Task With Id {task_id} Not Found Or Task Was Deleted."),
            format!("Get Task By Id {task_id} Failed."),
        )
    })?;

    Ok(Envelope::ok(task, "Get Task Successfully."))
}

/// Create task handler
///
/// Name and description are trimmed, escaped and capitalized before the
/// content-uniqueness check; two non-deleted tasks can never share the
/// same normalized name+description pair.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Json<Envelope<Task>>> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string(), "Create Task Failed."))?;

    let name = sanitize(&request.name);
    require_non_empty("Name", &name)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Create Task Failed."))?;

    let description = sanitize(&request.description);
    require_non_empty("Description", &description)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Create Task Failed."))?;

    let name = capitalize(&name);
    let description = capitalize(&description);

    if Task::find_by_content(&state.db, &name, &description)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(
            "This task is already existed.",
            "Create Task Failed.",
        ));
    }

    tracing::info!(task_name = %name, "Creating task");

    let task = Task::create(&state.db, CreateTask { name, description }).await?;

    Ok(Envelope::ok(task, "Create Task Successfully."))
}

/// Update task handler
///
/// Applies status and/or assignee in one operation. A body carrying
/// neither field is a validation error.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Envelope<Task>>> {
    let task_id = parse_id("Task Id", &id)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Update Task Failed."))?;

    if request.status.is_none() && request.assignee.is_none() {
        return Err(ApiError::bad_request(
            "Request body must contain status or assignee.",
            format!("Update Task With Id {task_id} Failed."),
        ));
    }

    let task = Task::find_by_id(&state.db, task_id).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("Task With Id {task_id} Not Found Or Task Was Deleted."),
            format!("Update Task With Id {task_id} Failed."),
        )
    })?;

    let mut update = UpdateTask::default();

    if let Some(raw_status) = request.status.as_deref() {
        let target: TaskStatus = sanitize(raw_status).parse().map_err(
            |e: taskboard_shared::query::QueryError| {
                ApiError::bad_request(
                    e.to_string(),
                    format!("Update Status To Task With Id {task_id} Failed."),
                )
            },
        )?;

        // Once a task is done, archive is the only accepted target.
        if !task.status.can_transition_to(target) {
            return Err(ApiError::illegal_transition(
                format!(
                    "Current Status of task With Id {task_id} is: [{}]. This task only accept status [{}] to update.",
                    task.status.as_str(),
                    TaskStatus::Archive.as_str(),
                ),
                format!("Update Status To Task With Id {task_id} Failed."),
            ));
        }

        update.status = Some(target);
    }

    if let Some(raw_assignee) = &request.assignee {
        update.assignee =
            Some(resolve_assignee(&state.db, task_id, raw_assignee.as_deref()).await?);
    }

    let updated = Task::update(&state.db, task_id, update).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("Task With Id {task_id} Not Found Or Task Was Deleted."),
            format!("Update Task With Id {task_id} Failed."),
        )
    })?;

    tracing::info!(
        task_id = %task_id,
        status = ?updated.status,
        assignee = ?updated.assignee,
        "Task updated"
    );

    Ok(Envelope::ok(
        updated,
        format!("Update Task With Id {task_id} Successfully."),
    ))
}

/// Resolves the requested assignee value to a user id or an explicit clear
///
/// Empty/null clears; otherwise the value must be a well-formed id naming
/// a non-deleted user.
async fn resolve_assignee(
    db: &PgPool,
    task_id: Uuid,
    raw: Option<&str>,
) -> Result<Option<Uuid>, ApiError> {
    let candidate = raw.map(sanitize).filter(|value| !value.is_empty());

    match candidate {
        None => Ok(None),
        Some(value) => {
            let assignee_id = parse_id("Assignee Id", &value).map_err(|e| {
                ApiError::bad_request(
                    e.to_string(),
                    format!("Update Assignee To Task With Id {task_id} Failed."),
                )
            })?;

            let user = User::find_by_id(db, assignee_id).await?.ok_or_else(|| {
                ApiError::not_found(
                    format!("Assignee With Id {assignee_id} Not Found Or Assignee Was Deleted."),
                    format!("Update Assignee To Task With Id {task_id} Failed."),
                )
            })?;

            Ok(Some(user.id))
        }
    }
}

/// Delete task handler
///
/// Soft-deletes: the record keeps its row but disappears from every read
/// path.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Task>>> {
    let task_id = parse_id("Task Id", &id)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Delete Task Failed."))?;

    let task = Task::soft_delete(&state.db, task_id).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("Task With Id {task_id} Not Found Or Task Was Deleted."),
            format!("Delete Task With Id {task_id} Failed."),
        )
    })?;

    tracing::info!(task_id = %task_id, "Task soft-deleted");

    Ok(Envelope::ok(
        task,
        format!("Delete Task With Id {task_id} Successfully."),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_absent_and_null_assignee() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        assert_eq!(absent.status.as_deref(), Some("done"));
        assert!(absent.assignee.is_none());

        let null: UpdateTaskRequest = serde_json::from_str(r#"{"assignee": null}"#).unwrap();
        assert_eq!(null.assignee, Some(None));

        let empty: UpdateTaskRequest = serde_json::from_str(r#"{"assignee": ""}"#).unwrap();
        assert_eq!(empty.assignee, Some(Some(String::new())));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"assignee": "550e8400-e29b-41d4-a716-446655440000"}"#)
                .unwrap();
        assert_eq!(
            set.assignee,
            Some(Some("550e8400-e29b-41d4-a716-446655440000".to_string()))
        );
    }

    #[test]
    fn test_create_request_length_bound() {
        let ok = CreateTaskRequest {
            name: "Fix bug".to_string(),
            description: "In prod".to_string(),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateTaskRequest {
            name: "a".repeat(256),
            description: "In prod".to_string(),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_list_data_serializes_camel_case() {
        let data = TaskListData {
            tasks: vec![],
            page: 1,
            total_pages: 0,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("total_pages").is_none());
    }
}
