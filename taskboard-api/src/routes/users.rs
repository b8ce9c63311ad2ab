/// User endpoints
///
/// # Endpoints
///
/// ```text
/// GET  /users            # List users (page, limit, search)
/// POST /users            # Create user {name}
/// GET  /users/:id        # Get user by id
/// GET  /users/tasks/:id  # All tasks assigned to a user
/// ```
///
/// User names are unique among non-deleted employees. The check runs at
/// validation time, not at the storage layer; see the concurrency notes in
/// DESIGN.md.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taskboard_shared::models::task::{Task, TaskWithAssignee};
use taskboard_shared::models::user::{CreateUser, User, UserFilter};
use taskboard_shared::validation::{capitalize, parse_id, require_non_empty, sanitize};
use validator::Validate;

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name, unique among non-deleted employees
    #[validate(length(max = 255, message = "Name value must be at most 255 characters"))]
    pub name: String,
}

/// List response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListData {
    pub users: Vec<User>,
    pub page: i64,
    pub total_pages: i64,
}

/// Assigned-tasks response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTasksData {
    /// The user's tasks, each with the assignee reference resolved
    pub tasks: Vec<TaskWithAssignee>,

    /// The user itself
    pub user: User,
}

/// List users handler
pub async fn list_users(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<UserListData>>> {
    let filter = UserFilter::from_query(&raw)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Get User List Failed."))?;

    let page = User::list(&state.db, &filter).await?;

    Ok(Envelope::ok(
        UserListData {
            users: page.items,
            page: page.page,
            total_pages: page.total_pages,
        },
        "Get User List Successfully!",
    ))
}

/// Get user by id handler
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<User>>> {
    let user_id = parse_id("User Id", &id)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Get User By Id Failed."))?;

    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("User With Id {user_id} Not Found Or User Was Deleted."),
            format!("Get User By Id {user_id} Failed."),
        )
    })?;

    Ok(Envelope::ok(user, "Get User Successfully."))
}

/// Create user handler
///
/// The name is trimmed, escaped and capitalized, then checked for
/// uniqueness among non-deleted employees before the insert.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<Json<Envelope<User>>> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string(), "Create User Failed."))?;

    let name = sanitize(&request.name);
    require_non_empty("Name", &name)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Create User Failed."))?;

    let name = capitalize(&name);

    if User::find_employee_by_name(&state.db, &name).await?.is_some() {
        return Err(ApiError::conflict(
            "Name value is already exist. You should choose another name.",
            "Create User Failed.",
        ));
    }

    tracing::info!(user_name = %name, "Creating user");

    let user = User::create(&state.db, CreateUser { name }).await?;

    Ok(Envelope::ok(user, "Create User Successfully."))
}

/// Assigned-tasks handler
///
/// Returns every non-deleted task assigned to the user, with the assignee
/// reference resolved to the full user record.
pub async fn list_user_tasks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<UserTasksData>>> {
    let user_id = parse_id("User Id", &id)
        .map_err(|e| ApiError::bad_request(e.to_string(), "Get All Tasks By User Id Failed."))?;

    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        ApiError::not_found(
            format!("User With Id {user_id} Not Found Or User Was Deleted."),
            format!("Get All Tasks By User Id {user_id} Failed."),
        )
    })?;

    let tasks = Task::list_by_assignee(&state.db, user_id)
        .await?
        .into_iter()
        .map(|task| TaskWithAssignee::populate(task, Some(user.clone())))
        .collect();

    Ok(Envelope::ok(
        UserTasksData { tasks, user },
        "Get All Tasks By User Successfully!",
    ))
}
