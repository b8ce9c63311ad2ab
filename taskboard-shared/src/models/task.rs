/// Task model and database operations
///
/// Tasks are the core entity of the system. A task carries a status driven
/// by a small state machine and an optional weak reference to the user it
/// is assigned to.
///
/// # State Machine
///
/// ```text
/// pending ⇄ working ⇄ review ⇄ done
/// done → archive (only)
/// any state → archive
/// ```
///
/// Every status may move to any of the five values, with one exception:
/// once a task is `done`, the only accepted target is `archive`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'pending', 'working', 'review', 'done', 'archive'
/// );
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     assignee UUID REFERENCES users(id) ON DELETE SET NULL,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     name: "Fix bug".to_string(),
///     description: "In prod".to_string(),
/// }).await?;
///
/// // Move it through the board
/// Task::update(&pool, task.id, UpdateTask {
///     status: Some(TaskStatus::Working),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use crate::models::user::User;
use crate::query::{normalize_search, Page, PageParams, QueryError, RawParams, SortOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Columns selected for every task read, in struct order
const TASK_COLUMNS: &str =
    "id, name, description, status, assignee, is_deleted, created_at, updated_at";

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is on the backlog (the creation-time default)
    Pending,

    /// Task is being worked on
    Working,

    /// Task is waiting for review
    Review,

    /// Task is finished; only `archive` is accepted from here
    Done,

    /// Task is archived
    Archive,
}

impl TaskStatus {
    /// Converts status to string for messages and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Working => "working",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Archive => "archive",
        }
    }

    /// Checks if transition to target status is valid
    ///
    /// `done` accepts only `archive`; every other status accepts any of the
    /// five values.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match self {
            TaskStatus::Done => target == TaskStatus::Archive,
            _ => true,
        }
    }
}

impl FromStr for TaskStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "working" => Ok(TaskStatus::Working),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            "archive" => Ok(TaskStatus::Archive),
            _ => Err(QueryError::NotInAllowList {
                field: "Status",
                allowed: "pending, working, review, done, archive",
            }),
        }
    }
}

/// Sortable columns for the task listing
///
/// The allow-list uses wire names; anything else fails the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    /// Sort by creation time (wire name `createdAt`)
    CreatedAt,

    /// Sort by last update time (wire name `updatedAt`)
    UpdatedAt,
}

impl TaskSortField {
    /// Column name this field sorts on
    pub fn column(&self) -> &'static str {
        match self {
            TaskSortField::CreatedAt => "created_at",
            TaskSortField::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for TaskSortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(TaskSortField::CreatedAt),
            "updatedAt" => Ok(TaskSortField::UpdatedAt),
            _ => Err(QueryError::NotInAllowList {
                field: "Sort",
                allowed: "createdAt, updatedAt",
            }),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID, assigned at creation, immutable
    pub id: Uuid,

    /// Short name, stored capitalized
    pub name: String,

    /// Longer description, stored capitalized
    pub description: String,

    /// Current board status
    pub status: TaskStatus,

    /// Weak reference to the assigned user (None = unassigned)
    pub assignee: Option<Uuid>,

    /// Soft-delete flag; deleted tasks are invisible to every read path
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task with its assignee reference resolved to the full user record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAssignee {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,

    /// The resolved user this task is assigned to
    pub assignee: Option<User>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskWithAssignee {
    /// Populates a task's assignee with an already-loaded user
    pub fn populate(task: Task, assignee: Option<User>) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            status: task.status,
            assignee,
            is_deleted: task.is_deleted,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Input for creating a new task
///
/// Name and description must already be sanitized and capitalized; status
/// always starts as pending, unassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Short name (normalized)
    pub name: String,

    /// Longer description (normalized)
    pub description: String,
}

/// Input for updating a task
///
/// Only non-None fields are written. For `assignee`, use `Some(None)` to
/// clear the assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New status (already authorized by the state machine)
    pub status: Option<TaskStatus>,

    /// New assignee (use Some(None) to clear)
    pub assignee: Option<Option<Uuid>>,
}

/// Parsed list parameters for the task collection
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Pagination window
    pub page: PageParams,

    /// Status filter
    pub status: Option<TaskStatus>,

    /// Normalized free-text search value
    pub search: Option<String>,

    /// Explicit sort; None falls back to `created_at DESC`
    pub sort: Option<(TaskSortField, SortOrder)>,
}

impl TaskFilter {
    /// Query keys the task listing accepts; anything else fails the request
    pub const ALLOWED_KEYS: &'static [&'static str] =
        &["page", "limit", "status", "search", "sort_by", "order_by"];

    /// Parses raw query parameters into a filter
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] naming the offending key or value. Nothing
    /// touches the database before this succeeds.
    pub fn from_query(raw: &HashMap<String, String>) -> Result<Self, QueryError> {
        let params = RawParams::new(raw, Self::ALLOWED_KEYS)?;
        let page = PageParams::from_params(&params)?;

        let status = params.get("status").map(TaskStatus::from_str).transpose()?;
        let search = params.get("search").map(normalize_search);

        // order_by only has meaning alongside sort_by; unrecognized
        // directions fall back to descending.
        let sort = params
            .get("sort_by")
            .map(|field| -> Result<_, QueryError> {
                Ok((
                    TaskSortField::from_str(field)?,
                    SortOrder::parse(params.get("order_by")),
                ))
            })
            .transpose()?;

        Ok(Self {
            page,
            status,
            search,
            sort,
        })
    }

    /// Effective ordering for the page query
    pub fn order_clause(&self) -> (&'static str, SortOrder) {
        match self.sort {
            Some((field, order)) => (field.column(), order),
            None => ("created_at", SortOrder::Desc),
        }
    }
}

/// Appends the WHERE clause for a task listing
///
/// Used by both the count query and the page query so the two always see
/// the same predicate.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a TaskFilter) {
    builder.push(" WHERE is_deleted = FALSE");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }

    if let Some(search) = filter.search.as_deref() {
        // Must match the expression behind tasks_text_idx.
        builder
            .push(" AND to_tsvector('english', name || ' ' || description || ' ' || status::text) @@ plainto_tsquery('english', ")
            .push_bind(search)
            .push(")");
    }
}

impl Task {
    /// Creates a new task in pending state, unassigned
    ///
    /// Content uniqueness is checked by the caller via
    /// [`Task::find_by_content`] before this runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (name, description)
            VALUES ($1, $2)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a non-deleted task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a non-deleted task with the same normalized name+description
    ///
    /// Tasks are unique by content, not by identity. The check and the
    /// subsequent insert are not atomic; see the concurrency notes in
    /// DESIGN.md.
    pub async fn find_by_content(
        pool: &PgPool,
        name: &str,
        description: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE name = $1 AND description = $2 AND is_deleted = FALSE
            "#,
        ))
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists non-deleted tasks for a filter
    ///
    /// Returns the requested page and the total page count computed against
    /// the same predicate. The count and page queries run back to back
    /// without a transaction, so the two are best-effort consistent.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Page<Self>, sqlx::Error> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM tasks");
        push_filters(&mut count_query, filter);
        let matching: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let (column, order) = filter.order_clause();
        let mut page_query =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_filters(&mut page_query, filter);
        page_query.push(format!(" ORDER BY {} {}", column, order.as_sql()));
        page_query.push(" LIMIT ").push_bind(filter.page.limit);
        page_query.push(" OFFSET ").push_bind(filter.page.offset());

        let items = page_query.build_query_as::<Task>().fetch_all(pool).await?;

        Ok(Page {
            items,
            page: filter.page.page,
            total_pages: filter.page.total_pages(matching),
        })
    }

    /// Lists all non-deleted tasks assigned to a user, newest first
    pub async fn list_by_assignee(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE assignee = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a status and/or assignee update to a non-deleted task
    ///
    /// Only the fields present in `data` are written; `updated_at` always
    /// advances. The change persists immediately.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no non-deleted task has this ID
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(assignee) = data.assignee {
            // None binds SQL NULL, clearing the assignment.
            query.push(", assignee = ").push_bind(assignee);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(" AND is_deleted = FALSE");
        query.push(format!(" RETURNING {TASK_COLUMNS}"));

        let task = query.build_query_as::<Task>().fetch_optional(pool).await?;

        Ok(task)
    }

    /// Soft-deletes a task
    ///
    /// Sets the flag and advances `updated_at`; the record stays in storage
    /// but disappears from every read path.
    ///
    /// # Returns
    ///
    /// The soft-deleted task, or None if no non-deleted task has this ID
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE,
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}
