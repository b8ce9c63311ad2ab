/// User model and database operations
///
/// Users are the assignable side of the system: a task may hold a weak
/// reference to one user. Users are never hard-deleted; every read filters
/// the soft-delete flag.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('employee', 'manager');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'employee',
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
/// }).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use crate::query::{normalize_search, Page, PageParams, QueryError, RawParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Columns selected for every user read, in struct order
const USER_COLUMNS: &str = "id, name, role, is_deleted, created_at, updated_at";

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular employee (the creation-time default)
    #[default]
    Employee,

    /// Manager
    Manager,
}

impl UserRole {
    /// Converts role to string for messages and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Manager => "manager",
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID, assigned at creation, immutable
    pub id: Uuid,

    /// Display name, stored capitalized; unique among non-deleted employees
    pub name: String,

    /// Role (employee or manager)
    pub role: UserRole,

    /// Soft-delete flag; deleted users are invisible to every read path
    pub is_deleted: bool,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// The name must already be sanitized and capitalized; role always starts
/// as employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name (normalized)
    pub name: String,
}

/// Parsed list parameters for the user collection
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Pagination window
    pub page: PageParams,

    /// Normalized free-text search value
    pub search: Option<String>,
}

impl UserFilter {
    /// Query keys the user listing accepts; anything else fails the request
    pub const ALLOWED_KEYS: &'static [&'static str] = &["page", "limit", "search"];

    /// Parses raw query parameters into a filter
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] naming the offending key or value. Nothing
    /// touches the database before this succeeds.
    pub fn from_query(raw: &HashMap<String, String>) -> Result<Self, QueryError> {
        let params = RawParams::new(raw, Self::ALLOWED_KEYS)?;
        let page = PageParams::from_params(&params)?;
        let search = params.get("search").map(normalize_search);
        Ok(Self { page, search })
    }
}

/// Appends the WHERE clause for a user listing
///
/// Used by both the count query and the page query so the two always see
/// the same predicate.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a UserFilter) {
    builder.push(" WHERE is_deleted = FALSE");

    if let Some(search) = filter.search.as_deref() {
        builder
            .push(" AND to_tsvector('english', name || ' ' || role::text) @@ plainto_tsquery('english', ")
            .push_bind(search)
            .push(")");
    }
}

impl User {
    /// Creates a new user with the default employee role
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name)
            VALUES ($1)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a non-deleted user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a non-deleted employee by exact (normalized) name
    ///
    /// Backs the name-uniqueness check at user creation. The check and the
    /// subsequent insert are not atomic; see the concurrency notes in
    /// DESIGN.md.
    pub async fn find_employee_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE name = $1 AND role = 'employee' AND is_deleted = FALSE
            "#,
        ))
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists non-deleted users for a filter, newest first
    ///
    /// Returns the requested page and the total page count computed against
    /// the same predicate.
    pub async fn list(pool: &PgPool, filter: &UserFilter) -> Result<Page<Self>, sqlx::Error> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_query, filter);
        let matching: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut page_query =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filters(&mut page_query, filter);
        page_query.push(" ORDER BY created_at DESC");
        page_query.push(" LIMIT ").push_bind(filter.page.limit);
        page_query.push(" OFFSET ").push_bind(filter.page.offset());

        let items = page_query.build_query_as::<User>().fetch_all(pool).await?;

        Ok(Page {
            items,
            page: filter.page.page,
            total_pages: filter.page.total_pages(matching),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_role_default_is_employee() {
        assert_eq!(UserRole::default(), UserRole::Employee);
        assert_eq!(UserRole::Employee.as_str(), "employee");
        assert_eq!(UserRole::Manager.as_str(), "manager");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Employee).unwrap(), "\"employee\"");
        assert_eq!(serde_json::to_string(&UserRole::Manager).unwrap(), "\"manager\"");
    }

    #[test]
    fn test_filter_rejects_unknown_key() {
        let raw = map(&[("sort_by", "createdAt")]);
        let err = UserFilter::from_query(&raw).unwrap_err();
        assert_eq!(err.to_string(), "Query key [sort_by] is not allowed");
    }

    #[test]
    fn test_filter_normalizes_search() {
        let raw = map(&[("search", "  Alice "), ("page", "2")]);
        let filter = UserFilter::from_query(&raw).unwrap();
        assert_eq!(filter.search.as_deref(), Some("alice"));
        assert_eq!(filter.page.page, 2);
        assert_eq!(filter.page.limit, 10);
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: Uuid::nil(),
            name: "Alice".to_string(),
            role: UserRole::Employee,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["isDeleted"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("is_deleted").is_none());
    }
}
