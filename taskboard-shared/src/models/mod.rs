/// Database models for Taskboard
///
/// This module contains both entities and their database operations.
///
/// # Models
///
/// - `task`: Tasks with status state machine and assignment
/// - `user`: Users that tasks can be assigned to
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
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
