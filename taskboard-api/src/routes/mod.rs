/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task endpoints (list, get, create, update, delete)
/// - `users`: User endpoints (list, get, create, assigned tasks)

pub mod health;
pub mod tasks;
pub mod users;
