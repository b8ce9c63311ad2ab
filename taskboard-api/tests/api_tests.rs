/// Integration tests for the Taskboard API
///
/// These tests verify the full system works end-to-end against a real
/// PostgreSQL database:
/// - Input normalization at creation (capitalize, trim/escape)
/// - Content-uniqueness conflicts
/// - The done → archive status rule
/// - Assignment (set, clear, malformed, unknown user)
/// - List allow-lists and pagination math
/// - Soft-delete visibility
///
/// They are `#[ignore]`d by default; run them with a configured
/// `DATABASE_URL` via `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_create_task_normalizes_input() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "fix bug", "description": "in prod"})),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Fix bug");
    assert_eq!(body["data"]["description"], "In prod");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["isDeleted"], false);
    assert_eq!(body["data"]["assignee"], serde_json::Value::Null);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_task_content_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let payload = json!({"name": "fix bug", "description": "in prod"});
    let (status, _) = ctx.send("POST", "/tasks", Some(payload)).await.unwrap();
    assert_eq!(status, StatusCode::OK);

    // Same content after normalization, different casing
    let (status, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "FIX BUG", "description": "In Prod"})),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], serde_json::Value::Null);
    assert_eq!(body["message"], "This task is already existed.");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_done_status_only_accepts_archive() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "ship release", "description": "v1"})),
        )
        .await
        .unwrap();
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .send("PUT", &format!("/tasks/{task_id}"), Some(json!({"status": "done"})))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    // done → working is rejected and the status stays put
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"status": "working"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = ctx
        .send("GET", &format!("/tasks/{task_id}"), None)
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "done");

    // done → archive is accepted
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"status": "archive"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archive");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_assignee_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (_, body) = ctx
        .send("POST", "/users", Some(json!({"name": "alice"})))
        .await
        .unwrap();
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "triage", "description": "inbox"})),
        )
        .await
        .unwrap();
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    // Assign
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"assignee": user_id})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignee"], user_id.as_str());

    // Malformed id fails validation before any lookup
    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"assignee": "not-a-uuid"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Well-formed but unknown id is not found
    let (status, _) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"assignee": "550e8400-e29b-41d4-a716-446655440000"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Empty value clears the assignment
    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/tasks/{task_id}"),
            Some(json!({"assignee": ""})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignee"], serde_json::Value::Null);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_list_tasks_rejects_unknown_key() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/tasks?priority=high", None).await.unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Query key [priority] is not allowed");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_list_tasks_pagination() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    for i in 0..7 {
        let (status, _) = ctx
            .send(
                "POST",
                "/tasks",
                Some(json!({"name": format!("task {i}"), "description": "batch"})),
            )
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx.send("GET", "/tasks?page=2&limit=3", None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["totalPages"], 3);
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 3);

    let (_, body) = ctx.send("GET", "/tasks?page=3&limit=3", None).await.unwrap();
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_create_user_capitalizes_and_rejects_duplicate() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (status, body) = ctx
        .send("POST", "/users", Some(json!({"name": "alice"})))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["role"], "employee");

    // Any casing of the same name collides after normalization
    let (status, body) = ctx
        .send("POST", "/users", Some(json!({"name": "ALICE"})))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Name value is already exist. You should choose another name."
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_soft_deleted_task_disappears() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "obsolete", "description": "cleanup"})),
        )
        .await
        .unwrap();
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send("DELETE", &format!("/tasks/{task_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isDeleted"], true);

    // Gone from reads, deleting twice is not found
    let (status, _) = ctx
        .send("GET", &format!("/tasks/{task_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send("DELETE", &format!("/tasks/{task_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = ctx.send("GET", "/tasks", None).await.unwrap();
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_user_tasks_are_populated() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (_, body) = ctx
        .send("POST", "/users", Some(json!({"name": "bob"})))
        .await
        .unwrap();
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "review pr", "description": "backend"})),
        )
        .await
        .unwrap();
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    ctx.send(
        "PUT",
        &format!("/tasks/{task_id}"),
        Some(json!({"assignee": user_id})),
    )
    .await
    .unwrap();

    let (status, body) = ctx
        .send("GET", &format!("/users/tasks/{user_id}"), None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], user_id.as_str());

    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    // The assignee reference comes back as the full user record
    assert_eq!(tasks[0]["assignee"]["id"], user_id.as_str());
    assert_eq!(tasks[0]["assignee"]["name"], "Bob");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_status_filter_and_search() {
    let ctx = TestContext::new().await.unwrap();
    ctx.cleanup().await.unwrap();

    let (_, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"name": "deploy service", "description": "production rollout"})),
        )
        .await
        .unwrap();
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    ctx.send(
        "POST",
        "/tasks",
        Some(json!({"name": "write docs", "description": "api reference"})),
    )
    .await
    .unwrap();

    ctx.send(
        "PUT",
        &format!("/tasks/{task_id}"),
        Some(json!({"status": "working"})),
    )
    .await
    .unwrap();

    let (_, body) = ctx.send("GET", "/tasks?status=working", None).await.unwrap();
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id.as_str());

    let (_, body) = ctx.send("GET", "/tasks?search=ROLLOUT", None).await.unwrap();
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id.as_str());

    ctx.cleanup().await.unwrap();
}
