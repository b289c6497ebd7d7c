//! Todo route handlers.
//!
//! Each handler runs the same sequence: the body and path are extracted
//! first (a malformed body never costs a token), then one token is taken
//! from the shared bucket, then the upstream client validates and forwards.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::http::request::TodoBody;
use crate::http::response::{GatewayError, Message};
use crate::http::server::AppState;
use crate::upstream::Todo;

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, GatewayError> {
    state.admit("list_todos")?;
    let todos = state.upstream.fetch_all().await?;
    tracing::debug!(count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

/// `GET /todos/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, GatewayError> {
    state.admit("get_todo")?;
    let todo = state.upstream.fetch_one(&id).await?;
    Ok(Json(todo))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    body: TodoBody,
) -> Result<Json<Todo>, GatewayError> {
    state.admit("create_todo")?;
    let todo = state.upstream.create(body.into_payload()).await?;
    tracing::info!(id = todo.id, user_id = todo.user_id, "Todo created");
    Ok(Json(todo))
}

/// `PUT /todos` with the id in the body.
pub async fn update_todo(
    State(state): State<AppState>,
    body: TodoBody,
) -> Result<Json<Todo>, GatewayError> {
    update(state, None, body).await
}

/// `PUT /todos/{id}`
pub async fn update_todo_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: TodoBody,
) -> Result<Json<Todo>, GatewayError> {
    update(state, Some(id), body).await
}

async fn update(state: AppState, id: Option<String>, body: TodoBody) -> Result<Json<Todo>, GatewayError> {
    state.admit("update_todo")?;
    let todo = state
        .upstream
        .update(id.as_deref(), body.into_payload())
        .await?;
    tracing::info!(id = todo.id, "Todo updated");
    Ok(Json(todo))
}

/// `DELETE /todos` with `{"id": ...}` in the body.
pub async fn delete_todo(
    State(state): State<AppState>,
    body: TodoBody,
) -> Result<Message, GatewayError> {
    delete(state, None, body).await
}

/// `DELETE /todos/{id}`
pub async fn delete_todo_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: TodoBody,
) -> Result<Message, GatewayError> {
    delete(state, Some(id), body).await
}

async fn delete(state: AppState, id: Option<String>, body: TodoBody) -> Result<Message, GatewayError> {
    state.admit("delete_todo")?;
    let id = state.upstream.delete(id.as_deref(), body.0.as_ref()).await?;
    tracing::info!(id, "Todo deleted");
    Ok(Message::new(format!("Todo {id} deleted successfully")))
}
