use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domain::{CompletedFilter, NewTodo, Todo, TodoChanges, TodoId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub completed: Option<String>,
}

pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(query) = query?;
    let filter = CompletedFilter::from_query(query.completed.as_deref())?;

    let todos = state.repo.list(filter).await?;
    tracing::info!(filter = ?filter, count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(input) = payload?;
    let todo = Todo::create(input)?;

    let todo = state.repo.insert(&todo).await?;
    tracing::info!(todo_id = %todo.id, "Todo created");
    Ok(Json(todo))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = TodoId::parse(&id)?;

    let todo = state.repo.find(&id).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(todo_id = %todo.id, "Todo fetched");
    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoChanges>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = TodoId::parse(&id)?;
    let Json(input) = payload?;
    let changes = input.validate()?;

    let todo = state
        .repo
        .update(&id, &changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(todo_id = %todo.id, completed = todo.completed, "Todo updated");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TodoId::parse(&id)?;

    let deleted = state.repo.delete(&id).await?;
    tracing::info!(todo_id = %id, deleted, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fallback() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
