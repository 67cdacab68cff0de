//! Task API endpoints
//!
//! RESTful API for owner-scoped task CRUD. Create and update accept either a
//! JSON body or a multipart form carrying the same text fields plus an
//! optional `taskImage` file.

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tt_core::task::{parse_date, Task, TaskQuery, TaskRepository, TaskUpdate};
use tt_core::Error as CoreError;

use crate::auth::resolve_user_identity;
use crate::state::AppState;
use crate::upload::UploadError;

/// Multipart field name carrying the uploaded image
const IMAGE_FIELD: &str = "taskImage";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub description: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Allow-listed PATCH body. Any key outside this set fails the whole
/// request before the store is touched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Raw listing parameters; parsing into a [`TaskQuery`] is deliberately
/// lenient, so every field arrives as text.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default, rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub skip: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteManyRequest {
    pub tasks: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub date: String,
    pub owner: String,
    pub image_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            description: task.description,
            completed: task.completed,
            date: task.date.to_rfc3339(),
            owner: task.owner,
            image_path: task.image_path,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteManyResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Error helpers
// ============================================================================

fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

fn not_found(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, error)
}

fn map_store_error(err: CoreError) -> RouteError {
    match err {
        CoreError::InvalidInput(msg) => bad_request(msg),
        CoreError::TaskNotFound(id) => not_found(format!("Task {} not found", id)),
        other => route_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn map_upload_error(err: UploadError) -> RouteError {
    if err.is_client_error() {
        bad_request(err.to_string())
    } else {
        route_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

// ============================================================================
// Body parsing
// ============================================================================

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, RouteError> {
    field
        .text()
        .await
        .map_err(|err| bad_request(format!("Invalid form field: {}", err)))
}

fn parse_bool_field(raw: &str) -> Result<bool, RouteError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(bad_request("Completed must be \"true\" or \"false\"")),
    }
}

/// Validate and store an uploaded image field, returning its storage path.
async fn store_image_field(
    state: &AppState,
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, RouteError> {
    let original_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| bad_request("Image upload must have a filename"))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|err| bad_request(format!("Invalid image upload: {}", err)))?;

    state
        .image_store()
        .save(IMAGE_FIELD, &original_name, &bytes)
        .await
        .map_err(map_upload_error)
}

/// Parse a multipart create form. Unknown text fields are ignored, matching
/// the behaviour of the JSON path.
async fn create_input_from_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(CreateTaskRequest, Option<String>), RouteError> {
    let mut description: Option<String> = None;
    let mut completed: Option<bool> = None;
    let mut date: Option<DateTime<Utc>> = None;
    let mut image_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(format!("Invalid multipart payload: {}", err)))?
    {
        match field.name() {
            Some("description") => description = Some(read_text_field(field).await?),
            Some("completed") => {
                let raw = read_text_field(field).await?;
                completed = Some(parse_bool_field(&raw)?);
            }
            Some("date") => {
                let raw = read_text_field(field).await?;
                date = Some(
                    parse_date(&raw).ok_or_else(|| bad_request("Invalid date value"))?,
                );
            }
            Some(IMAGE_FIELD) => image_path = Some(store_image_field(state, field).await?),
            _ => {}
        }
    }

    let description = description.ok_or_else(|| bad_request("Description is required"))?;
    Ok((
        CreateTaskRequest {
            description,
            completed,
            date,
        },
        image_path,
    ))
}

/// Parse a multipart update form, enforcing the update allow-list: any text
/// field outside `{description, completed, imagePath}` rejects the request.
async fn update_input_from_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(UpdateTaskRequest, Option<String>), RouteError> {
    let mut body = UpdateTaskRequest::default();
    let mut uploaded: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(format!("Invalid multipart payload: {}", err)))?
    {
        match field.name() {
            Some("description") => body.description = Some(read_text_field(field).await?),
            Some("completed") => {
                let raw = read_text_field(field).await?;
                body.completed = Some(parse_bool_field(&raw)?);
            }
            Some("imagePath") => body.image_path = Some(read_text_field(field).await?),
            Some(IMAGE_FIELD) => uploaded = Some(store_image_field(state, field).await?),
            _ => return Err(bad_request("Invalid updates")),
        }
    }

    Ok((body, uploaded))
}

async fn json_body<T: serde::de::DeserializeOwned>(request: Request) -> Result<T, RouteError> {
    Json::<T>::from_request(request, &())
        .await
        .map(|Json(body)| body)
        .map_err(|err| bad_request(err.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<TaskResponse>), RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;

    let (body, image_path) = if is_multipart(&headers) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|err| bad_request(err.to_string()))?;
        create_input_from_multipart(&state, multipart).await?
    } else {
        (json_body::<CreateTaskRequest>(request).await?, None)
    };

    // Owner always comes from the verified identity, never the body
    let mut task = Task::new(identity.user_id, &body.description).map_err(map_store_error)?;
    if let Some(completed) = body.completed {
        task = task.with_completed(completed);
    }
    if let Some(date) = body.date {
        task = task.with_date(date);
    }
    if let Some(path) = image_path {
        task = task.with_image_path(path);
    }

    let created = state.task_store().create(task).await.map_err(map_store_error)?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /tasks - List the requester's tasks with filter/sort/pagination
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;

    let query = TaskQuery::from_raw(
        params.completed.as_deref(),
        params.from_date.as_deref(),
        params.to_date.as_deref(),
        params.sort_by.as_deref(),
        params.limit.as_deref(),
        params.skip.as_deref(),
    );

    let tasks = state
        .task_store()
        .list(&identity.user_id, &query)
        .await
        .map_err(map_store_error)?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// GET /tasks/:id - Get a single owned task
async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;

    let task = state
        .task_store()
        .get(&identity.user_id, id)
        .await
        .map_err(map_store_error)?;

    match task {
        Some(task) => Ok(Json(TaskResponse::from(task))),
        None => Err(not_found(format!("Task {} not found", id))),
    }
}

/// PATCH /tasks/:id - Update an owned task through the field allow-list
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    request: Request,
) -> Result<Json<TaskResponse>, RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;

    let (body, uploaded) = if is_multipart(&headers) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|err| bad_request(err.to_string()))?;
        update_input_from_multipart(&state, multipart).await?
    } else {
        (json_body::<UpdateTaskRequest>(request).await?, None)
    };

    // A freshly uploaded file wins over a body-supplied imagePath
    let update = TaskUpdate {
        description: body.description,
        completed: body.completed,
        image_path: uploaded.or(body.image_path),
    };

    let updated = state
        .task_store()
        .update(&identity.user_id, id, &update)
        .await
        .map_err(map_store_error)?;

    match updated {
        Some(task) => Ok(Json(TaskResponse::from(task))),
        None => Err(not_found(format!("Task {} not found", id))),
    }
}

/// DELETE /tasks/:id - Delete an owned task, returning the removed record
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;

    let removed = state
        .task_store()
        .delete(&identity.user_id, id)
        .await
        .map_err(map_store_error)?;

    match removed {
        Some(task) => Ok(Json(TaskResponse::from(task))),
        None => Err(not_found(format!("Task {} not found", id))),
    }
}

/// POST /delete-multi-tasks - Delete a batch of owned tasks by id
async fn delete_many_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Json<DeleteManyResponse>, RouteError> {
    let identity = resolve_user_identity(&headers).map_err(unauthorized)?;
    let body = json_body::<DeleteManyRequest>(request).await?;

    let deleted_count = state
        .task_store()
        .delete_many(&identity.user_id, &body.tasks)
        .await
        .map_err(map_store_error)?;

    Ok(Json(DeleteManyResponse { deleted_count }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/delete-multi-tasks", post(delete_many_tasks))
}
