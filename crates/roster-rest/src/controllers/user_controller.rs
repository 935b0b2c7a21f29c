//! User management controller.

use crate::{
    extractors::JsonBody,
    responses::{ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use roster_core::{ErrorResponse, NewUser, RosterError, User, UserId};
use roster_service::UserList;
use tracing::debug;

/// Header reporting whether a listing came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Body returned by a successful delete.
pub const DELETED_MESSAGE: &str = "User deleted";

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/import", post(import_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// List all users.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [User],
            headers(("x-cache" = String, description = "HIT when served from the cache, else MISS"))),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, AppError> {
    debug!("List users request");

    let list = state.user_service.list_users().await?;
    Ok(raw_json_list(list))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 200, description = "Created user with its assigned id", body = User),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 409, description = "Constraint violation", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(user): JsonBody<NewUser>,
) -> ApiResult<User> {
    debug!("Create user request: {} {}", user.name, user.surname);

    let created = state.user_service.create_user(user).await?;
    ok(created)
}

/// Get a user by ID.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    debug!("Get user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let user = state.user_service.get_user(user_id).await?;
    ok(user)
}

/// Overwrite a user's fields.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = NewUser,
    responses(
        (status = 200, description = "Submitted fields echoed back with the path id", body = User),
        (status = 400, description = "Malformed id or body", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(user): JsonBody<NewUser>,
) -> ApiResult<User> {
    debug!("Update user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let updated = state.user_service.update_user(user_id, user).await?;
    ok(updated)
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Confirmation string", body = String),
        (status = 400, description = "Id is not an integer", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    debug!("Delete user request: {}", id);

    let user_id = parse_user_id(&id)?;
    state.user_service.delete_user(user_id).await?;
    ok(DELETED_MESSAGE)
}

/// Bulk-create users.
#[utoipa::path(
    post,
    path = "/users/import",
    tag = "users",
    request_body = [NewUser],
    responses(
        (status = 200, description = "Submitted users with their assigned ids", body = [User]),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 409, description = "Import aborted on a constraint violation; `details.committed` rows were kept", body = ErrorResponse)
    )
)]
pub async fn import_users(
    State(state): State<AppState>,
    JsonBody(users): JsonBody<Vec<NewUser>>,
) -> ApiResult<Vec<User>> {
    debug!("Import request with {} users", users.len());

    let imported = state.user_service.import_users(users).await?;
    ok(imported)
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw)
        .map_err(|e| AppError(RosterError::validation(format!("Invalid user id '{}': {}", raw, e))))
}

/// Writes the serialized collection as-is, so a cache hit is never re-encoded.
fn raw_json_list(list: UserList) -> Response {
    let cache_status = if list.is_cache_hit() { "HIT" } else { "MISS" };
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (X_CACHE, HeaderValue::from_static(cache_status)),
        ],
        list.body,
    )
        .into_response()
}
