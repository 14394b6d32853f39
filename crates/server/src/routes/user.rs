use crate::{
    auth::AdminUser,
    error::AppError,
    extract::{ApiJson, ApiPath},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::user::UserService;
use models::user::{NewUser, User, UserChanges};

#[utoipa::path(
    get,
    path = "/users/",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn list(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(UserService::list(&state.db).await?))
}

/// Creates an account; the password is stored hashed
#[utoipa::path(
    post,
    path = "/users/",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Duplicate email or missing password"),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn create(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiJson(new): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/users/{id}/",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn detail(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::find(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserChanges,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Duplicate email")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<UserChanges>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::update(&state.db, id, changes).await?))
}

#[utoipa::path(
    put,
    path = "/users/{id}/",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserChanges,
    responses((status = 200, description = "User updated", body = User)),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn replace(
    state: State<AppState>,
    admin: AdminUser,
    id: ApiPath<i32>,
    changes: ApiJson<UserChanges>,
) -> Result<Json<User>, AppError> {
    update(state, admin, id, changes).await
}

/// Deactivates the account instead of deleting it
#[utoipa::path(
    delete,
    path = "/users/{id}/",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    UserService::deactivate(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
