use crate::{
    auth::{AdminUser, CurrentUser},
    dtos::space::AvailabilityParams,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::space::SpaceService;
use models::space::{Availability, NewSpace, Space, SpaceChanges};

/// Every space, active or not
#[utoipa::path(
    get,
    path = "/spaces/",
    responses((status = 200, description = "All spaces", body = Vec<Space>)),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<Space>>, AppError> {
    Ok(Json(SpaceService::list(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/spaces/",
    request_body = NewSpace,
    responses(
        (status = 201, description = "Space created", body = Space),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn create(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiJson(new): ApiJson<NewSpace>,
) -> Result<(StatusCode, Json<Space>), AppError> {
    let space = SpaceService::create(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(space)))
}

#[utoipa::path(
    get,
    path = "/spaces/{id}/",
    params(("id" = i32, Path, description = "Space ID")),
    responses(
        (status = 200, description = "Space found", body = Space),
        (status = 404, description = "Space not found")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Space>, AppError> {
    Ok(Json(SpaceService::find(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/spaces/{id}/",
    params(("id" = i32, Path, description = "Space ID")),
    request_body = SpaceChanges,
    responses(
        (status = 200, description = "Space updated", body = Space),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<SpaceChanges>,
) -> Result<Json<Space>, AppError> {
    Ok(Json(SpaceService::update(&state.db, id, changes).await?))
}

#[utoipa::path(
    put,
    path = "/spaces/{id}/",
    params(("id" = i32, Path, description = "Space ID")),
    request_body = SpaceChanges,
    responses(
        (status = 200, description = "Space updated", body = Space),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn replace(
    state: State<AppState>,
    admin: AdminUser,
    id: ApiPath<i32>,
    changes: ApiJson<SpaceChanges>,
) -> Result<Json<Space>, AppError> {
    update(state, admin, id, changes).await
}

/// Refused while any reservation still points at the space
#[utoipa::path(
    delete,
    path = "/spaces/{id}/",
    params(("id" = i32, Path, description = "Space ID")),
    responses(
        (status = 204, description = "Space deleted"),
        (status = 400, description = "Space has reservations"),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    SpaceService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pending and approved blocks of the space within `[start, end)`
#[utoipa::path(
    get,
    path = "/spaces/{id}/availability/",
    params(("id" = i32, Path, description = "Space ID"), AvailabilityParams),
    responses(
        (status = 200, description = "Busy blocks", body = Availability),
        (status = 400, description = "Missing or inverted range"),
        (status = 404, description = "Space not found")
    ),
    security(("jwt" = [])),
    tag = "Spaces"
)]
pub async fn availability(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<AvailabilityParams>,
) -> Result<Json<Availability>, AppError> {
    let (start, end) = params.window(&state.config.utc_offset)?;
    Ok(Json(SpaceService::availability(&state.db, id, start, end).await?))
}
