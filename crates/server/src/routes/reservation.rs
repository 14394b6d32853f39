use crate::{
    auth::{AdminUser, CurrentUser},
    dtos::reservation::{RangeParams, ReportParams},
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    report::{ReportMeta, render_report},
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::IntoResponse,
};
use chrono::Utc;
use database::services::{
    ServiceError, reservation::ReservationService, space::SpaceService,
};
use models::reservation::{
    Decision, NewReservation, Reservation, ReservationChanges, ReservationStatus,
};

/// Reservations intersecting a time window
///
/// Admins see every status; everyone else only sees pending and approved ones.
#[utoipa::path(
    get,
    path = "/reservations/",
    params(RangeParams),
    responses(
        (status = 200, description = "Reservations in the window, newest first", body = Vec<Reservation>),
        (status = 400, description = "Bad dates")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let (start, end) = params.window(Utc::now(), &state.config.utc_offset)?;
    let active = ReservationStatus::ACTIVE;
    let statuses = (!user.is_admin()).then_some(active.as_slice());

    let reservations =
        ReservationService::list(&state.db, start, end, params.space(), statuses).await?;
    Ok(Json(reservations))
}

/// Every reservation of the caller, all statuses, newest first
#[utoipa::path(
    get,
    path = "/reservations/mine/",
    params(RangeParams),
    responses(
        (status = 200, description = "Own reservations", body = Vec<Reservation>)
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let range = params.mine_window(Utc::now(), &state.config.utc_offset)?;
    Ok(Json(ReservationService::mine(&state.db, user.id, range).await?))
}

/// Requests a space; the reservation starts out pending
#[utoipa::path(
    post,
    path = "/reservations/",
    request_body = NewReservation,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Invalid duration, unknown space or overlap")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(new): ApiJson<NewReservation>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation =
        ReservationService::create(&state.db, &user, new, &state.booking_rules()).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[utoipa::path(
    get,
    path = "/reservations/{id}/",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation found", body = Reservation),
        (status = 404, description = "Reservation not found")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(ReservationService::find(&state.db, id).await?))
}

/// Admin edit; changing the dates re-checks duration and overlap
#[utoipa::path(
    patch,
    path = "/reservations/{id}/",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = ReservationChanges,
    responses(
        (status = 200, description = "Reservation updated", body = Reservation),
        (status = 400, description = "Invalid duration or overlap"),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<ReservationChanges>,
) -> Result<Json<Reservation>, AppError> {
    let reservation =
        ReservationService::update(&state.db, id, changes, &state.booking_rules()).await?;
    Ok(Json(reservation))
}

/// Same as `PATCH`: absent fields are kept
#[utoipa::path(
    put,
    path = "/reservations/{id}/",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = ReservationChanges,
    responses(
        (status = 200, description = "Reservation updated", body = Reservation),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn replace(
    state: State<AppState>,
    admin: AdminUser,
    id: ApiPath<i32>,
    changes: ApiJson<ReservationChanges>,
) -> Result<Json<Reservation>, AppError> {
    update(state, admin, id, changes).await
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel/",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 403, description = "Neither the owner nor an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(ReservationService::cancel(&state.db, &user, id).await?))
}

/// An empty body means no note
fn decision(body: &Bytes) -> Result<Decision, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Decision::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid body: {e}")))
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/approve/",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body(content = Decision, description = "Optional note"),
    responses(
        (status = 200, description = "Reservation approved", body = Reservation),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    body: Bytes,
) -> Result<Json<Reservation>, AppError> {
    let note = decision(&body)?.note;
    Ok(Json(ReservationService::approve(&state.db, &admin, id, note).await?))
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/reject/",
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body(content = Decision, description = "Optional note"),
    responses(
        (status = 200, description = "Reservation rejected", body = Reservation),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn reject(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    body: Bytes,
) -> Result<Json<Reservation>, AppError> {
    let note = decision(&body)?.note;
    Ok(Json(ReservationService::reject(&state.db, &admin, id, note).await?))
}

/// PDF of the reservations matching the filters, grouped by space
#[utoipa::path(
    get,
    path = "/reservations/report/",
    params(ReportParams),
    responses(
        (status = 200, description = "PDF report", content_type = "application/pdf", body = Vec<u8>),
        (status = 403, description = "Not an admin")
    ),
    security(("jwt" = [])),
    tag = "Reservations"
)]
pub async fn report(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let tz = state.config.utc_offset;
    let filter = params.filter(&tz)?;

    let space = match filter.space_id {
        None => None,
        Some(id) => match SpaceService::find(&state.db, id).await {
            Ok(space) => Some(space.name),
            Err(ServiceError::NotFound(_)) => Some(id.to_string()),
            Err(e) => return Err(e.into()),
        },
    };
    let meta = ReportMeta {
        generated_at: Utc::now(),
        start: filter.start,
        end: filter.end,
        space,
        statuses: filter.statuses.clone(),
    };

    let rows = ReservationService::report(&state.db, filter).await?;
    let pdf = render_report(&rows, &meta, &tz);

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", meta.file_name(&tz)),
            ),
        ],
        pdf,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_body() {
        assert_eq!(decision(&Bytes::new()).unwrap(), Decision::default());
        assert_eq!(
            decision(&Bytes::from_static(br#"{"note":"ok"}"#)).unwrap().note,
            Some("ok".to_string())
        );
        assert!(decision(&Bytes::from_static(b"note")).is_err());
    }
}
