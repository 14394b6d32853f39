use crate::{api::ApiClient, error::ApiError};
use models::reservation::{
    Decision, NewReservation, ReportQuery, Reservation, ReservationChanges, ReservationQuery,
};

pub async fn list(api: &ApiClient, query: &ReservationQuery) -> Result<Vec<Reservation>, ApiError> {
    api.get_query("/reservations/", query).await
}

pub async fn mine(api: &ApiClient, query: &ReservationQuery) -> Result<Vec<Reservation>, ApiError> {
    api.get_query("/reservations/mine/", query).await
}

pub async fn get(api: &ApiClient, id: i32) -> Result<Reservation, ApiError> {
    api.get(&format!("/reservations/{id}/")).await
}

pub async fn create(api: &ApiClient, new: &NewReservation) -> Result<Reservation, ApiError> {
    api.post("/reservations/", new).await
}

pub async fn update(
    api: &ApiClient,
    id: i32,
    changes: &ReservationChanges,
) -> Result<Reservation, ApiError> {
    api.patch(&format!("/reservations/{id}/"), changes).await
}

pub async fn cancel(api: &ApiClient, id: i32) -> Result<Reservation, ApiError> {
    api.post_empty(&format!("/reservations/{id}/cancel/")).await
}

pub async fn approve(api: &ApiClient, id: i32, note: Option<String>) -> Result<Reservation, ApiError> {
    api.post(&format!("/reservations/{id}/approve/"), &Decision { note })
        .await
}

pub async fn reject(api: &ApiClient, id: i32, note: Option<String>) -> Result<Reservation, ApiError> {
    api.post(&format!("/reservations/{id}/reject/"), &Decision { note })
        .await
}

/// PDF bytes of the admin report
pub async fn download_report(api: &ApiClient, query: &ReportQuery) -> Result<Vec<u8>, ApiError> {
    api.get_bytes("/reservations/report/", query).await
}
