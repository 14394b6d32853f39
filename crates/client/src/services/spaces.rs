use crate::{api::ApiClient, error::ApiError};
use chrono::{DateTime, Utc};
use models::space::{Availability, NewSpace, Space, SpaceChanges};

pub async fn list(api: &ApiClient) -> Result<Vec<Space>, ApiError> {
    api.get("/spaces/").await
}

pub async fn get(api: &ApiClient, id: i32) -> Result<Space, ApiError> {
    api.get(&format!("/spaces/{id}/")).await
}

pub async fn create(api: &ApiClient, new: &NewSpace) -> Result<Space, ApiError> {
    api.post("/spaces/", new).await
}

pub async fn update(api: &ApiClient, id: i32, changes: &SpaceChanges) -> Result<Space, ApiError> {
    api.patch(&format!("/spaces/{id}/"), changes).await
}

pub async fn delete(api: &ApiClient, id: i32) -> Result<(), ApiError> {
    api.delete(&format!("/spaces/{id}/")).await
}

pub async fn availability(
    api: &ApiClient,
    id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Availability, ApiError> {
    let query = [("start", start.to_rfc3339()), ("end", end.to_rfc3339())];
    api.get_query(&format!("/spaces/{id}/availability/"), &query).await
}
