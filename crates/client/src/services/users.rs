use crate::{api::ApiClient, error::ApiError};
use models::user::{NewUser, User, UserChanges};

pub async fn list(api: &ApiClient) -> Result<Vec<User>, ApiError> {
    api.get("/users/").await
}

pub async fn get(api: &ApiClient, id: i32) -> Result<User, ApiError> {
    api.get(&format!("/users/{id}/")).await
}

pub async fn create(api: &ApiClient, new: &NewUser) -> Result<User, ApiError> {
    api.post("/users/", new).await
}

pub async fn update(api: &ApiClient, id: i32, changes: &UserChanges) -> Result<User, ApiError> {
    api.patch(&format!("/users/{id}/"), changes).await
}

/// Deactivates the account; the server keeps the row
pub async fn delete(api: &ApiClient, id: i32) -> Result<(), ApiError> {
    api.delete(&format!("/users/{id}/")).await
}
