use crate::{api::ApiClient, error::ApiError};
use log::info;
use models::{
    auth::{AccessToken, Credentials, RefreshRequest, TokenPair},
    user::User,
};

/// Exchanges credentials for a token pair and keeps it in the client's store
pub async fn login(api: &ApiClient, credentials: &Credentials) -> Result<TokenPair, ApiError> {
    let tokens: TokenPair = api.post("/auth/login/", credentials).await?;
    api.tokens().store(tokens.clone());
    info!("Logged in as {}", credentials.email);
    Ok(tokens)
}

/// Swaps the stored refresh token for a fresh access token
pub async fn refresh(api: &ApiClient) -> Result<AccessToken, ApiError> {
    let refresh = api
        .tokens()
        .refresh()
        .ok_or_else(|| ApiError::Unauthorized(Some("No refresh token stored".to_string())))?;

    let token: AccessToken = api.post("/auth/refresh/", &RefreshRequest { refresh }).await?;
    api.tokens().set_access(token.access.clone());
    Ok(token)
}

pub async fn me(api: &ApiClient) -> Result<User, ApiError> {
    api.get("/auth/me/").await
}

pub fn logout(api: &ApiClient) {
    api.tokens().clear();
}
