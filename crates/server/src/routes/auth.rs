use crate::{
    auth::{CurrentUser, TokenKind},
    error::AppError,
    extract::ApiJson,
    state::AppState,
};
use axum::{Json, extract::State};
use chrono::Utc;
use database::services::{ServiceError, user::UserService};
use log::info;
use models::{
    auth::{AccessToken, Credentials, RefreshRequest, TokenPair},
    user::User,
};

/// Exchanges email and password for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login/",
    request_body = Credentials,
    responses(
        (status = 200, description = "Authenticated", body = TokenPair),
        (status = 401, description = "Bad credentials or inactive account")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<TokenPair>, AppError> {
    let user = UserService::authenticate(&state.db, &credentials.email, &credentials.password)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized("No active account found with the given credentials".to_string())
        })?;

    let now = Utc::now();
    let config = &state.config;
    info!("User {} logged in", user.id);

    Ok(Json(TokenPair {
        access: state
            .signer
            .issue(user.id, TokenKind::Access, config.access_token_ttl, now),
        refresh: state
            .signer
            .issue(user.id, TokenKind::Refresh, config.refresh_token_ttl, now),
    }))
}

/// Mints a new access token from a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Refresh token invalid or expired")
    ),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<AccessToken>, AppError> {
    let invalid = || AppError::Unauthorized("Token is invalid or expired".to_string());
    let now = Utc::now();

    let claims = state
        .signer
        .verify(&request.refresh, TokenKind::Refresh, now)
        .map_err(|_| invalid())?;

    match UserService::find(&state.db, claims.sub).await {
        Ok(user) if user.is_active => {}
        Ok(_) | Err(ServiceError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    }

    Ok(Json(AccessToken {
        access: state.signer.issue(
            claims.sub,
            TokenKind::Access,
            state.config.access_token_ttl,
            now,
        ),
    }))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/auth/me/",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("jwt" = [])),
    tag = "Authentication"
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
