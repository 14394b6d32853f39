//! HS256 bearer tokens and the extractors that resolve them to a user.

use crate::{error::AppError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use database::services::{ServiceError, user::UserService};
use hmac::{Hmac, Mac};
use log::debug;
use models::user::User;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Wrong token type")]
    WrongKind,
    #[error("Signing key rejected: {0}")]
    InvalidKey(String),
}

/// Signs and checks tokens with the server secret.
///
/// The keyed MAC is built once and cloned for every token.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    pub fn issue(&self, user_id: i32, kind: TokenKind, ttl: Duration, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        // Claims hold only numbers and a unit enum
        let payload = serde_json::to_vec(&claims).unwrap_or_default();

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{signature}")
    }

    pub fn verify(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(format!("{header}.{payload}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;

        if claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// The authenticated, active caller
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

        let claims = state
            .signer
            .verify(token, TokenKind::Access, Utc::now())
            .map_err(|e| {
                debug!("Rejected access token: {e}");
                AppError::Unauthorized("Given token not valid for any token type".to_string())
            })?;

        let user = match UserService::find(&state.db, claims.sub).await {
            Ok(user) => user,
            Err(ServiceError::NotFound(_)) => {
                return Err(AppError::Unauthorized("User not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !user.is_active {
            return Err(AppError::Unauthorized("User is inactive".to_string()));
        }

        Ok(CurrentUser(user))
    }
}

/// An authenticated caller with the admin role
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden());
        }

        Ok(AdminUser(user))
    }
}
