use crate::{
    auth::{TokenError, TokenSigner},
    config::Config,
};
use database::services::reservation::BookingRules;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared by every handler; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub signer: TokenSigner,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, TokenError> {
        let signer = TokenSigner::new(&config.jwt_secret)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            signer,
        })
    }

    pub fn booking_rules(&self) -> BookingRules {
        BookingRules {
            duration: self.config.duration_policy,
            default_space: self.config.default_space.clone(),
        }
    }
}
