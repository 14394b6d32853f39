use crate::{
    api::ApiClient,
    error::{ApiError, Failure},
    toast::{SHORT_TTL, ToastKind, Toasts},
};
use chrono::FixedOffset;
use log::debug;
use models::{auth::TokenPair, user::User, validation::DurationPolicy};
use std::sync::RwLock;

/// Where the client keeps its tokens between requests
pub trait TokenStore: Send + Sync {
    fn access(&self) -> Option<String>;

    fn refresh(&self) -> Option<String>;

    fn store(&self, tokens: TokenPair);

    /// Replaces the access token after a refresh
    fn set_access(&self, access: String);

    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl TokenStore for MemoryTokenStore {
    fn access(&self) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.as_ref().map(|t| t.access.clone())
    }

    fn refresh(&self) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.as_ref().map(|t| t.refresh.clone())
    }

    fn store(&self, tokens: TokenPair) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
    }

    fn set_access(&self, access: String) {
        if let Some(tokens) = self
            .tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
        {
            tokens.access = access;
        }
    }

    fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Who may open a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    RedirectLogin,
    RedirectHome,
}

/// Decides whether `user` may open a page with the given access level
pub fn guard(user: Option<&User>, access: Access) -> GuardDecision {
    match (access, user) {
        (Access::Public, _) => GuardDecision::Allowed,
        (_, None) => GuardDecision::RedirectLogin,
        (Access::AdminOnly, Some(user)) if !user.is_admin() => GuardDecision::RedirectHome,
        _ => GuardDecision::Allowed,
    }
}

/// State shared by every page: the API, who is logged in and the toasts
pub struct Session {
    pub api: ApiClient,
    pub user: Option<User>,
    pub toasts: Toasts,
    /// Zone calendar days and form inputs are read in
    pub tz: FixedOffset,
    pub policy: DurationPolicy,
}

impl Session {
    pub fn new(api: ApiClient, tz: FixedOffset) -> Self {
        Self {
            api,
            user: None,
            toasts: Toasts::new(),
            tz,
            policy: DurationPolicy::default(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn guard(&self, access: Access) -> GuardDecision {
        guard(self.user.as_ref(), access)
    }

    /// Sends a failure where the user will see it.
    ///
    /// Network and credential failures become toasts; anything the server
    /// rejected is handed back as banner text for the page to show.
    pub fn report(&mut self, err: &ApiError) -> Option<String> {
        debug!("Reporting {err}");
        match err.failure() {
            failure @ Failure::Network => {
                self.toasts.error(failure.message());
                None
            }
            failure @ Failure::InvalidCredentials => {
                self.toasts
                    .push(ToastKind::Error, failure.message(), SHORT_TTL);
                None
            }
            Failure::Rejected(message) => Some(message),
        }
    }
}
