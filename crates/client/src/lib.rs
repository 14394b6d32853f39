//! Typed client for the reservations API and the page flows built on it.
//!
//! `services` maps one function to one endpoint and holds no rules of its
//! own. `pages` keeps the state of each screen (forms, calendar, filters) and
//! decides what to fetch, what to show and where failures end up.

pub mod api;
pub mod error;
pub mod pages;
pub mod services;
pub mod session;
pub mod toast;

pub use api::ApiClient;
pub use error::{ApiError, Failure};
