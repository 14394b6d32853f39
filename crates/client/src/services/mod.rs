//! One function per REST endpoint.
//!
//! Nothing here validates or interprets; the pages decide what a failure
//! means for the user.

pub mod auth;
pub mod reservations;
pub mod spaces;
pub mod users;
