//! Admin-only screens. Callers check [`crate::session::guard`] first.

pub mod reservations;
pub mod spaces;
pub mod users;
