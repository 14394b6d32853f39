//! Shared data model for the space reservation system.
//!
//! Everything here is plain data plus pure logic: the month calendar grid,
//! form validation, the reservation duration policy and dashboard statistics.
//! The `database` feature teaches sea-orm how to store the status and role
//! enums, and the `openapi` feature derives schemas for the server's docs.

#[cfg(feature = "database")]
#[macro_use]
mod value;

pub mod auth;
pub mod calendar;
pub mod datetime;
pub mod forms;
pub mod reservation;
pub mod space;
pub mod stats;
pub mod user;
pub mod validation;
