mod error;
pub mod password;
pub mod reservation;
pub mod space;
pub mod user;

pub use error::ServiceError;
