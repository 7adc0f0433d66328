//! Account and classroom services over the record repository.

pub mod auth;
pub mod classroom;

pub use auth::AuthGateway;
pub use classroom::ClassroomService;
