//! Users

pub mod authorities;
pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use authorities::authorities_for;
pub use errors::UsersServiceError;
pub use service::*;
