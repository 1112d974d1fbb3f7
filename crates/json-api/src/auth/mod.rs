//! Authentication

mod errors;
pub(crate) mod guard;
pub(crate) mod login;
pub(crate) mod middleware;

pub(crate) use errors::into_status_error;
