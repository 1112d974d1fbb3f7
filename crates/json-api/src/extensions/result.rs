//! Collapse plumbing failures into a logged `500`.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::error;

/// For failures the client cannot act on; `context` names what was attempted.
pub(crate) trait ResultExt<T> {
    fn or_500(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|source| {
            error!(%source, "{context}");

            StatusError::internal_server_error()
        })
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn errors_become_bare_internal_server_errors() {
        let result: Result<(), _> = Err("disk on fire").or_500("writing receipt");

        let error = result.err();

        assert_eq!(
            error.as_ref().map(|error| error.code),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert!(
            error.is_some_and(|error| !error.brief.contains("disk on fire")),
            "internal causes must not leak into the response"
        );
    }

    #[test]
    fn values_pass_through() {
        let result = Ok::<_, String>(3).or_500("unused");

        assert_eq!(result.ok(), Some(3));
    }
}
