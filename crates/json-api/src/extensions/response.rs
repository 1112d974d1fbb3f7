//! Response helpers for resources created by a handler.

use std::fmt::Display;

use salvo::{
    http::{StatusCode, header::LOCATION},
    prelude::{Response, StatusError},
};

use super::result::ResultExt;

pub(crate) trait ResponseExt {
    /// Answer `201 Created` pointing at `location`.
    fn created_at(&mut self, location: impl Display) -> Result<&mut Self, StatusError>;
}

impl ResponseExt for Response {
    fn created_at(&mut self, location: impl Display) -> Result<&mut Self, StatusError> {
        self.add_header(LOCATION, location.to_string(), true)
            .or_500("failed to set location header")?;

        Ok(self.status_code(StatusCode::CREATED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_status_and_location() {
        let mut res = Response::new();

        let result = res.created_at("/cart/items/42").map(|_| ());

        assert!(result.is_ok(), "expected location to be accepted");
        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            res.headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/cart/items/42")
        );
    }

    #[test]
    fn unencodable_location_is_an_internal_error() {
        let mut res = Response::new();

        let result = res.created_at("/bad\nheader").map(|_| ());

        assert_eq!(
            result.err().map(|error| error.code),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
