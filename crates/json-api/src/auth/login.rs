//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tienda_app::auth::{Credentials, password::Password};

use crate::{
    auth::into_status_error, extensions::*, state::State, users::get::UserResponse,
};

/// Login Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginResponse {
    pub token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Seconds until the token expires
    pub expires_in: i64,

    pub user: UserResponse,
}

/// Login Handler
///
/// Exchanges an email and password for a bearer token.
#[endpoint(
    tags("auth"),
    summary = "Login",
    responses(
        (status_code = StatusCode::OK, description = "Session issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<LoginResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .auth
        .login(Credentials {
            email: request.email,
            password: Password::new(request.password),
        })
        .await
        .map_err(into_status_error)?;

    info!(user = %session.user.uuid, "user logged in");

    Ok(Json(LoginResponse {
        token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in,
        user: session.user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tienda_app::auth::{AuthServiceError, LoginSession};

    use crate::test_helpers::{TEST_USER_UUID, TestServices, make_user};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.serve_anonymous(Router::with_path("login").post(handler))
    }

    #[tokio::test]
    async fn test_login_returns_bearer_token() -> TestResult {
        let mut services = TestServices::default();

        services
            .auth
            .expect_login()
            .once()
            .withf(|credentials| {
                credentials.email == "ada@example.com"
                    && credentials.password.expose() == "password123"
            })
            .return_once(|_| {
                Ok(LoginSession {
                    token: "signed.jwt.token".to_string(),
                    expires_in: 3600,
                    user: make_user(TEST_USER_UUID, "ROLE_CUSTOMER"),
                })
            });

        let mut res = TestClient::post("http://example.com/login")
            .json(&json!({ "email": "ada@example.com", "password": "password123" }))
            .send(&make_service(services))
            .await;

        let body: LoginResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.token, "signed.jwt.token");
        assert_eq!(body.token_type, "Bearer");
        assert_eq!(body.expires_in, 3600);
        assert_eq!(body.user.email, "ada@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_returns_401() -> TestResult {
        let mut services = TestServices::default();

        services
            .auth
            .expect_login()
            .once()
            .return_once(|_| Err(AuthServiceError::InvalidCredentials));

        let res = TestClient::post("http://example.com/login")
            .json(&json!({ "email": "ada@example.com", "password": "wrong" }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_login_without_body_returns_400() -> TestResult {
        let mut services = TestServices::default();

        services.auth.expect_login().never();

        let res = TestClient::post("http://example.com/login")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
