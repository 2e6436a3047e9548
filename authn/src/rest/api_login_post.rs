// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to log a user in and obtain an access token.

use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Mobile, Password};
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use usrmgr_core::rest::{JsonBody, RestError, non_empty_field, text_or_number};

/// Message sent to the server to log in.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct LoginRequest {
    /// Mobile number of the user.
    #[serde(deserialize_with = "text_or_number")]
    pub(crate) mobile: Option<String>,

    /// Password of the user in plain text.
    pub(crate) password: Option<String>,
}

/// Message returned by the server after a successful login attempt.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    /// Human-readable confirmation.
    pub message: String,

    /// Access token to present in the `Authorization` header of protected APIs.
    pub token: AccessToken,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, RestError> {
    let (Some(mobile), Some(password)) =
        (non_empty_field(request.mobile), non_empty_field(request.password))
    else {
        return Err(RestError::InvalidRequest("Mobile and password are required!".to_owned()));
    };

    let mobile = Mobile::new(mobile)?;
    let password = Password::for_verification(password)?;

    let token = driver.login(mobile, password).await?;
    Ok(Json(LoginResponse { message: "Login successful".to_owned(), token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use usrmgr_core::rest::testutils::OneShotBuilder;
    use usrmgr_core::test_payload_must_be_json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/login".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("5551234567", "the password").await;

        let request =
            LoginRequest {
            mobile: Some("5551234567".to_owned()),
            password: Some("the password".to_owned()),
        };
        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_json::<LoginResponse>()
            .await;
        assert_eq!("Login successful", response.message);

        let claims = context.driver().authenticate(&response.token).unwrap();
        assert_eq!(user.id().as_i64(), claims.id());
        assert_eq!("5551234567", claims.mobile());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let context = TestContext::setup().await;

        let request =
            LoginRequest {
            mobile: Some("5551234567".to_owned()),
            password: Some("the password".to_owned()),
        };
        OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;
    }

    #[tokio::test]
    async fn test_bad_password() {
        let context = TestContext::setup().await;

        context.create_test_user("5551234567", "the password").await;

        let request =
            LoginRequest {
            mobile: Some("5551234567".to_owned()),
            password: Some("bad password".to_owned()),
        };
        let body = OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .take_body_as_text()
            .await;
        assert!(body.contains("Incorrect password"));
        assert!(!body.contains("token"));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let context = TestContext::setup().await;

        for body in [
            r#"{}"#,
            r#"{"mobile": "5551234567"}"#,
            r#"{"password": "x"}"#,
            r#"{"mobile": null, "password": "x"}"#,
            r#"{"mobile": "5551234567", "password": null}"#,
            r#"{"mobile": "", "password": "x"}"#,
        ] {
            let request: serde_json::Value = serde_json::from_str(body).unwrap();
            OneShotBuilder::new(context.app(), route())
                .send_json(request)
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error("Mobile and password are required!")
                .await;
        }
    }

    #[tokio::test]
    async fn test_numeric_mobile() {
        let context = TestContext::setup().await;

        context.create_test_user("5551234567", "the password").await;

        let request = serde_json::json!({"mobile": 5551234567u64, "password": "the password"});
        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_json::<LoginResponse>()
            .await;
        assert_eq!("Login successful", response.message);
    }

    #[tokio::test]
    async fn test_wrong_field_type() {
        let context = TestContext::setup().await;

        let request = serde_json::json!({"mobile": "5551234567", "password": 1234});
        OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("password: invalid type")
            .await;
    }

    #[tokio::test]
    async fn test_long_password_checks_user_first() {
        let context = TestContext::setup().await;

        let request = LoginRequest {
            mobile: Some("5551234567".to_owned()),
            password: Some("x".repeat(100)),
        };
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;

        context.create_test_user("5551234567", "the password").await;

        let request = LoginRequest {
            mobile: Some("5551234567".to_owned()),
            password: Some("x".repeat(100)),
        };
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Incorrect password")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
