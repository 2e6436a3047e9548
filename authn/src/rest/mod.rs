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

//! REST interface for registration and login, plus the middleware that guards the rest of the
//! service behind access tokens.

use crate::driver::AuthnDriver;
use axum::Router;

mod api_login_post;
mod api_register_post;
mod httputils;
mod middleware;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use api_login_post::LoginResponse;
pub use api_register_post::RegisterRequest;
pub use httputils::get_bearer_auth;
pub use middleware::require_access_token;

/// Creates the router for the public authentication endpoints.
///
/// The `driver` is a configured instance of the `AuthnDriver` to handle accounts.
pub fn app(driver: AuthnDriver) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/login", post(api_login_post::handler))
        .route("/register", post(api_register_post::handler))
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use super::api_login_post::LoginRequest;
    use super::testutils::*;
    use super::*;
    use http::{Method, StatusCode};
    use usrmgr_core::rest::MessageResponse;
    use usrmgr_core::rest::testutils::*;

    #[tokio::test]
    async fn test_e2e_register_and_login() {
        let context = TestContext::setup().await;

        let request = RegisterRequest {
            first_name: Some("A".to_owned()),
            last_name: Some("B".to_owned()),
            mobile: Some("9999999999".to_owned()),
            password: Some("secret".to_owned()),
        };
        let response = OneShotBuilder::new(context.app(), (Method::POST, "/register"))
            .send_json(request)
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<MessageResponse>()
            .await;
        assert_eq!(MessageResponse::new("User registered successfully"), response);

        let request = LoginRequest {
            mobile: Some("9999999999".to_owned()),
            password: Some("wrong".to_owned()),
        };
        OneShotBuilder::new(context.app(), (Method::POST, "/login"))
            .send_json(request)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("Incorrect password")
            .await;

        let token1 = do_test_login(context.app(), "", "9999999999", "secret").await;
        assert!(!token1.as_str().is_empty());

        context.clock().advance(std::time::Duration::from_secs(1));
        let token2 = do_test_login(context.app(), "", "9999999999", "secret").await;
        assert_ne!(token1, token2);

        let claims = context.driver().authenticate(&token2).unwrap();
        assert_eq!("9999999999", claims.mobile());
    }
}
