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

//! Utilities to help testing services that integrate with the `authn` features.

use crate::model::AccessToken;
use crate::rest::LoginResponse;
use axum::Router;
use serde_json::json;
use usrmgr_core::rest::testutils::OneShotBuilder;

#[cfg(test)]
use {
    crate::db,
    crate::driver::AuthnDriver,
    crate::driver::testutils::TestContext as DriverTestContext,
    crate::model::{Mobile, User},
    crate::rest::app,
    usrmgr_core::clocks::testutils::SettableClock,
    usrmgr_core::db::DbError,
};

/// Logs the user identified by `mobile` in with `password` and returns the access token.
///
/// The `app` is a REST router serving the `authn` interface under the `base` prefix.
pub async fn do_test_login(app: Router, base: &str, mobile: &str, password: &str) -> AccessToken {
    let request = json!({"mobile": mobile, "password": password});
    let response = OneShotBuilder::new(app, (http::Method::POST, format!("{}/login", base)))
        .send_json(request)
        .await
        .expect_json::<LoginResponse>()
        .await;
    response.token
}

/// State of a running test.
#[cfg(test)]
pub(crate) struct TestContext {
    app: Router,
    inner: DriverTestContext,
}

#[cfg(test)]
impl TestContext {
    /// Sets up the app against an in-memory database.
    pub(crate) async fn setup() -> Self {
        let inner = DriverTestContext::setup().await;
        let app = app(inner.driver());
        Self { app, inner }
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Gets a copy of the driver behind the app.
    pub(crate) fn driver(&self) -> AuthnDriver {
        self.inner.driver()
    }

    /// Gets the clock used by the app.
    pub(crate) fn clock(&self) -> &SettableClock {
        self.inner.clock()
    }

    /// Registers a user with `mobile` and `password` bypassing the REST layer.
    pub(crate) async fn create_test_user(
        &self,
        mobile: &'static str,
        password: &'static str,
    ) -> User {
        self.inner.create_test_user(mobile, password).await
    }

    /// Looks up the user with `mobile` by directly querying the backing database.
    pub(crate) async fn get_user(&self, mobile: &'static str) -> Option<User> {
        match db::get_user_by_mobile(&mut self.inner.ex().await, &Mobile::from(mobile)).await {
            Ok(user) => Some(user),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }
}
