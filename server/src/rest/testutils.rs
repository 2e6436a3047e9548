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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::rest::app;
use axum::Router;
use usrmgr_authn::model::User;
use usrmgr_core::clocks::testutils::SettableClock;

pub(crate) struct TestContext {
    inner: DriverTestContext,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let inner = DriverTestContext::setup().await;
        let app = app(inner.driver(), inner.authn_driver());
        Self { inner, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    pub(crate) fn clock(&self) -> &SettableClock {
        self.inner.clock()
    }

    /// Returns a valid access token for the user with `mobile`, registering it if necessary.
    pub(crate) async fn access_token(&self, mobile: &'static str) -> String {
        self.inner.access_token(mobile).await.as_str().to_owned()
    }

    pub(crate) async fn create_test_user(&self, mobile: &'static str) -> User {
        self.inner.create_test_user(mobile).await
    }

    pub(crate) async fn get_user(&self, mobile: &'static str) -> Option<User> {
        self.inner.get_user(mobile).await
    }
}
