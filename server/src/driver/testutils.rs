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

//! Test utilities for the business layer.

use crate::driver::Driver;
use usrmgr_authn::db;
use usrmgr_authn::driver::AuthnDriver;
use usrmgr_authn::driver::testutils::TestContext as AuthnTestContext;
use usrmgr_authn::model::{AccessToken, Mobile, User};
use usrmgr_core::clocks::testutils::SettableClock;
use usrmgr_core::db::DbError;

/// Password given to all users created by the test context.
pub(crate) const TEST_PASSWORD: &str = "test password";

pub(crate) struct TestContext {
    authn: AuthnTestContext,
    driver: Driver,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let authn = AuthnTestContext::setup().await;
        let driver = Driver::new(authn.db());
        Self { authn, driver }
    }

    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    pub(crate) fn authn_driver(&self) -> AuthnDriver {
        self.authn.driver()
    }

    pub(crate) fn clock(&self) -> &SettableClock {
        self.authn.clock()
    }

    /// Registers a user with `mobile` and the common test password.
    pub(crate) async fn create_test_user(&self, mobile: &'static str) -> User {
        self.authn.create_test_user(mobile, TEST_PASSWORD).await
    }

    /// Logs in as the user with `mobile`, registering it first if needed.
    pub(crate) async fn access_token(&self, mobile: &'static str) -> AccessToken {
        self.authn.do_test_login(mobile, TEST_PASSWORD).await
    }

    pub(crate) async fn get_user(&self, mobile: &'static str) -> Option<User> {
        match db::get_user_by_mobile(&mut self.authn.ex().await, &Mobile::from(mobile)).await {
            Ok(user) => Some(user),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }
}
