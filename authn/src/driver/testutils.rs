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

//! Test utilities for the authentication driver.

use crate::db;
use crate::driver::{AuthnDriver, AuthnOptions};
use crate::model::{AccessToken, Mobile, Password, PersonName, SigningSecret, User};
use std::sync::Arc;
use time::macros::datetime;
use usrmgr_core::clocks::testutils::SettableClock;
use usrmgr_core::db::sqlite::testutils::setup;
use usrmgr_core::db::{Db, Executor};

/// Realm used by test drivers.
pub const TEST_REALM: &str = "usrmgr-test";

/// Signing secret used by test drivers.
pub const TEST_SECRET: &str = "test-signing-secret";

/// Creates a set of options suitable for tests.
pub fn test_options() -> AuthnOptions {
    AuthnOptions::new(SigningSecret::new(TEST_SECRET).expect("Hardcoded secret must be valid"))
}

/// State of a running test.
pub struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<SettableClock>,
    driver: AuthnDriver,
}

impl TestContext {
    /// Initializes a driver backed by an in-memory SQLite database and a settable clock.
    pub async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(setup().await);
        let clock = Arc::from(SettableClock::new(datetime!(2024-01-01 10:00:00 UTC)));
        Self::setup_with(db, clock).await
    }

    /// Initializes a driver backed by the given `db` and `clock`.
    pub async fn setup_with(db: Arc<dyn Db + Send + Sync>, clock: Arc<SettableClock>) -> Self {
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = AuthnDriver::new(db.clone(), clock.clone(), TEST_REALM, test_options());
        Self { db, clock, driver }
    }

    /// Gets a direct executor against the database.
    pub async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the database backing the driver.
    pub fn db(&self) -> Arc<dyn Db + Send + Sync> {
        self.db.clone()
    }

    /// Gets a copy of the driver in this test context.
    pub fn driver(&self) -> AuthnDriver {
        self.driver.clone()
    }

    /// Gets the clock used by the driver.
    pub fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Registers a user via the driver and returns it as stored in the database.
    pub async fn create_test_user(&self, mobile: &'static str, password: &'static str) -> User {
        self.driver()
            .register(
                PersonName::from("Test"),
                PersonName::from("User"),
                Mobile::from(mobile),
                Password::from(password),
            )
            .await
            .unwrap();
        db::get_user_by_mobile(&mut self.ex().await, &Mobile::from(mobile)).await.unwrap()
    }

    /// Logs in as the given user via the driver and returns the issued token.
    ///
    /// The user is registered first if it does not yet exist.
    pub async fn do_test_login(&self, mobile: &'static str, password: &'static str) -> AccessToken {
        if db::get_user_by_mobile(&mut self.ex().await, &Mobile::from(mobile)).await.is_err() {
            self.create_test_user(mobile, password).await;
        }
        self.driver().login(Mobile::from(mobile), Password::from(password)).await.unwrap()
    }
}
