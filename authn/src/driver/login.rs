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

//! Extends the driver with the `login` method.

use crate::db;
use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Claims, Mobile, Password};
use log::{debug, error};
use usrmgr_core::db::DbError;
use usrmgr_core::driver::{DriverError, DriverResult};

impl AuthnDriver {
    /// Checks the `password` of the user identified by `mobile` and, if it matches, issues a
    /// new access token for them.
    pub async fn login(self, mobile: Mobile, password: Password) -> DriverResult<AccessToken> {
        let mut ex = self.db.ex().await?;
        let user = match db::get_user_by_mobile(&mut ex, &mobile).await {
            Ok(user) => user,
            Err(DbError::NotFound) => return Err(DriverError::NotFound("User not found".to_owned())),
            Err(e) => return Err(e.into()),
        };
        drop(ex);

        let hash = match user.password() {
            Some(hash) => hash,
            None => {
                debug!("User {} has no stored password", user.id().as_i64());
                return Err(DriverError::InvalidCredentials("Invalid credentials".to_owned()));
            }
        };

        match password.verify(hash) {
            Ok(true) => (),
            Ok(false) => {
                debug!("Password mismatch for user {}", user.id().as_i64());
                return Err(DriverError::InvalidCredentials("Incorrect password".to_owned()));
            }
            Err(e) => {
                error!("Cannot verify password of user {}: {}", user.id().as_i64(), e);
                return Err(DriverError::BackendError("Password comparison failed".to_owned()));
            }
        }

        let claims =
            Claims::new(user.id(), user.mobile(), self.clock.now_utc(), self.opts.token_ttl);
        let token = AccessToken::issue(&claims, &self.opts.secret)
            .map_err(|e| DriverError::BackendError(e.to_string()))?;
        debug!("User {} logged in", user.id().as_i64());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::testutils::*;
    use crate::model::*;
    use std::time::Duration;
    use usrmgr_core::clocks::Clock;
    use usrmgr_core::db::Executor;
    use usrmgr_core::driver::DriverError;

    /// Inserts a user directly into the database bypassing the driver so that we can store
    /// rows that the driver would never produce.
    async fn insert_raw_user(context: &TestContext, mobile: &str, password: Option<&str>) {
        match context.ex().await {
            Executor::Sqlite(mut ex) => {
                sqlx::query(
                    "INSERT INTO users (first_name, last_name, mobile, password)
                    VALUES ('Raw', 'User', ?, ?)",
                )
                .bind(mobile)
                .bind(password)
                .execute(&mut ex)
                .await
                .unwrap();
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_login_ok() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("5551234567", "the password").await;

        let token = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("the password"))
            .await
            .unwrap();

        let claims = context.driver().authenticate(&token).unwrap();
        assert_eq!(user.id().as_i64(), claims.id());
        assert_eq!("5551234567", claims.mobile());
        assert_eq!(context.clock().now_utc().unix_timestamp(), claims.iat());
        assert_eq!(claims.iat() + 3600, claims.exp());
    }

    #[tokio::test]
    async fn test_login_tokens_differ_over_time() {
        let context = TestContext::setup().await;

        context.create_test_user("5551234567", "the password").await;

        let token1 = context.do_test_login("5551234567", "the password").await;
        context.clock().advance(Duration::from_secs(1));
        let token2 = context.do_test_login("5551234567", "the password").await;
        assert_ne!(token1, token2);

        context.driver().authenticate(&token1).unwrap();
        context.driver().authenticate(&token2).unwrap();
    }

    #[tokio::test]
    async fn test_login_unknown_mobile() {
        let context = TestContext::setup().await;

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("the password"))
            .await
            .unwrap_err();
        assert_eq!(DriverError::NotFound("User not found".to_owned()), err);
    }

    #[tokio::test]
    async fn test_login_bad_password() {
        let context = TestContext::setup().await;

        context.create_test_user("5551234567", "the password").await;

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("The password"))
            .await
            .unwrap_err();
        assert_eq!(DriverError::InvalidCredentials("Incorrect password".to_owned()), err);
    }

    #[tokio::test]
    async fn test_login_overlong_password() {
        let context = TestContext::setup().await;

        let long = "x".repeat(100);
        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::for_verification(long.clone()).unwrap())
            .await
            .unwrap_err();
        assert_eq!(DriverError::NotFound("User not found".to_owned()), err);

        context
            .driver()
            .register(
                PersonName::from("Test"),
                PersonName::from("User"),
                Mobile::from("5551234567"),
                Password::new(&long[0..72]).unwrap(),
            )
            .await
            .unwrap();

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::for_verification(long).unwrap())
            .await
            .unwrap_err();
        assert_eq!(DriverError::InvalidCredentials("Incorrect password".to_owned()), err);
    }

    #[tokio::test]
    async fn test_login_missing_hash() {
        let context = TestContext::setup().await;

        insert_raw_user(&context, "5551234567", None).await;

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("anything"))
            .await
            .unwrap_err();
        assert_eq!(DriverError::InvalidCredentials("Invalid credentials".to_owned()), err);
    }

    #[tokio::test]
    async fn test_login_empty_hash() {
        let context = TestContext::setup().await;

        insert_raw_user(&context, "5551234567", Some("")).await;

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("anything"))
            .await
            .unwrap_err();
        assert_eq!(DriverError::InvalidCredentials("Invalid credentials".to_owned()), err);
    }

    #[tokio::test]
    async fn test_login_malformed_hash() {
        let context = TestContext::setup().await;

        insert_raw_user(&context, "5551234567", Some("not a bcrypt hash")).await;

        let err = context
            .driver()
            .login(Mobile::from("5551234567"), Password::from("anything"))
            .await
            .unwrap_err();
        assert_eq!(DriverError::BackendError("Password comparison failed".to_owned()), err);
    }
}
