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

//! Extends the driver with the `register` method.

use crate::db;
use crate::driver::AuthnDriver;
use crate::model::{Mobile, Password, PersonName, Role};
use log::debug;
use usrmgr_core::db::DbError;
use usrmgr_core::driver::{DriverError, DriverResult};

impl AuthnDriver {
    /// Registers a new user with the given names, `mobile` and `password`.
    ///
    /// New users always get the default role.
    pub async fn register(
        self,
        first_name: PersonName,
        last_name: PersonName,
        mobile: Mobile,
        password: Password,
    ) -> DriverResult<()> {
        // Hashing failures are not the caller's fault so they must not surface as bad input.
        let password = password.hash().map_err(|e| DriverError::BackendError(e.to_string()))?;

        let mut ex = self.db.ex().await?;
        match db::create_user(&mut ex, &first_name, &last_name, &mobile, &password, &Role::default())
            .await
        {
            Ok(()) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(
                    "Mobile number already registered".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Registered new user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::driver::testutils::*;
    use crate::model::*;
    use usrmgr_core::driver::DriverError;

    #[tokio::test]
    async fn test_register_ok() {
        let context = TestContext::setup().await;

        context
            .driver()
            .register(
                PersonName::from("Jane"),
                PersonName::from("Doe"),
                Mobile::from("5551234567"),
                Password::from("the password"),
            )
            .await
            .unwrap();

        let user =
            db::get_user_by_mobile(&mut context.ex().await, &Mobile::from("5551234567")).await.unwrap();
        assert_eq!(Some(&PersonName::from("Jane")), user.first_name());
        assert_eq!(Some(&PersonName::from("Doe")), user.last_name());
        assert_eq!(Some(&Role::default()), user.role());
        assert_eq!(None, user.updated_by());

        let hash = user.password().unwrap();
        assert_ne!("the password", hash.as_str());
        assert!(Password::from("the password").verify(hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_mobile() {
        let context = TestContext::setup().await;

        context.create_test_user("5551234567", "first").await;

        let err = context
            .driver()
            .register(
                PersonName::from("Other"),
                PersonName::from("Person"),
                Mobile::from("5551234567"),
                Password::from("second"),
            )
            .await
            .unwrap_err();
        assert_eq!(DriverError::AlreadyExists("Mobile number already registered".to_owned()), err);

        // The original registration must remain untouched.
        let user =
            db::get_user_by_mobile(&mut context.ex().await, &Mobile::from("5551234567")).await.unwrap();
        assert!(Password::from("first").verify(user.password().unwrap()).unwrap());
    }
}
