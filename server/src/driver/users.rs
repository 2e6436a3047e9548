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

//! Operations on existing users.

use crate::db;
use crate::driver::Driver;
use crate::model::UserUpdate;
use log::debug;
use usrmgr_authn::model::{User, UserId};
use usrmgr_core::db::DbError;
use usrmgr_core::driver::{DriverError, DriverResult};

/// Translates the errors of operations that target a single user by `id`.
fn map_user_error(e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound("User not found".to_owned()),
        DbError::AlreadyExists => {
            DriverError::AlreadyExists("Mobile number already registered".to_owned())
        }
        e => e.into(),
    }
}

impl Driver {
    /// Gets all registered users.
    pub(crate) async fn get_users(self) -> DriverResult<Vec<User>> {
        let users = db::get_all_users(&mut self.db.ex().await?).await?;
        Ok(users)
    }

    /// Replaces the mutable fields of the user with `id`.
    pub(crate) async fn update_user(self, id: UserId, update: UserUpdate) -> DriverResult<()> {
        db::update_user(&mut self.db.ex().await?, id, &update).await.map_err(map_user_error)?;
        debug!("Updated user {}", id.as_i64());
        Ok(())
    }

    /// Deletes the user with `id`.
    pub(crate) async fn delete_user(self, id: UserId) -> DriverResult<()> {
        db::delete_user(&mut self.db.ex().await?, id).await.map_err(map_user_error)?;
        debug!("Deleted user {}", id.as_i64());
        Ok(())
    }
}
