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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Registration and lookups by mobile live in the `authn` crate.  This module adds the
//! administrative operations on existing users.

use crate::model::UserUpdate;
use futures::TryStreamExt;
use usrmgr_authn::model::{User, UserId};
use usrmgr_core::db::mysql;
#[cfg(test)]
use usrmgr_core::db::sqlite;
use usrmgr_core::db::{DbError, DbResult, Executor};


/// Fails with `NotFound` when a mutation that targets a single user did not match any row.
///
/// Counts above one are fine: stored procedures report the sum across all of their statements.
fn require_affected_rows(rows_affected: u64) -> DbResult<()> {
    if rows_affected == 0 { Err(DbError::NotFound) } else { Ok(()) }
}

/// Gets all users, sorted by their identifier.
///
/// The returned users never carry password hashes.
pub(crate) async fn get_all_users(ex: &mut Executor) -> DbResult<Vec<User>> {
    match ex {
        Executor::MySql(ex) => {
            let mut rows = sqlx::query("CALL GetAllUsers()").fetch(ex);
            let mut users = vec![];
            while let Some(row) = rows.try_next().await.map_err(mysql::map_sqlx_error)? {
                users.push(User::try_from(row)?);
            }
            Ok(users)
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, mobile, role, updated_by
                FROM users
                ORDER BY id";
            let mut rows = sqlx::query(query_str).fetch(ex);
            let mut users = vec![];
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                users.push(User::try_from(row)?);
            }
            Ok(users)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Replaces the mutable fields of the user with `id` with the contents of `update`.
pub(crate) async fn update_user(
    ex: &mut Executor,
    id: UserId,
    update: &UserUpdate,
) -> DbResult<()> {
    match ex {
        Executor::MySql(ex) => {
            let done = sqlx::query("CALL UpdateUser(?, ?, ?, ?, ?)")
                .bind(id.as_i64())
                .bind(update.first_name().as_str())
                .bind(update.last_name().as_str())
                .bind(update.mobile().as_str())
                .bind(update.updated_by().as_str())
                .execute(ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            require_affected_rows(done.rows_affected())
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE users
                SET first_name = ?, last_name = ?, mobile = ?, updated_by = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(update.first_name().as_str())
                .bind(update.last_name().as_str())
                .bind(update.mobile().as_str())
                .bind(update.updated_by().as_str())
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            require_affected_rows(done.rows_affected())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the user with `id`.
pub(crate) async fn delete_user(ex: &mut Executor, id: UserId) -> DbResult<()> {
    match ex {
        Executor::MySql(ex) => {
            let done = sqlx::query("CALL DeleteUser(?)")
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            require_affected_rows(done.rows_affected())
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            require_affected_rows(done.rows_affected())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
