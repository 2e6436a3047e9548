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

//! Database abstraction to register and look up users.
//!
//! In production, every operation is delegated to a stored procedure in MySQL.  The SQLite
//! backend emulates those procedures with plain SQL so that tests can run against an in-memory
//! database.

use crate::model::{Actor, HashedPassword, Mobile, PersonName, Role, User, UserId};
use sqlx::Row;
#[cfg(feature = "mysql")]
use sqlx::mysql::MySqlRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
#[cfg(feature = "mysql")]
use usrmgr_core::db::mysql;
#[cfg(any(feature = "sqlite", test))]
use usrmgr_core::db::sqlite;
use usrmgr_core::db::{DbError, DbResult, Executor};


/// Initializes the database schema.
///
/// The MySQL schema, including its stored procedures, is managed outside of the service (see
/// `mysql.sql` for a reference definition), so this only has work to do for SQLite.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "mysql")]
        Executor::MySql(_) => Ok(()),

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Fetches the optional `column` from `row`, treating a missing column the same as a NULL.
///
/// Stored procedures are free to return more or fewer columns than the ones we know about, so
/// only the columns that are essential to identify a user are required.
fn get_optional<'r, R>(row: &'r R, column: &str) -> Result<Option<String>, sqlx::Error>
where
    R: Row,
    for<'c> &'c str: sqlx::ColumnIndex<R>,
    String: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    match row.try_get::<Option<String>, _>(column) {
        Ok(value) => Ok(value.filter(|s| !s.is_empty())),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Raw values of a user as read from a database row.
struct RawUser {
    /// Value of the `id` column.
    id: i64,

    /// Value of the `mobile` column.
    mobile: String,

    /// Value of the `password` column, if present.
    password: Option<String>,

    /// Value of the `first_name` column, if present.
    first_name: Option<String>,

    /// Value of the `last_name` column, if present.
    last_name: Option<String>,

    /// Value of the `role` column, if present.
    role: Option<String>,

    /// Value of the `updated_by` column, if present.
    updated_by: Option<String>,
}

impl RawUser {
    /// Reads all known user columns from `row`.
    fn from_row<'r, R>(row: &'r R) -> Result<Self, sqlx::Error>
    where
        R: Row,
        for<'c> &'c str: sqlx::ColumnIndex<R>,
        i64: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
        String: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    {
        Ok(Self {
            id: row.try_get("id")?,
            mobile: row.try_get("mobile")?,
            password: get_optional(row, "password")?,
            first_name: get_optional(row, "first_name")?,
            last_name: get_optional(row, "last_name")?,
            role: get_optional(row, "role")?,
            updated_by: get_optional(row, "updated_by")?,
        })
    }
}

impl TryFrom<RawUser> for User {
    type Error = DbError;

    fn try_from(raw: RawUser) -> DbResult<Self> {
        let mut user = User::new(UserId::new(raw.id)?, Mobile::new(raw.mobile)?);
        if let Some(password) = raw.password {
            user = user.with_password(HashedPassword::new(password));
        }
        if let (Some(first_name), Some(last_name)) = (raw.first_name, raw.last_name) {
            user = user.with_names(PersonName::new(first_name)?, PersonName::new(last_name)?);
        }
        if let Some(role) = raw.role {
            user = user.with_role(Role::new(role)?);
        }
        if let Some(updated_by) = raw.updated_by {
            user = user.with_updated_by(Actor::new(updated_by)?);
        }
        Ok(user)
    }
}

#[cfg(feature = "mysql")]
impl TryFrom<MySqlRow> for User {
    type Error = DbError;

    fn try_from(row: MySqlRow) -> DbResult<Self> {
        User::try_from(RawUser::from_row(&row).map_err(mysql::map_sqlx_error)?)
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        User::try_from(RawUser::from_row(&row).map_err(sqlite::map_sqlx_error)?)
    }
}

/// Creates a new user with the given names, `mobile` and hashed `password`.
///
/// Fails with `AlreadyExists` if the mobile is already registered.
pub async fn create_user(
    ex: &mut Executor,
    first_name: &PersonName,
    last_name: &PersonName,
    mobile: &Mobile,
    password: &HashedPassword,
    role: &Role,
) -> DbResult<()> {
    match ex {
        #[cfg(feature = "mysql")]
        Executor::MySql(ex) => {
            sqlx::query("CALL CreateUser(?, ?, ?, ?, ?)")
                .bind(first_name.as_str())
                .bind(last_name.as_str())
                .bind(mobile.as_str())
                .bind(password.as_str())
                .bind(role.as_str())
                .execute(ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO users (first_name, last_name, mobile, password, role)
                VALUES (?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(first_name.as_str())
                .bind(last_name.as_str())
                .bind(mobile.as_str())
                .bind(password.as_str())
                .bind(role.as_str())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(())
}

/// Gets information about an existing user given its `mobile`.
pub async fn get_user_by_mobile(ex: &mut Executor, mobile: &Mobile) -> DbResult<User> {
    let user = match ex {
        #[cfg(feature = "mysql")]
        Executor::MySql(ex) => {
            let raw_user = sqlx::query("CALL GetUserByMobile(?)")
                .bind(mobile.as_str())
                .fetch_optional(ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            raw_user.map(User::try_from).transpose()?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let raw_user = sqlx::query("SELECT * FROM users WHERE mobile = ?")
                .bind(mobile.as_str())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw_user.map(User::try_from).transpose()?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    user.ok_or(DbError::NotFound)
}
