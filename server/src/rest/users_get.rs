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

//! API to list all users.

use crate::driver::Driver;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use usrmgr_authn::model::User;
use usrmgr_core::rest::{EmptyBody, RestError};

/// Message returned by the server with the list of users.
#[derive(Serialize)]
pub(crate) struct UsersResponse {
    /// All registered users, sorted by identifier.
    users: Vec<User>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    _: EmptyBody,
) -> Result<Json<UsersResponse>, RestError> {
    let users = driver.get_users().await?;
    Ok(Json(UsersResponse { users }))
}
