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

//! API to update an existing user.

use crate::driver::Driver;
use crate::model::UserUpdate;
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use usrmgr_authn::model::{Actor, Mobile, PersonName, UserId};
use usrmgr_core::rest::{JsonBody, MessageResponse, RestError, non_empty_field, text_or_number};

/// Message sent to the server to update a user.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct UserPutRequest {
    /// New first name.
    pub(crate) first_name: Option<String>,

    /// New last name.
    pub(crate) last_name: Option<String>,

    /// New mobile number.
    #[serde(deserialize_with = "text_or_number")]
    pub(crate) mobile: Option<String>,

    /// Who is making the change.
    #[serde(deserialize_with = "text_or_number")]
    pub(crate) updated_by: Option<String>,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UserPutRequest>,
) -> Result<Json<MessageResponse>, RestError> {
    let (Some(first_name), Some(last_name), Some(mobile), Some(updated_by)) = (
        non_empty_field(request.first_name),
        non_empty_field(request.last_name),
        non_empty_field(request.mobile),
        non_empty_field(request.updated_by),
    ) else {
        return Err(RestError::InvalidRequest("All fields are required".to_owned()));
    };

    let id = UserId::parse(&id)?;
    let update = UserUpdate::new(
        PersonName::new(first_name)?,
        PersonName::new(last_name)?,
        Mobile::new(mobile)?,
        Actor::new(updated_by)?,
    );

    driver.update_user(id, update).await?;

    Ok(Json(MessageResponse::new(format!("User with ID {} updated successfully", id.as_i64()))))
}
