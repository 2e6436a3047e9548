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

//! API to register a new user.

use crate::driver::AuthnDriver;
use crate::model::{Mobile, Password, PersonName};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use usrmgr_core::rest::{JsonBody, MessageResponse, RestError, non_empty_field, text_or_number};

/// Message sent to the server to register a new user.
///
/// Fields are optional so that missing, `null` and empty ones can be reported with a single
/// message.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// First name of the user.
    pub first_name: Option<String>,

    /// Last name of the user.
    pub last_name: Option<String>,

    /// Mobile number of the user, which is their login handle.
    #[serde(deserialize_with = "text_or_number")]
    pub mobile: Option<String>,

    /// Desired password in plain text.
    pub password: Option<String>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, RestError> {
    let (Some(first_name), Some(last_name), Some(mobile), Some(password)) = (
        non_empty_field(request.first_name),
        non_empty_field(request.last_name),
        non_empty_field(request.mobile),
        non_empty_field(request.password),
    ) else {
        return Err(RestError::InvalidRequest("All fields are required!".to_owned()));
    };

    let first_name = PersonName::new(first_name)?;
    let last_name = PersonName::new(last_name)?;
    let mobile = Mobile::new(mobile)?;
    let password = Password::new(password)?;

    driver.register(first_name, last_name, mobile, password).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered successfully"))))
}
