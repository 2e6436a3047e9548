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

//! Middleware to restrict routes to callers that present a valid access token.

use crate::driver::AuthnDriver;
use crate::rest::get_bearer_auth;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use usrmgr_core::rest::RestError;

/// Rejects requests that lack a valid bearer token and otherwise forwards them to `next` with the
/// verified `Claims` stored in the request extensions.
///
/// Install with `axum::middleware::from_fn_with_state(driver, require_access_token)`.
pub async fn require_access_token(
    State(driver): State<AuthnDriver>,
    mut request: Request,
    next: Next,
) -> Result<Response, RestError> {
    let token = get_bearer_auth(request.headers(), driver.realm())?;
    let claims = driver.authenticate(&token).map_err(|e| RestError::Unauthorized {
        scheme: "Bearer",
        realm: driver.realm(),
        message: e.to_string(),
    })?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
