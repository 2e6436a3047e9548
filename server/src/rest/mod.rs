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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use usrmgr_authn::driver::AuthnDriver;
use usrmgr_authn::rest::require_access_token;

mod user_delete;
mod user_put;
mod users_get;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
///
/// Registration and login are public.  Every other API requires a valid access token, which is
/// verified by `authn` before the request reaches its handler.
pub(crate) fn app(driver: Driver, authn: AuthnDriver) -> Router {
    use axum::routing::{get, put};

    let protected = Router::new()
        .route("/users", get(users_get::handler))
        .route("/users/:id", put(user_put::handler).delete(user_delete::handler))
        .route_layer(axum::middleware::from_fn_with_state(authn.clone(), require_access_token))
        .with_state(driver);

    usrmgr_authn::rest::app(authn).merge(protected)
}
