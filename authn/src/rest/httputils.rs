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

//! Utilities to deal with HTTP authorization.

use crate::model::AccessToken;
use http::header::HeaderMap;
use usrmgr_core::rest::{RestError, RestResult, get_unique_header};

/// Authorization scheme accepted by the protected APIs.
const BEARER: &str = "Bearer";

/// Builds an `Unauthorized` error that challenges the client to present a bearer token.
fn unauthorized<S: Into<String>>(realm: &'static str, message: S) -> RestError {
    RestError::Unauthorized { scheme: BEARER, realm, message: message.into() }
}

/// Assumes that the `headers` contain a bearer access token and extracts it.
///
/// The token is not validated here beyond checking that it is present.
pub fn get_bearer_auth(headers: &HeaderMap, exp_realm: &'static str) -> RestResult<AccessToken> {
    let authz = match get_unique_header(headers, &http::header::AUTHORIZATION) {
        Ok(Some(value)) => value,
        Ok(None) => return Err(unauthorized(exp_realm, "Missing Authorization header")),
        Err(e) => return Err(unauthorized(exp_realm, e.to_string())),
    };

    let authz = authz.to_str().map_err(|e| {
        unauthorized(exp_realm, format!("Bad encoding in Authorization header: {}", e))
    })?;

    let (scheme, payload) = match authz.split_once(' ') {
        Some((scheme, _)) if scheme.is_empty() => {
            return Err(unauthorized(exp_realm, "Bad Authorization header: missing scheme"));
        }
        Some(fields) => fields,
        None if authz.is_empty() => {
            return Err(unauthorized(exp_realm, "Bad Authorization header: missing scheme"));
        }
        None => return Err(unauthorized(exp_realm, "Bad Authorization header: missing payload")),
    };

    if scheme != BEARER {
        return Err(unauthorized(exp_realm, "Unsupported scheme"));
    }

    AccessToken::new(payload).map_err(|e| unauthorized(exp_realm, e.to_string()))
}
