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

//! Business logic for user registration and authentication.

use crate::model::{AccessToken, Claims, SigningSecret};
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use usrmgr_core::clocks::Clock;
use usrmgr_core::db::Db;
use usrmgr_core::driver::{DriverError, DriverResult};
use usrmgr_core::env::{get_optional_var, get_required_var};

mod login;
mod register;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

/// Default value for the `TTL_SECONDS` setting when not specified.
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 60 * 60;

/// Configuration options for the authentication driver.
#[derive(Debug)]
pub struct AuthnOptions {
    /// Secret to sign and verify access tokens with.
    pub secret: SigningSecret,

    /// How long issued access tokens remain valid for.
    pub token_ttl: Duration,
}

impl AuthnOptions {
    /// Creates a new set of options with the default token lifetime.
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret, token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECONDS) }
    }

    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use `<prefix>_SECRET`, which is required, and `<prefix>_TTL_SECONDS`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let secret = get_required_var::<String>(prefix, "SECRET")?;
        let secret = SigningSecret::new(secret)
            .map_err(|e| format!("Invalid value in environment variable {}_SECRET: {}", prefix, e))?;
        let token_ttl = get_optional_var::<u64>(prefix, "TTL_SECONDS")?
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
        Ok(Self { secret, token_ttl: Duration::from_secs(token_ttl) })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they issue a single store
/// call, so it's incorrect for the caller to chain two separate calls.  For this reason, these
/// operations consume the driver in an attempt to minimize the possibility of executing two
/// operations.
#[derive(Clone)]
pub struct AuthnDriver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Authentication realm to return to requests.
    realm: &'static str,

    /// Options for the authentication driver.
    opts: Arc<AuthnOptions>,
}

impl AuthnDriver {
    /// Creates a new driver backed by the given dependencies.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        realm: &'static str,
        opts: AuthnOptions,
    ) -> Self {
        Self { db, clock, realm, opts: Arc::from(opts) }
    }

    /// Gets the authentication realm.
    pub fn realm(&self) -> &'static str {
        self.realm
    }

    /// Validates the access `token` and returns the claims it carries.
    ///
    /// Unlike the other operations, this does not consume the driver because it never touches
    /// the database and is invoked for every protected request.
    pub fn authenticate(&self, token: &AccessToken) -> DriverResult<Claims> {
        match token.verify(&self.opts.secret, self.clock.now_utc()) {
            Ok(claims) => Ok(claims),
            Err(e) => {
                warn!("Rejected access token: {}", e);
                Err(DriverError::Unauthorized(e.to_string()))
            }
        }
    }
}
