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

//! The `AccessToken`, `Claims` and `SigningSecret` data types.

use crate::model::{Mobile, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use usrmgr_core::model::{ModelError, ModelResult, require_non_empty};

/// Secret used to sign and verify access tokens.
pub struct SigningSecret(String);

impl SigningSecret {
    /// Creates a new signing secret, which cannot be empty.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        Ok(Self(require_non_empty("Signing secret", s)?))
    }

    /// Returns the raw bytes of the secret, as needed by the JWT keys.
    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed secret")
    }
}

/// Claims carried by an access token.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Claims {
    /// Identifier of the user the token was issued to.
    id: i64,

    /// Mobile number of the user the token was issued to.
    mobile: String,

    /// Issue time, in seconds since the Unix epoch.
    iat: i64,

    /// Expiration time, in seconds since the Unix epoch.
    exp: i64,
}

impl Claims {
    /// Creates the claims for a token issued to user `id` with `mobile` at `now` and valid for
    /// `ttl`.
    pub fn new(id: UserId, mobile: &Mobile, now: OffsetDateTime, ttl: Duration) -> Self {
        let iat = now.unix_timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let exp = iat.saturating_add(ttl);
        Self { id: id.as_i64(), mobile: mobile.as_str().to_owned(), iat, exp }
    }

    /// Gets the identifier of the user the token was issued to.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Gets the mobile number of the user the token was issued to.
    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Gets the issue time, in seconds since the Unix epoch.
    pub fn iat(&self) -> i64 {
        self.iat
    }

    /// Gets the expiration time, in seconds since the Unix epoch.
    pub fn exp(&self) -> i64 {
        self.exp
    }
}

/// An opaque type representing a signed access token in its compact JWT form.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token received from a client.  No validation other than emptiness happens here:
    /// use `verify` to check the token's contents.
    pub fn new<S: Into<String>>(token: S) -> ModelResult<Self> {
        Ok(Self(require_non_empty("Access token", token)?))
    }

    /// Signs `claims` with `secret` using HS256.
    pub fn issue(claims: &Claims, secret: &SigningSecret) -> ModelResult<Self> {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| ModelError(format!("Cannot sign access token: {}", e)))?;
        Ok(Self(token))
    }

    /// Checks that the token was signed with `secret` and that it has not yet expired at `now`,
    /// and returns its claims.
    pub fn verify(&self, secret: &SigningSecret, now: OffsetDateTime) -> ModelResult<Claims> {
        // Expiration is checked below against the injected time instead of the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<Claims>(
            &self.0,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ModelError(format!("Invalid access token: {}", e)))?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(ModelError("Access token has expired".to_owned()));
        }
        Ok(data.claims)
    }

    /// Returns the string representation of the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("scrubbed access token")
    }
}
