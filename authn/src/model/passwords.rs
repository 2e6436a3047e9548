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

//! The `Password` and `HashedPassword` data types.

use serde::{Deserialize, Serialize};
use std::fmt;
use usrmgr_core::model::{ModelError, ModelResult, require_non_empty};

/// Cost factor for bcrypt hashes.
const HASH_COST: u32 = 10;

/// Maximum number of bytes that bcrypt takes into account.  Longer inputs would be silently
/// truncated, so we reject them instead.
const MAX_PASSWORD_LENGTH: usize = 72;

/// An opaque type to hold a password, protecting it from leaking into logs.
#[derive(Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
#[cfg_attr(any(test, feature = "testutils"), derive(Clone))]
pub struct Password(String);

impl Password {
    /// Creates a new password from an untrusted string.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = require_non_empty("Password", s)?;
        if s.len() > MAX_PASSWORD_LENGTH {
            return Err(ModelError("Password is too long".to_owned()));
        }
        Ok(Password(s))
    }

    /// Creates a password from an untrusted string that will only be checked against an existing
    /// hash via `verify`, so there is no upper bound on its length.
    pub fn for_verification<S: Into<String>>(s: S) -> ModelResult<Self> {
        Ok(Password(require_non_empty("Password", s)?))
    }

    /// Returns a string view of the password.
    #[cfg(any(test, feature = "testutils"))]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hashes the password with a random salt.  Consumes the password because there is no
    /// context in which keeping the password alive once we have generated its hash is correct.
    pub fn hash(self) -> ModelResult<HashedPassword> {
        let hashed = bcrypt::hash(self.0, HASH_COST)
            .map_err(|e| ModelError(format!("Password error: {}", e)))?;
        Ok(HashedPassword::new(hashed))
    }

    /// Verifies if this password matches a given `hash`.
    ///
    /// Returns an error only if the `hash` is malformed.  Passwords longer than what `new` accepts
    /// never match.
    pub fn verify(self, hash: &HashedPassword) -> ModelResult<bool> {
        if self.0.len() > MAX_PASSWORD_LENGTH {
            return Ok(false);
        }
        bcrypt::verify(self.0, hash.as_str())
            .map_err(|e| ModelError(format!("Password error: {}", e)))
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for Password {
    /// Creates a new password from a hardcoded string, which must be valid.
    fn from(s: &'static str) -> Self {
        Password::new(s).expect("Hardcoded passwords must be valid")
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed password")
    }
}

/// An opaque type to hold a hashed password, protecting it from leaking into logs.
#[derive(Clone, PartialEq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Creates a new hashed password from a literal string.
    pub fn new<S: Into<String>>(s: S) -> Self {
        HashedPassword(s.into())
    }

    /// Returns a string view of the hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed hash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_ok() {
        assert_eq!(Password::from("foo"), Password::new("foo").unwrap());
        assert_eq!("bar", Password::new("bar").unwrap().as_str());
        Password::new("x".repeat(MAX_PASSWORD_LENGTH)).unwrap();
    }

    #[test]
    fn test_password_error() {
        assert_eq!(
            ModelError("Password cannot be empty".to_owned()),
            Password::new("").unwrap_err()
        );
        assert_eq!(
            ModelError("Password is too long".to_owned()),
            Password::new("x".repeat(MAX_PASSWORD_LENGTH + 1)).unwrap_err()
        );
    }

    #[test]
    fn test_password_for_verification() {
        assert_eq!(
            ModelError("Password cannot be empty".to_owned()),
            Password::for_verification("").unwrap_err()
        );

        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        let password = Password::for_verification(long.clone()).unwrap();
        assert_eq!(long, password.as_str());

        let hash = Password::new("x".repeat(MAX_PASSWORD_LENGTH)).unwrap().hash().unwrap();
        assert!(!password.verify(&hash).unwrap());
    }

    #[test]
    fn test_password_debug_is_scrubbed() {
        assert_eq!("scrubbed password", format!("{:?}", Password::from("secret")));
        assert_eq!("scrubbed hash", format!("{:?}", HashedPassword::new("$2b$10$abc")));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let password1 = Password::from("first password");
        let password2 = Password::from("second password");
        let hash1 = password1.clone().hash().unwrap();
        let hash2 = password2.clone().hash().unwrap();

        assert!(hash1.as_str().starts_with("$2b$10$"));
        assert!(hash2.as_str().starts_with("$2b$10$"));
        assert_ne!("first password", hash1.as_str());
        assert!(hash1 != hash2);

        assert!(password1.clone().verify(&hash1).unwrap());
        assert!(!password2.clone().verify(&hash1).unwrap());
        assert!(!password1.verify(&hash2).unwrap());
        assert!(password2.verify(&hash2).unwrap());
    }

    #[test]
    fn test_password_hash_is_salted() {
        let hash1 = Password::from("secret").hash().unwrap();
        let hash2 = Password::from("secret").hash().unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_password_verify_bad_hash() {
        let err = Password::from("secret").verify(&HashedPassword::new("not a hash")).unwrap_err();
        assert!(err.0.starts_with("Password error"));
    }
}
