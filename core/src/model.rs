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

//! Generic types and helpers for the model layer.

/// Model errors.  These are raised when constructing a model type from untrusted data fails.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Ensures that a user-supplied `value` for the field `what` is not empty.
///
/// Missing fields in requests are deserialized as empty strings, so this is also the check that
/// catches those.
pub fn require_non_empty<S: Into<String>>(what: &str, value: S) -> ModelResult<String> {
    let value = value.into();
    if value.is_empty() {
        return Err(ModelError(format!("{} cannot be empty", what)));
    }
    Ok(value)
}
