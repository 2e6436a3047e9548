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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use usrmgr_authn::model::{Actor, Mobile, PersonName};

/// New contents for the mutable fields of an existing user.
///
/// Updates are full replacements: all fields are required.
#[derive(Constructor, Debug, Getters, PartialEq)]
pub(crate) struct UserUpdate {
    /// New first name.
    first_name: PersonName,

    /// New last name.
    last_name: PersonName,

    /// New mobile number, which must not belong to any other user.
    mobile: Mobile,

    /// Identifier of whoever is making the change.
    updated_by: Actor,
}
