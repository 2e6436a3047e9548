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

//! The `User` data type and the types of its fields.

use crate::model::HashedPassword;
use serde::Serialize;
use usrmgr_core::model::{ModelError, ModelResult, require_non_empty};

/// Role assigned to users at registration time.
const DEFAULT_ROLE: &str = "Admin";

/// Unique identifier of a user, as assigned by the database.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a new identifier, which must be positive.
    pub fn new(id: i64) -> ModelResult<Self> {
        if id <= 0 {
            return Err(ModelError(format!("Invalid user ID {}", id)));
        }
        Ok(Self(id))
    }

    /// Parses an identifier received as text, such as from a URL path.
    pub fn parse(s: &str) -> ModelResult<Self> {
        if s.is_empty() {
            return Err(ModelError("User ID is required".to_owned()));
        }
        match s.parse::<i64>() {
            Ok(id) => Self::new(id),
            Err(_) => Err(ModelError(format!("Invalid user ID '{}'", s))),
        }
    }

    /// Returns the raw numeric value of the identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Generates a newtype over a `String` that cannot be empty.
macro_rules! non_empty_string [
    ( $(#[$meta:meta])* $name:ident, $what:literal ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new value from an untrusted string `s`, making sure it is not empty.
            pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
                Ok(Self(require_non_empty($what, s)?))
            }

            /// Returns a string view of the value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        #[cfg(any(test, feature = "testutils"))]
        impl From<&'static str> for $name {
            /// Creates a new value from a hardcoded string, which must be valid.
            fn from(s: &'static str) -> Self {
                $name::new(s).expect("Hardcoded values must be valid")
            }
        }
    }
];

non_empty_string!(
    /// Mobile number of a user, which doubles as their login handle.
    Mobile,
    "Mobile"
);

non_empty_string!(
    /// First or last name of a user.
    PersonName,
    "Name"
);

non_empty_string!(
    /// Free-form role of a user.
    Role,
    "Role"
);

non_empty_string!(
    /// Identifier of whoever last modified a user.
    Actor,
    "Updated by"
);

impl Default for Role {
    fn default() -> Self {
        Self(DEFAULT_ROLE.to_owned())
    }
}

/// Representation of a user's information.
///
/// The serialized form of a user never includes the password hash.
#[derive(Debug, PartialEq, Serialize)]
pub struct User {
    /// Identifier of the user.
    id: UserId,

    /// First name of the user.
    first_name: Option<PersonName>,

    /// Last name of the user.
    last_name: Option<PersonName>,

    /// Mobile number of the user.
    mobile: Mobile,

    /// Hashed password.  None if the user cannot log in.
    #[serde(skip)]
    password: Option<HashedPassword>,

    /// Role of the user.
    role: Option<Role>,

    /// Who last modified the user.
    updated_by: Option<Actor>,
}

impl User {
    /// Creates a new user with the given required fields.
    pub fn new(id: UserId, mobile: Mobile) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            mobile,
            password: None,
            role: None,
            updated_by: None,
        }
    }

    /// Modifies a user to add a password.
    pub fn with_password(mut self, password: HashedPassword) -> Self {
        self.password = Some(password);
        self
    }

    /// Modifies a user to set its first and last names.
    pub fn with_names(mut self, first_name: PersonName, last_name: PersonName) -> Self {
        self.first_name = Some(first_name);
        self.last_name = Some(last_name);
        self
    }

    /// Modifies a user to set its role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Modifies a user to record who last modified it.
    pub fn with_updated_by(mut self, updated_by: Actor) -> Self {
        self.updated_by = Some(updated_by);
        self
    }

    /// Gets the user's identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Gets the user's first name.
    pub fn first_name(&self) -> Option<&PersonName> {
        self.first_name.as_ref()
    }

    /// Gets the user's last name.
    pub fn last_name(&self) -> Option<&PersonName> {
        self.last_name.as_ref()
    }

    /// Gets the user's mobile number.
    pub fn mobile(&self) -> &Mobile {
        &self.mobile
    }

    /// Gets the user's password as a hash.
    pub fn password(&self) -> Option<&HashedPassword> {
        self.password.as_ref()
    }

    /// Gets the user's role.
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Gets who last modified the user.
    pub fn updated_by(&self) -> Option<&Actor> {
        self.updated_by.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_ok() {
        assert_eq!(5, UserId::new(5).unwrap().as_i64());
        assert_eq!(UserId::new(123).unwrap(), UserId::parse("123").unwrap());
    }

    #[test]
    fn test_user_id_errors() {
        assert_eq!(ModelError("Invalid user ID 0".to_owned()), UserId::new(0).unwrap_err());
        assert_eq!(ModelError("Invalid user ID -3".to_owned()), UserId::parse("-3").unwrap_err());
        assert_eq!(ModelError("User ID is required".to_owned()), UserId::parse("").unwrap_err());
        assert_eq!(
            ModelError("Invalid user ID 'abc'".to_owned()),
            UserId::parse("abc").unwrap_err()
        );
    }

    #[test]
    fn test_non_empty_strings() {
        assert_eq!("9999999999", Mobile::new("9999999999").unwrap().as_str());
        assert_eq!(ModelError("Mobile cannot be empty".to_owned()), Mobile::new("").unwrap_err());
        assert_eq!(ModelError("Name cannot be empty".to_owned()), PersonName::new("").unwrap_err());
        assert_eq!(ModelError("Role cannot be empty".to_owned()), Role::new("").unwrap_err());
        assert_eq!(
            ModelError("Updated by cannot be empty".to_owned()),
            Actor::new("").unwrap_err()
        );
    }

    #[test]
    fn test_role_default() {
        assert_eq!(Role::from("Admin"), Role::default());
    }

    #[test]
    fn test_user_getters() {
        let user = User::new(UserId::new(1).unwrap(), Mobile::from("555"));
        assert_eq!(UserId::new(1).unwrap(), user.id());
        assert_eq!(&Mobile::from("555"), user.mobile());
        assert!(user.first_name().is_none());
        assert!(user.last_name().is_none());
        assert!(user.password().is_none());
        assert!(user.role().is_none());
        assert!(user.updated_by().is_none());

        let user = user
            .with_names(PersonName::from("Jane"), PersonName::from("Doe"))
            .with_password(HashedPassword::new("password-hash"))
            .with_role(Role::default())
            .with_updated_by(Actor::from("admin"));
        assert_eq!(Some(&PersonName::from("Jane")), user.first_name());
        assert_eq!(Some(&PersonName::from("Doe")), user.last_name());
        assert_eq!(Some(&HashedPassword::new("password-hash")), user.password());
        assert_eq!(Some(&Role::from("Admin")), user.role());
        assert_eq!(Some(&Actor::from("admin")), user.updated_by());
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let user = User::new(UserId::new(7).unwrap(), Mobile::from("555"))
            .with_names(PersonName::from("Jane"), PersonName::from("Doe"))
            .with_password(HashedPassword::new("$2b$10$secret"))
            .with_role(Role::default());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            serde_json::json!({
                "id": 7,
                "first_name": "Jane",
                "last_name": "Doe",
                "mobile": "555",
                "role": "Admin",
                "updated_by": null,
            }),
            json
        );
        assert!(!json.to_string().contains("secret"));
    }
}
