//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resident record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    /// Store-assigned surrogate key.
    pub id: UserId,

    /// Given name.
    pub name: String,

    /// Family name.
    pub surname: String,

    /// Floor the user lives or works on.
    pub floor: i32,

    /// Free-form status text.
    pub status: String,

    /// Date of birth.
    #[serde(with = "crate::domain::datetime")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub dob: DateTime<Utc>,

    /// Caller-supplied creation time.
    #[serde(with = "crate::domain::datetime", alias = "dateAdded")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub date_added: DateTime<Utc>,
}

/// User fields without the store-assigned key.
///
/// Request bodies for create, update and import decode into this type; an `id`
/// present in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub floor: i32,
    pub status: String,
    #[serde(with = "crate::domain::datetime")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub dob: DateTime<Utc>,
    #[serde(with = "crate::domain::datetime", alias = "dateAdded")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub date_added: DateTime<Utc>,
}

impl NewUser {
    /// Attaches a store-assigned key.
    #[must_use]
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            surname: self.surname,
            floor: self.floor,
            status: self.status,
            dob: self.dob,
            date_added: self.date_added,
        }
    }
}

impl From<User> for NewUser {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            surname: user.surname,
            floor: user.floor,
            status: user.status,
            dob: user.dob,
            date_added: user.date_added,
        }
    }
}
