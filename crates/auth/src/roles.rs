use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::authorize::AuthzError;

/// The four actor roles of the marketplace.
///
/// A closed set: anything the token layer hands over that is not one of these
/// names is rejected instead of falling through to some default.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Courier,
    Restaurant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Courier => "courier",
            Role::Restaurant => "restaurant",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "courier" => Ok(Role::Courier),
            "restaurant" => Ok(Role::Restaurant),
            other => Err(AuthzError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_only() {
        assert_eq!("courier".parse::<Role>().unwrap(), Role::Courier);
        assert_eq!("restaurant".parse::<Role>().unwrap(), Role::Restaurant);
        assert!(matches!("Admin".parse::<Role>(), Err(AuthzError::UnknownRole(_))));
        assert!(matches!("".parse::<Role>(), Err(AuthzError::UnknownRole(_))));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
