use serde::{Deserialize, Serialize};

use yad_core::{DomainError, DomainResult, Entity, Location, UserId};

/// Self-service sign-up payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Delivery address; also the reference point for courier assignment.
    pub address: Location,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("user name cannot be empty"));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::validation("user phone cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Location,
}

impl User {
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            address: new.address,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_or_phone_is_rejected() {
        let mut user = NewUser {
            name: "Anna".to_string(),
            phone: "+70000000002".to_string(),
            email: String::new(),
            address: Location::new(55.7, 37.6).unwrap(),
        };
        assert!(user.validate().is_ok());

        user.phone = "  ".to_string();
        assert!(matches!(user.validate(), Err(DomainError::Validation(_))));
    }
}
