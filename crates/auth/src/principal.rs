use serde::{Deserialize, Serialize};

use yad_core::{AdminId, CourierId, RestaurantId, UserId};

use crate::Role;

/// Raw identity of an authenticated caller.
///
/// Users, restaurants, couriers and admins live in separate id spaces, so an
/// `ActorId` only means something together with the actor's [`Role`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The authenticated caller of an operation: `(actorId, actorRole)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }

    pub fn user(id: UserId) -> Self {
        Self::new(id.get(), Role::User)
    }

    pub fn restaurant(id: RestaurantId) -> Self {
        Self::new(id.get(), Role::Restaurant)
    }

    pub fn courier(id: CourierId) -> Self {
        Self::new(id.get(), Role::Courier)
    }

    pub fn admin(id: AdminId) -> Self {
        Self::new(id.get(), Role::Admin)
    }

    /// The user this actor is, if it acts as a user.
    pub fn as_user(&self) -> Option<UserId> {
        (self.role == Role::User).then(|| UserId::new(self.id.get()))
    }

    pub fn as_restaurant(&self) -> Option<RestaurantId> {
        (self.role == Role::Restaurant).then(|| RestaurantId::new(self.id.get()))
    }

    pub fn as_courier(&self) -> Option<CourierId> {
        (self.role == Role::Courier).then(|| CourierId::new(self.id.get()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl core::fmt::Display for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.role, self.id)
    }
}
