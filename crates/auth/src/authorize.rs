//! Authorization guard: role model + resource ownership.
//!
//! - No IO
//! - No panics
//! - Deny on anything not explicitly allowed

use serde::{Deserialize, Serialize};
use thiserror::Error;

use yad_core::{CourierId, DomainError, RestaurantId, UserId};

use crate::{Actor, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    /// `actor` is `None` for anonymous callers (self-service sign-up paths).
    #[error("forbidden: {reason}")]
    Forbidden {
        actor: Option<Actor>,
        reason: String,
    },
}

impl AuthzError {
    fn forbidden(actor: &Actor, reason: impl core::fmt::Display) -> Self {
        Self::Forbidden {
            actor: Some(*actor),
            reason: format!("{actor} {reason}"),
        }
    }
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::Forbidden(value.to_string())
    }
}

/// The owning ids of an order, i.e. everything the guard needs to know about it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct OrderParties {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    /// Unset until the order is paid and a courier has been assigned.
    pub courier_id: Option<CourierId>,
}

impl OrderParties {
    /// Whether `actor` is the owner of this order *in the given role*.
    ///
    /// A courier is never an owner of an order without an assigned courier.
    pub fn is_owned_by(&self, actor: &Actor, role: Role) -> bool {
        if actor.role != role {
            return false;
        }
        match role {
            Role::User => actor.as_user() == Some(self.user_id),
            Role::Restaurant => actor.as_restaurant() == Some(self.restaurant_id),
            Role::Courier => match (actor.as_courier(), self.courier_id) {
                (Some(actor_id), Some(assigned)) => actor_id == assigned,
                _ => false,
            },
            Role::Admin => false,
        }
    }
}

/// Allow any owning party (user, restaurant or assigned courier) to act on an order.
///
/// Used for reads: orders and their items are visible to everyone the order
/// references and to nobody else. Admins are not order parties.
pub fn authorize_order_access(actor: &Actor, parties: &OrderParties) -> Result<(), AuthzError> {
    if parties.is_owned_by(actor, actor.role) {
        Ok(())
    } else {
        Err(AuthzError::forbidden(actor, "not a party to this order"))
    }
}

/// Allow only the owner of the order in one specific role.
pub fn authorize_order_owner(
    actor: &Actor,
    parties: &OrderParties,
    role: Role,
) -> Result<(), AuthzError> {
    if parties.is_owned_by(actor, role) {
        Ok(())
    } else {
        Err(AuthzError::forbidden(
            actor,
            format!("only the owning {role} may do this"),
        ))
    }
}

/// Allow an actor to act on its own resource (`role` + `id` must match itself).
pub fn authorize_self(actor: &Actor, role: Role, id: i64) -> Result<(), AuthzError> {
    if actor.role == role && actor.id.get() == id {
        Ok(())
    } else {
        Err(AuthzError::forbidden(
            actor,
            format!("may only access its own {role} resources"),
        ))
    }
}

/// Who may create accounts of the given kind.
///
/// Users sign themselves up (no actor needed). Couriers and restaurants are
/// provisioned by an admin. Admin accounts are never provisioned here.
pub fn authorize_provisioning(actor: Option<&Actor>, kind: Role) -> Result<(), AuthzError> {
    match kind {
        Role::User => Ok(()),
        Role::Courier | Role::Restaurant => match actor {
            Some(a) if a.is_admin() => Ok(()),
            Some(a) => Err(AuthzError::forbidden(
                a,
                format!("only an admin may provision a {kind}"),
            )),
            None => Err(AuthzError::Forbidden {
                actor: None,
                reason: format!("anonymous callers may not provision a {kind}"),
            }),
        },
        Role::Admin => Err(AuthzError::Forbidden {
            actor: actor.copied(),
            reason: "admin accounts are not provisioned through the engine".to_string(),
        }),
    }
}

/// How much of a courier record the caller may change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourierUpdateScope {
    /// The courier itself: working status and location only.
    SelfService,
    /// An admin: every field.
    Full,
}

/// Only the courier itself or an admin may mutate a courier.
pub fn authorize_courier_update(
    actor: &Actor,
    courier_id: CourierId,
) -> Result<CourierUpdateScope, AuthzError> {
    match actor.role {
        Role::Admin => Ok(CourierUpdateScope::Full),
        Role::Courier if actor.as_courier() == Some(courier_id) => Ok(CourierUpdateScope::SelfService),
        _ => Err(AuthzError::forbidden(actor, "may not update this courier")),
    }
}

/// Courier profiles are readable by users, restaurants, admins and the courier itself.
pub fn authorize_courier_read(actor: &Actor, courier_id: CourierId) -> Result<(), AuthzError> {
    match actor.role {
        Role::User | Role::Restaurant | Role::Admin => Ok(()),
        Role::Courier if actor.as_courier() == Some(courier_id) => Ok(()),
        Role::Courier => Err(AuthzError::forbidden(actor, "may not read another courier")),
    }
}

/// Only the restaurant itself or an admin may change a restaurant's working status.
pub fn authorize_restaurant_update(
    actor: &Actor,
    restaurant_id: RestaurantId,
) -> Result<(), AuthzError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Restaurant if actor.as_restaurant() == Some(restaurant_id) => Ok(()),
        _ => Err(AuthzError::forbidden(actor, "may not update this restaurant")),
    }
}
