//! `yad-auth`: role model and authorization guard.
//!
//! Decoupled from transport and token handling: callers arrive here already
//! authenticated as an [`Actor`] (`(actorId, actorRole)`). Every check fails
//! closed.

pub mod authorize;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthzError, CourierUpdateScope, OrderParties, authorize_courier_read,
    authorize_courier_update, authorize_order_access, authorize_order_owner,
    authorize_provisioning, authorize_restaurant_update, authorize_self,
};
pub use principal::{Actor, ActorId};
pub use roles::Role;
