use serde::{Deserialize, Serialize};

use yad_auth::Role;
use yad_core::{DomainError, DomainResult};

/// Order status lifecycle (linear, forward only).
///
/// `Created → Paid → Preparing → WaitingForCourier → EnRoute → Delivered`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Paid,
    Preparing,
    WaitingForCourier,
    EnRoute,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::WaitingForCourier,
        OrderStatus::EnRoute,
        OrderStatus::Delivered,
    ];

    /// Stable numeric code (0..=5).
    pub fn code(self) -> i64 {
        match self {
            OrderStatus::Created => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::WaitingForCourier => 3,
            OrderStatus::EnRoute => 4,
            OrderStatus::Delivered => 5,
        }
    }

    pub fn from_code(code: i64) -> DomainResult<Self> {
        OrderStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown order status code {code}")))
    }

    /// The status exactly one step ahead, if any.
    pub fn next(self) -> Option<Self> {
        OrderStatus::from_code(self.code() + 1).ok()
    }

    /// Paid through EnRoute: committed to, not yet delivered.
    pub fn is_active(self) -> bool {
        (OrderStatus::Paid..=OrderStatus::EnRoute).contains(&self)
    }

    /// The role whose owner may move an order *into* this status.
    ///
    /// `Created` is only ever the initial state and has no entitled role.
    pub fn entitled_role(self) -> Option<Role> {
        match self {
            OrderStatus::Created => None,
            OrderStatus::Paid => Some(Role::User),
            OrderStatus::Preparing | OrderStatus::WaitingForCourier => Some(Role::Restaurant),
            OrderStatus::EnRoute | OrderStatus::Delivered => Some(Role::Courier),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::WaitingForCourier => "waiting_for_courier",
            OrderStatus::EnRoute => "en_route",
            OrderStatus::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_and_unknown_codes_are_rejected() {
        for s in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(s.code()).unwrap(), s);
        }
        assert!(matches!(OrderStatus::from_code(6), Err(DomainError::Validation(_))));
        assert!(matches!(OrderStatus::from_code(-1), Err(DomainError::Validation(_))));
    }

    #[test]
    fn next_walks_the_line_and_stops_at_delivered() {
        assert_eq!(OrderStatus::Created.next(), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::EnRoute.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
    }

    #[test]
    fn active_window_is_paid_through_en_route() {
        let active: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_active()).collect();
        assert_eq!(
            active,
            vec![
                OrderStatus::Paid,
                OrderStatus::Preparing,
                OrderStatus::WaitingForCourier,
                OrderStatus::EnRoute
            ]
        );
    }

    #[test]
    fn entitled_roles() {
        assert_eq!(OrderStatus::Paid.entitled_role(), Some(Role::User));
        assert_eq!(OrderStatus::WaitingForCourier.entitled_role(), Some(Role::Restaurant));
        assert_eq!(OrderStatus::Delivered.entitled_role(), Some(Role::Courier));
        assert_eq!(OrderStatus::Created.entitled_role(), None);
    }
}
