use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use yad_auth::CourierUpdateScope;
use yad_core::{Aggregate, AggregateRoot, CourierId, DomainError, DomainResult, Location, OrderId};
use yad_events::Event;

/// Courier availability: `Unable(0) ↔ Waiting(1) ↔ Working(2)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingStatus {
    Unable,
    Waiting,
    Working,
}

impl WorkingStatus {
    pub const ALL: [WorkingStatus; 3] = [
        WorkingStatus::Unable,
        WorkingStatus::Waiting,
        WorkingStatus::Working,
    ];

    pub fn code(self) -> i64 {
        match self {
            WorkingStatus::Unable => 0,
            WorkingStatus::Waiting => 1,
            WorkingStatus::Working => 2,
        }
    }

    pub fn from_code(code: i64) -> DomainResult<Self> {
        WorkingStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| {
                DomainError::validation(format!("unknown courier working status code {code}"))
            })
    }

    /// Whether moving from `self` to `target` stays within one adjacent state.
    pub fn is_adjacent_to(self, target: WorkingStatus) -> bool {
        (self.code() - target.code()).abs() <= 1
    }
}

impl core::fmt::Display for WorkingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            WorkingStatus::Unable => "unable",
            WorkingStatus::Waiting => "waiting",
            WorkingStatus::Working => "working",
        })
    }
}

/// Contact fields of a courier. Only an admin may change these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Aggregate root: Courier.
///
/// Invariants:
/// - `working_status` moves at most one adjacent state per change.
/// - `Working` only while an active order references the courier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Courier {
    id: CourierId,
    contact: CourierContact,
    location: Location,
    working_status: WorkingStatus,
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl Courier {
    pub fn empty(id: CourierId) -> Self {
        Self {
            id,
            contact: CourierContact::default(),
            location: Location {
                latitude: 0.0,
                longitude: 0.0,
            },
            working_status: WorkingStatus::Unable,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CourierId {
        self.id
    }

    pub fn contact(&self) -> &CourierContact {
        &self.contact
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn working_status(&self) -> WorkingStatus {
        self.working_status
    }

    pub fn is_registered(&self) -> bool {
        self.created
    }

    pub fn is_waiting(&self) -> bool {
        self.created && self.working_status == WorkingStatus::Waiting
    }
}

impl AggregateRoot for Courier {
    type Id = CourierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterCourier (admin provisioning).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterCourier {
    pub courier_id: CourierId,
    pub contact: CourierContact,
    pub location: Location,
    pub working_status: WorkingStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Requested changes to a courier record. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourierChanges {
    pub working_status: Option<WorkingStatus>,
    pub location: Option<Location>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CourierChanges {
    /// Drop everything a self-service caller may not touch.
    pub fn restricted_to(mut self, scope: CourierUpdateScope) -> Self {
        if scope == CourierUpdateScope::SelfService {
            self.name = None;
            self.phone = None;
            self.email = None;
        }
        self
    }
}

/// Command: UpdateCourier (status and/or profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCourier {
    pub courier_id: CourierId,
    pub scope: CourierUpdateScope,
    pub changes: CourierChanges,
    /// Whether an active order currently references this courier.
    pub has_active_order: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReserveCourier. Taken by courier assignment for a paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveCourier {
    pub courier_id: CourierId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReleaseCourier. Ends a reservation, either because the order was
/// delivered or because it was never saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCourier {
    pub courier_id: CourierId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CourierCommand {
    RegisterCourier(RegisterCourier),
    UpdateCourier(UpdateCourier),
    ReserveCourier(ReserveCourier),
    ReleaseCourier(ReleaseCourier),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierRegistered {
    pub courier_id: CourierId,
    pub contact: CourierContact,
    pub location: Location,
    pub working_status: WorkingStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierProfileUpdated {
    pub courier_id: CourierId,
    pub contact: CourierContact,
    pub location: Location,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierStatusChanged {
    pub courier_id: CourierId,
    pub from: WorkingStatus,
    pub to: WorkingStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierReserved {
    pub courier_id: CourierId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierReleased {
    pub courier_id: CourierId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CourierEvent {
    CourierRegistered(CourierRegistered),
    CourierProfileUpdated(CourierProfileUpdated),
    CourierStatusChanged(CourierStatusChanged),
    CourierReserved(CourierReserved),
    CourierReleased(CourierReleased),
}

impl Event for CourierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CourierEvent::CourierRegistered(_) => "courier.registered",
            CourierEvent::CourierProfileUpdated(_) => "courier.profile_updated",
            CourierEvent::CourierStatusChanged(_) => "courier.status_changed",
            CourierEvent::CourierReserved(_) => "courier.reserved",
            CourierEvent::CourierReleased(_) => "courier.released",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CourierEvent::CourierRegistered(e) => e.occurred_at,
            CourierEvent::CourierProfileUpdated(e) => e.occurred_at,
            CourierEvent::CourierStatusChanged(e) => e.occurred_at,
            CourierEvent::CourierReserved(e) => e.occurred_at,
            CourierEvent::CourierReleased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Courier {
    type Command = CourierCommand;
    type Event = CourierEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CourierEvent::CourierRegistered(e) => {
                self.id = e.courier_id;
                self.contact = e.contact.clone();
                self.location = e.location;
                self.working_status = e.working_status;
                self.created = true;
            }
            CourierEvent::CourierProfileUpdated(e) => {
                self.contact = e.contact.clone();
                self.location = e.location;
            }
            CourierEvent::CourierStatusChanged(e) => {
                self.working_status = e.to;
            }
            CourierEvent::CourierReserved(_) => {
                self.working_status = WorkingStatus::Working;
            }
            CourierEvent::CourierReleased(_) => {
                self.working_status = WorkingStatus::Waiting;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CourierCommand::RegisterCourier(cmd) => self.handle_register(cmd),
            CourierCommand::UpdateCourier(cmd) => self.handle_update(cmd),
            CourierCommand::ReserveCourier(cmd) => self.handle_reserve(cmd),
            CourierCommand::ReleaseCourier(cmd) => self.handle_release(cmd),
        }
    }
}

impl Courier {
    fn ensure_registered(&self, courier_id: CourierId) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found(format!("courier {courier_id}")));
        }
        if self.id != courier_id {
            return Err(DomainError::invariant("courier_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterCourier) -> DomainResult<Vec<CourierEvent>> {
        if self.created {
            return Err(DomainError::conflict(format!(
                "courier {} already exists",
                cmd.courier_id
            )));
        }
        if cmd.contact.name.trim().is_empty() {
            return Err(DomainError::validation("courier name cannot be empty"));
        }
        // A freshly provisioned courier holds no order yet.
        if cmd.working_status == WorkingStatus::Working {
            return Err(DomainError::conflict(
                "a courier cannot start out working without an order",
            ));
        }

        Ok(vec![CourierEvent::CourierRegistered(CourierRegistered {
            courier_id: cmd.courier_id,
            contact: cmd.contact.clone(),
            location: cmd.location,
            working_status: cmd.working_status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateCourier) -> DomainResult<Vec<CourierEvent>> {
        self.ensure_registered(cmd.courier_id)?;

        let changes = cmd.changes.clone().restricted_to(cmd.scope);
        let mut events = Vec::new();

        if let Some(target) = changes.working_status {
            if !self.working_status.is_adjacent_to(target) {
                return Err(DomainError::conflict(format!(
                    "courier {} cannot jump from {} to {}",
                    self.id, self.working_status, target
                )));
            }

            let entering_working =
                target == WorkingStatus::Working && self.working_status != WorkingStatus::Working;
            let leaving_working =
                self.working_status == WorkingStatus::Working && target != WorkingStatus::Working;

            if entering_working && !cmd.has_active_order {
                return Err(DomainError::conflict(format!(
                    "courier {} has no active order to work on",
                    self.id
                )));
            }
            if leaving_working && cmd.has_active_order {
                return Err(DomainError::conflict(format!(
                    "courier {} still holds an active order",
                    self.id
                )));
            }

            if target != self.working_status {
                events.push(CourierEvent::CourierStatusChanged(CourierStatusChanged {
                    courier_id: self.id,
                    from: self.working_status,
                    to: target,
                    occurred_at: cmd.occurred_at,
                }));
            }
        }

        let contact = CourierContact {
            name: changes.name.unwrap_or_else(|| self.contact.name.clone()),
            phone: changes.phone.unwrap_or_else(|| self.contact.phone.clone()),
            email: changes.email.unwrap_or_else(|| self.contact.email.clone()),
        };
        if contact.name.trim().is_empty() {
            return Err(DomainError::validation("courier name cannot be empty"));
        }
        let location = changes.location.unwrap_or(self.location);

        if contact != self.contact || location != self.location {
            events.push(CourierEvent::CourierProfileUpdated(CourierProfileUpdated {
                courier_id: self.id,
                contact,
                location,
                occurred_at: cmd.occurred_at,
            }));
        }

        Ok(events)
    }

    fn handle_reserve(&self, cmd: &ReserveCourier) -> DomainResult<Vec<CourierEvent>> {
        self.ensure_registered(cmd.courier_id)?;
        if self.working_status != WorkingStatus::Waiting {
            return Err(DomainError::conflict(format!(
                "courier {} is {} and cannot take order {}",
                self.id, self.working_status, cmd.order_id
            )));
        }

        Ok(vec![CourierEvent::CourierReserved(CourierReserved {
            courier_id: self.id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_release(&self, cmd: &ReleaseCourier) -> DomainResult<Vec<CourierEvent>> {
        self.ensure_registered(cmd.courier_id)?;
        if self.working_status != WorkingStatus::Working {
            return Err(DomainError::conflict(format!(
                "courier {} is not reserved",
                self.id
            )));
        }

        Ok(vec![CourierEvent::CourierReleased(CourierReleased {
            courier_id: self.id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
