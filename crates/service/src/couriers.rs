//! Courier availability and profile operations.

use chrono::Utc;
use serde_json::Value as JsonValue;

use yad_auth::{Actor, authorize_courier_read, authorize_courier_update};
use yad_core::{AggregateRoot, CourierId, ExpectedVersion};
use yad_events::{EventBus, EventEnvelope};
use yad_infra::Store;
use yad_parties::{Courier, CourierChanges, CourierCommand, UpdateCourier, WorkingStatus};

use crate::engine::{COURIER_AGGREGATE, Engine, execute};
use crate::error::ServiceResult;

impl<S, B> Engine<S, B>
where
    S: Store,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Change a courier's working status.
    pub fn update_courier_status(
        &self,
        actor: &Actor,
        courier_id: CourierId,
        status: WorkingStatus,
    ) -> ServiceResult<Courier> {
        self.update_courier(
            actor,
            courier_id,
            CourierChanges {
                working_status: Some(status),
                ..CourierChanges::default()
            },
        )
    }

    /// Update a courier record.
    ///
    /// The courier itself may change its working status and location; any
    /// contact fields it submits are dropped. An admin may change everything.
    pub fn update_courier(
        &self,
        actor: &Actor,
        courier_id: CourierId,
        changes: CourierChanges,
    ) -> ServiceResult<Courier> {
        let scope = authorize_courier_update(actor, courier_id)
            .inspect_err(|err| tracing::warn!(%courier_id, %actor, "courier update denied: {err}"))?;
        let courier = self.require_courier(courier_id)?;
        let has_active_order = self.store().active_courier_order(courier_id)?.is_some();

        let (next, events) = execute(
            &courier,
            CourierCommand::UpdateCourier(UpdateCourier {
                courier_id,
                scope,
                changes,
                has_active_order,
                occurred_at: Utc::now(),
            }),
        )
        .inspect_err(|err| tracing::warn!(%courier_id, %actor, "courier update rejected: {err}"))?;

        if events.is_empty() {
            return Ok(courier);
        }

        self.store()
            .save_courier(&next, ExpectedVersion::Exact(courier.version()))?;
        self.publish(COURIER_AGGREGATE, courier_id.get(), courier.version(), &events);

        tracing::info!(
            %courier_id,
            from = %courier.working_status(),
            to = %next.working_status(),
            "courier updated"
        );
        Ok(next)
    }

    pub fn get_courier(&self, actor: &Actor, courier_id: CourierId) -> ServiceResult<Courier> {
        authorize_courier_read(actor, courier_id)?;
        let courier = self.require_courier(courier_id)?;
        tracing::debug!(%courier_id, %actor, "courier read");
        Ok(courier)
    }
}
