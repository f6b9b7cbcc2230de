use std::sync::Arc;

use async_trait::async_trait;

use crate::coordinator::VehicleDataCoordinator;
use crate::vehicle::Vehicle;
use crate::IntegrationResult;

/// Minimal contract every entity exposes to the host platform.
pub trait Entity: Send + Sync {
    /// Stable identifier of the form `<domain>_<vehicleId>_<featureKey>`.
    fn unique_id(&self) -> &str;

    fn name(&self) -> &str;

    fn icon(&self) -> &str;
}

/// On/off contract for toggleable entities.
///
/// `is_on` is a pure read of the in-memory record; the commands may perform
/// slow remote work and report failures to the host's generic command-failure
/// path.
#[async_trait]
pub trait SwitchEntity: Entity {
    fn is_on(&self) -> bool;

    async fn turn_on(&self) -> IntegrationResult<()>;

    async fn turn_off(&self) -> IntegrationResult<()>;
}

/// Coordinator plumbing shared by every entity: the shared coordinator handle
/// plus the id of the vehicle the entity is bound to.
///
/// Entities compose this rather than inherit it; a concrete entity adds only
/// its feature-specific behavior on top.
#[derive(Clone)]
pub struct CoordinatorEntity {
    coordinator: Arc<VehicleDataCoordinator>,
    vehicle_id: String,
}

impl CoordinatorEntity {
    pub fn new(coordinator: Arc<VehicleDataCoordinator>, vehicle_id: impl Into<String>) -> Self {
        Self {
            coordinator,
            vehicle_id: vehicle_id.into(),
        }
    }

    pub fn coordinator(&self) -> &Arc<VehicleDataCoordinator> {
        &self.coordinator
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Snapshot of the bound vehicle's current record.
    pub fn vehicle(&self) -> Option<Vehicle> {
        self.coordinator.manager().vehicle(&self.vehicle_id)
    }

    /// Signal the host to re-read the entity's state immediately.
    pub fn write_state(&self, entity_id: &str) {
        self.coordinator.notify_state(entity_id);
    }
}
