use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::debug;

use crate::coordinator::{CoordinatorError, VehicleDataCoordinator};
use crate::entity::{CoordinatorEntity, Entity, SwitchEntity};
use crate::vehicle::FeatureToggle;
use crate::{IntegrationResult, DOMAIN};

/// Static description of one switch: which feature it toggles and how the
/// host should present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDescription {
    pub key: FeatureToggle,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const SWITCH_DESCRIPTIONS: &[SwitchDescription] = &[SwitchDescription {
    key: FeatureToggle::EvBatteryPreconditionEnabled,
    name: "Battery Preconditioning",
    icon: "mdi:battery-clock",
}];

/// Set up the switch platform.
///
/// One-time pass over the coordinator's vehicle collection: for every vehicle
/// and declared description, an adapter is created iff the vehicle reports
/// the feature at all. The resulting entities are handed to the host in bulk
/// through `add_entities`.
pub fn setup<F>(coordinator: &Arc<VehicleDataCoordinator>, add_entities: F)
where
    F: FnOnce(Vec<Arc<dyn SwitchEntity>>),
{
    let mut entities: Vec<Arc<dyn SwitchEntity>> = Vec::new();

    for vehicle_id in coordinator.manager().vehicle_ids() {
        let Some(vehicle) = coordinator.manager().vehicle(&vehicle_id) else {
            continue;
        };
        for description in SWITCH_DESCRIPTIONS {
            if description.key.is_supported(&vehicle) {
                entities.push(Arc::new(VehicleSwitch::new(
                    coordinator.clone(),
                    &vehicle_id,
                    *description,
                )));
            }
        }
    }

    debug!(count = entities.len(), "registering switch entities");
    add_entities(entities);
}

/// Switch adapter binding one vehicle feature to the host's on/off contract.
///
/// State is read straight from the vehicle record at query time. Commands run
/// the blocking API call on the worker pool, then optimistically store the
/// expected state and notify the host, in that order. A refresh racing the
/// optimistic write is accepted; last write wins.
pub struct VehicleSwitch {
    base: CoordinatorEntity,
    description: SwitchDescription,
    unique_id: String,
}

impl VehicleSwitch {
    pub fn new(
        coordinator: Arc<VehicleDataCoordinator>,
        vehicle_id: &str,
        description: SwitchDescription,
    ) -> Self {
        let unique_id = format!("{}_{}_{}", DOMAIN, vehicle_id, description.key.key());
        Self {
            base: CoordinatorEntity::new(coordinator, vehicle_id),
            description,
            unique_id,
        }
    }

    pub fn description(&self) -> &SwitchDescription {
        &self.description
    }

    async fn run_preconditioning_command(&self, enable: bool) -> IntegrationResult<()> {
        let manager = self.base.coordinator().manager();
        let api = manager.api();
        let token = manager.token().await;
        let vehicle =
            self.base
                .vehicle()
                .ok_or_else(|| CoordinatorError::UnknownVehicle {
                    vehicle_id: self.base.vehicle_id().to_string(),
                })?;

        task::spawn_blocking(move || {
            if enable {
                api.start_battery_preconditioning(&token, &vehicle)
            } else {
                api.stop_battery_preconditioning(&token, &vehicle)
            }
        })
        .await
        .map_err(|e| CoordinatorError::Worker {
            message: e.to_string(),
        })??;

        // Optimistic update: reflect the expected state now instead of
        // waiting for the next refresh cycle.
        manager.with_vehicle_mut(self.base.vehicle_id(), |vehicle| {
            self.description.key.set(vehicle, enable)
        })?;
        self.base.write_state(&self.unique_id);
        Ok(())
    }
}

impl Entity for VehicleSwitch {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn name(&self) -> &str {
        self.description.name
    }

    fn icon(&self) -> &str {
        self.description.icon
    }
}

#[async_trait]
impl SwitchEntity for VehicleSwitch {
    fn is_on(&self) -> bool {
        self.base
            .vehicle()
            .and_then(|vehicle| self.description.key.get(&vehicle))
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self), fields(entity_id = %self.unique_id))]
    async fn turn_on(&self) -> IntegrationResult<()> {
        match self.description.key {
            FeatureToggle::EvBatteryPreconditionEnabled => {
                self.run_preconditioning_command(true).await
            }
            key => {
                debug!(%key, "no turn-on command wired for feature");
                Ok(())
            }
        }
    }

    #[tracing::instrument(skip(self), fields(entity_id = %self.unique_id))]
    async fn turn_off(&self) -> IntegrationResult<()> {
        match self.description.key {
            FeatureToggle::EvBatteryPreconditionEnabled => {
                self.run_preconditioning_command(false).await
            }
            key => {
                debug!(%key, "no turn-off command wired for feature");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockVehicleApi, SessionToken};
    use crate::coordinator::VehicleManager;
    use crate::vehicle::Vehicle;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn coordinator_with(vehicles: Vec<Vehicle>) -> Arc<VehicleDataCoordinator> {
        let token = SessionToken::new("test-token", Utc::now() + Duration::hours(1));
        let manager = VehicleManager::new(Arc::new(MockVehicleApi::new()), token);
        for vehicle in vehicles {
            manager.insert_vehicle(vehicle);
        }
        Arc::new(VehicleDataCoordinator::new(manager, 16))
    }

    #[test]
    fn test_unique_id_format() {
        let mut v1 = Vehicle::new("v1", "Niro EV");
        v1.ev_battery_precondition_enabled = Some(false);
        let coordinator = coordinator_with(vec![v1]);

        let switch = VehicleSwitch::new(coordinator, "v1", SWITCH_DESCRIPTIONS[0]);
        assert_eq!(
            switch.unique_id(),
            "kia_uvo_v1_ev_battery_precondition_enabled"
        );
        assert_eq!(switch.name(), "Battery Preconditioning");
        assert_eq!(switch.icon(), "mdi:battery-clock");
    }

    #[test]
    fn test_is_on_reads_record_at_query_time() {
        let mut v1 = Vehicle::new("v1", "Niro EV");
        v1.ev_battery_precondition_enabled = Some(false);
        let coordinator = coordinator_with(vec![v1]);

        let switch = VehicleSwitch::new(coordinator.clone(), "v1", SWITCH_DESCRIPTIONS[0]);
        assert!(!switch.is_on());

        // An external refresh changes the record; the adapter caches nothing.
        coordinator
            .manager()
            .with_vehicle_mut("v1", |vehicle| {
                vehicle.ev_battery_precondition_enabled = Some(true)
            })
            .unwrap();
        assert!(switch.is_on());
    }
}
