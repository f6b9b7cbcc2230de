use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task;
use tracing::{debug, info};

use crate::api::{SessionToken, VehicleApi};
use crate::config::IntegrationConfig;
use crate::event_bus::{EntityEvent, EventBus, EventReceiver};
use crate::vehicle::Vehicle;
use crate::IntegrationResult;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("unknown vehicle: {vehicle_id}")]
    UnknownVehicle { vehicle_id: String },
    #[error("blocking worker failed: {message}")]
    Worker { message: String },
}

/// Keyed collection of vehicle records plus the authenticated API client.
///
/// Shared between the coordinator's refresh cycle and the entity command
/// paths. Cloning is cheap; all clones see the same records and token.
pub struct VehicleManager {
    vehicles: Arc<DashMap<String, Vehicle>>,
    token: Arc<RwLock<SessionToken>>,
    api: Arc<dyn VehicleApi>,
}

impl Clone for VehicleManager {
    fn clone(&self) -> Self {
        Self {
            vehicles: self.vehicles.clone(),
            token: self.token.clone(),
            api: self.api.clone(),
        }
    }
}

impl VehicleManager {
    pub fn new(api: Arc<dyn VehicleApi>, token: SessionToken) -> Self {
        Self {
            vehicles: Arc::new(DashMap::new()),
            token: Arc::new(RwLock::new(token)),
            api,
        }
    }

    pub fn api(&self) -> Arc<dyn VehicleApi> {
        self.api.clone()
    }

    /// Snapshot of the current session token.
    pub async fn token(&self) -> SessionToken {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: SessionToken) {
        *self.token.write().await = token;
    }

    /// Insert or replace one vehicle record. Replacement is wholesale; any
    /// optimistic field written since the previous snapshot is overwritten.
    pub fn insert_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.insert(vehicle.id.clone(), vehicle);
    }

    /// Snapshot of one vehicle's current record.
    pub fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.vehicles.get(vehicle_id).map(|entry| entry.clone())
    }

    pub fn vehicle_ids(&self) -> Vec<String> {
        self.vehicles.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Mutate one vehicle record in place under the map's entry lock.
    pub fn with_vehicle_mut<F>(&self, vehicle_id: &str, f: F) -> Result<(), CoordinatorError>
    where
        F: FnOnce(&mut Vehicle),
    {
        match self.vehicles.get_mut(vehicle_id) {
            Some(mut entry) => {
                f(entry.value_mut());
                Ok(())
            }
            None => Err(CoordinatorError::UnknownVehicle {
                vehicle_id: vehicle_id.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// Shared coordinator owning the vehicle manager and the host notification
/// bus.
///
/// Scheduling is the host's concern: it calls [`refresh`](Self::refresh) on
/// its own cadence. Entities hold the coordinator behind an `Arc` and use it
/// for record access and state notifications.
pub struct VehicleDataCoordinator {
    manager: VehicleManager,
    event_bus: EventBus,
}

impl VehicleDataCoordinator {
    pub fn new(manager: VehicleManager, event_buffer_size: usize) -> Self {
        Self {
            manager,
            event_bus: EventBus::new(event_buffer_size),
        }
    }

    /// Log in, enumerate the account's vehicles and build the coordinator.
    /// Both remote calls run on the blocking worker pool.
    #[tracing::instrument(skip(config, api))]
    pub async fn from_config(
        config: &IntegrationConfig,
        api: Arc<dyn VehicleApi>,
    ) -> IntegrationResult<Self> {
        let login_api = api.clone();
        let token = task::spawn_blocking(move || login_api.login())
            .await
            .map_err(|e| CoordinatorError::Worker {
                message: e.to_string(),
            })??;

        let fetch_api = api.clone();
        let fetch_token = token.clone();
        let vehicles = task::spawn_blocking(move || fetch_api.fetch_vehicles(&fetch_token))
            .await
            .map_err(|e| CoordinatorError::Worker {
                message: e.to_string(),
            })??;

        let manager = VehicleManager::new(api, token);
        for vehicle in vehicles {
            debug!(vehicle_id = %vehicle.id, "registered vehicle");
            manager.insert_vehicle(vehicle);
        }
        info!(vehicle_count = manager.len(), "vehicle data coordinator initialized");

        Ok(Self::new(manager, config.event_buffer_size))
    }

    pub fn manager(&self) -> &VehicleManager {
        &self.manager
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    /// Tell the host to re-read one entity's state immediately.
    pub fn notify_state(&self, entity_id: &str) {
        self.event_bus.publish(EntityEvent::StateChanged {
            entity_id: entity_id.to_string(),
        });
    }

    /// Re-read every vehicle's state through the API and replace the local
    /// records. Last write wins against concurrent optimistic updates from
    /// the command paths.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> IntegrationResult<()> {
        let token = self.manager.token().await;
        for vehicle_id in self.manager.vehicle_ids() {
            let Some(vehicle) = self.manager.vehicle(&vehicle_id) else {
                continue;
            };
            let api = self.manager.api();
            let call_token = token.clone();
            let updated = task::spawn_blocking(move || api.update_vehicle(&call_token, &vehicle))
                .await
                .map_err(|e| CoordinatorError::Worker {
                    message: e.to_string(),
                })??;
            self.manager.insert_vehicle(updated);
        }
        debug!(vehicle_count = self.manager.len(), "refresh completed");
        self.event_bus.publish(EntityEvent::RefreshCompleted);
        Ok(())
    }
}
