use core::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::vehicle::Vehicle;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("authentication failed: {message}")]
    AuthFailed { message: String },
    #[error("vehicle offline: {vehicle_id}")]
    VehicleOffline { vehicle_id: String },
    #[error("rate limited by remote API")]
    RateLimited,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Session token issued by the manufacturer API after login.
///
/// Cloneable so command paths can carry it onto the blocking worker pool.
/// The access token itself never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct SessionToken {
    access_token: SecretString,
    valid_until: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>, valid_until: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            valid_until,
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.valid_until
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"[REDACTED]")
            .field("valid_until", &self.valid_until)
            .finish()
    }
}

/// Blocking client for the manufacturer's connected-vehicle API.
///
/// Every method performs slow remote I/O (a command round trip takes
/// seconds), so callers on the cooperative runtime must dispatch through
/// `tokio::task::spawn_blocking`. Errors are returned as-is; this layer does
/// not retry.
#[mockall::automock]
pub trait VehicleApi: Send + Sync {
    /// Authenticate with the configured credentials and return a session
    /// token for subsequent calls.
    fn login(&self) -> ApiResult<SessionToken>;

    /// Enumerate the vehicles registered to the account.
    fn fetch_vehicles(&self, token: &SessionToken) -> ApiResult<Vec<Vehicle>>;

    /// Re-read one vehicle's current state and return the fresh record.
    fn update_vehicle(&self, token: &SessionToken, vehicle: &Vehicle) -> ApiResult<Vehicle>;

    fn start_battery_preconditioning(
        &self,
        token: &SessionToken,
        vehicle: &Vehicle,
    ) -> ApiResult<()>;

    fn stop_battery_preconditioning(
        &self,
        token: &SessionToken,
        vehicle: &Vehicle,
    ) -> ApiResult<()>;
}
