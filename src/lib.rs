//! # Hyundai / Kia Connect switch platform
//!
//! This crate exposes connected-vehicle feature toggles as switch entities
//! inside a host home-automation runtime. The heavy lifting — authentication,
//! polling cadence, command dispatch over the manufacturer's API — belongs to
//! collaborators this crate only consumes:
//!
//! - [`api::VehicleApi`]: the blocking manufacturer API client.
//! - [`coordinator::VehicleDataCoordinator`]: the shared coordinator owning
//!   the vehicle records, the session token and the host notification bus.
//!
//! What lives here is the thin entity layer on top:
//!
//! - [`vehicle::FeatureToggle`]: the fixed enumeration of boolean vehicle
//!   features a switch can control, each mapped at compile time to one
//!   optional flag on [`vehicle::Vehicle`].
//! - [`entity`]: the host-facing entity contract ([`entity::Entity`],
//!   [`entity::SwitchEntity`]) and the [`entity::CoordinatorEntity`]
//!   composition helper shared by every entity.
//! - [`switch`]: the switch platform itself — discovery over the vehicle
//!   collection at setup, and the per-vehicle adapter that runs the blocking
//!   start/stop preconditioning commands on the worker pool, optimistically
//!   stores the expected state and signals the host to re-read it.
//!
//! State reported by an entity always mirrors the in-memory vehicle record.
//! It is eventually consistent with the real vehicle: an optimistic command
//! write and a concurrent coordinator refresh may race, and the last write
//! wins.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod event_bus;
pub mod switch;
pub mod vehicle;

pub use error::{Error, IntegrationResult};

/// Integration domain. Prefixes every entity unique id.
pub const DOMAIN: &str = "kia_uvo";
