use serde::{Deserialize, Serialize};

/// In-memory record of one vehicle's known state fields.
///
/// Owned by the [`crate::coordinator::VehicleManager`] collection, keyed by
/// vehicle id. Feature flags are optional: `None` means the vehicle does not
/// report the feature at all, which gates whether an entity is created for
/// it. Records are replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub ev_battery_precondition_enabled: Option<bool>,

    #[serde(default)]
    pub air_control_is_on: Option<bool>,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Boolean vehicle features a switch entity can control.
///
/// Each key maps at compile time to one optional flag on [`Vehicle`], so the
/// entity layer never looks fields up by string name. The enumeration may
/// carry more keys than there are commands wired in the switch platform;
/// commands for the unwired ones are no-ops.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureToggle {
    EvBatteryPreconditionEnabled,
    AirControlIsOn,
}

impl FeatureToggle {
    /// Wire name of the vehicle field backing this toggle. Used as the
    /// feature-key segment of entity unique ids.
    pub fn key(&self) -> &'static str {
        match self {
            Self::EvBatteryPreconditionEnabled => "ev_battery_precondition_enabled",
            Self::AirControlIsOn => "air_control_is_on",
        }
    }

    pub fn get(&self, vehicle: &Vehicle) -> Option<bool> {
        match self {
            Self::EvBatteryPreconditionEnabled => vehicle.ev_battery_precondition_enabled,
            Self::AirControlIsOn => vehicle.air_control_is_on,
        }
    }

    pub fn set(&self, vehicle: &mut Vehicle, value: bool) {
        match self {
            Self::EvBatteryPreconditionEnabled => {
                vehicle.ev_battery_precondition_enabled = Some(value)
            }
            Self::AirControlIsOn => vehicle.air_control_is_on = Some(value),
        }
    }

    /// A vehicle supports a feature when it reports the flag at all.
    pub fn is_supported(&self, vehicle: &Vehicle) -> bool {
        self.get(vehicle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_toggle_get_set_mapping() {
        let mut vehicle = Vehicle::new("v1", "Niro EV");
        assert_eq!(
            FeatureToggle::EvBatteryPreconditionEnabled.get(&vehicle),
            None
        );

        FeatureToggle::EvBatteryPreconditionEnabled.set(&mut vehicle, true);
        assert_eq!(vehicle.ev_battery_precondition_enabled, Some(true));
        assert_eq!(vehicle.air_control_is_on, None);

        FeatureToggle::AirControlIsOn.set(&mut vehicle, false);
        assert_eq!(vehicle.air_control_is_on, Some(false));
    }

    #[test]
    fn test_is_supported_requires_present_flag() {
        let mut vehicle = Vehicle::new("v1", "Niro EV");
        assert!(!FeatureToggle::EvBatteryPreconditionEnabled.is_supported(&vehicle));

        vehicle.ev_battery_precondition_enabled = Some(false);
        assert!(FeatureToggle::EvBatteryPreconditionEnabled.is_supported(&vehicle));
    }

    #[test]
    fn test_display_matches_wire_key() {
        for toggle in FeatureToggle::iter() {
            assert_eq!(toggle.to_string(), toggle.key());
        }
    }
}
