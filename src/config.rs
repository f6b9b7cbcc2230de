use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, time::Duration};

use crate::{Error, IntegrationResult};

/// Integration-level configuration, usually loaded from the host's config
/// entry. Credentials stay plain strings at this layer; the API client wraps
/// them in secrets when it builds its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub username: String,

    pub password: String,

    #[serde(default)]
    pub pin: Option<String>,

    #[serde(default = "default_region")]
    pub region: Region,

    #[serde(default = "default_brand")]
    pub brand: Brand,

    #[serde(default = "default_scan_interval", with = "duration_ms")]
    pub scan_interval: Duration,

    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    Europe,
    Canada,
    Usa,
    China,
    Australia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Brand {
    Kia,
    Hyundai,
    Genesis,
}

fn default_region() -> Region {
    Region::Europe
}

fn default_brand() -> Brand {
    Brand::Kia
}

fn default_scan_interval() -> Duration {
    Duration::from_millis(30 * 60 * 1000)
}

fn default_event_buffer_size() -> usize {
    100
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> IntegrationResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Internal(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Internal(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: IntegrationConfig = serde_json::from_value(json!({
            "username": "driver@example.com",
            "password": "hunter2",
        }))
        .unwrap();

        assert_eq!(config.region, Region::Europe);
        assert_eq!(config.brand, Brand::Kia);
        assert_eq!(config.pin, None);
        assert_eq!(config.scan_interval, Duration::from_secs(30 * 60));
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_scan_interval_roundtrips_as_millis() {
        let config: IntegrationConfig = serde_json::from_value(json!({
            "username": "driver@example.com",
            "password": "hunter2",
            "region": "usa",
            "brand": "hyundai",
            "scan_interval": 5000,
        }))
        .unwrap();
        assert_eq!(config.scan_interval, Duration::from_secs(5));
        assert_eq!(config.region, Region::Usa);
        assert_eq!(config.brand, Brand::Hyundai);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["scan_interval"], json!(5000));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"username": "driver@example.com", "password": "hunter2", "brand": "genesis"}}"#
        )
        .unwrap();

        let config: IntegrationConfig = from_file(file.path()).unwrap();
        assert_eq!(config.brand, Brand::Genesis);
    }

    #[test]
    fn test_from_file_missing_path_is_internal_error() {
        let result: IntegrationResult<IntegrationConfig> = from_file("/nonexistent/config.json");
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
