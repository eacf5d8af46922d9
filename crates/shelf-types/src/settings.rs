//! Server settings records.

use serde::{Deserialize, Serialize};

use crate::{Record, StoreResult};

/// The default server settings payload seeded on first startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub id: String,
    pub config: SettingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    pub version: u32,
    pub card_size: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            id: "server-settings".to_string(),
            config: SettingsConfig { version: 1, card_size: "md".to_string() },
        }
    }
}

impl ServerSettings {
    pub fn to_record(&self) -> StoreResult<Record> {
        Record::from_serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_record() {
        let record = ServerSettings::default().to_record().unwrap();
        assert_eq!(record.id(), Some("server-settings"));
        let config = record.get("config").unwrap();
        assert_eq!(config["version"], 1);
        assert_eq!(config["cardSize"], "md");
    }
}
