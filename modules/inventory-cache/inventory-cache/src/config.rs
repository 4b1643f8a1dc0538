use serde::{Deserialize, Serialize};

/// Configuration for the inventory cache module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryCacheConfig {
    /// Capacity of each store's change-notification channel. Slow
    /// subscribers that fall more than this many events behind observe a
    /// lag error and should resynchronize from the store.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_event_channel_capacity() -> usize {
    256
}

impl Default for InventoryCacheConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::InventoryCacheConfig;

    #[test]
    fn empty_config_uses_defaults() {
        let config: InventoryCacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.event_channel_capacity, InventoryCacheConfig::default().event_channel_capacity);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"event_channel_capacity": 16, "unknown": true}"#;
        assert!(serde_json::from_str::<InventoryCacheConfig>(raw).is_err());
    }
}
