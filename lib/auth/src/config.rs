//! Session manager configuration.

use serde::Deserialize;

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How close to expiry, in minutes, a session counts as expiring soon.
    #[serde(default = "default_expiry_warning_minutes")]
    pub expiry_warning_minutes: i64,

    /// Interval between background expiry checks, in seconds.
    #[serde(default = "default_expiry_check_interval_seconds")]
    pub expiry_check_interval_seconds: u64,
}

fn default_expiry_warning_minutes() -> i64 {
    5
}

fn default_expiry_check_interval_seconds() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_warning_minutes: default_expiry_warning_minutes(),
            expiry_check_interval_seconds: default_expiry_check_interval_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.expiry_warning_minutes, 5);
        assert_eq!(config.expiry_check_interval_seconds, 60);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"expiry_warning_minutes": 10}"#).expect("deserialize");
        assert_eq!(config.expiry_warning_minutes, 10);
        assert_eq!(config.expiry_check_interval_seconds, 60);
    }
}
