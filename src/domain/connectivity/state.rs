//! Connectivity state as reported by the device's reachability collaborator

use serde::{Deserialize, Serialize};

/// Network reachability of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    #[default]
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_online() {
        assert_eq!(ConnectivityState::default(), ConnectivityState::Online);
        assert!(ConnectivityState::Online.is_online());
        assert!(!ConnectivityState::Offline.is_online());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ConnectivityState::Offline).unwrap();
        assert_eq!(json, "\"offline\"");

        let state: ConnectivityState = serde_json::from_str("\"online\"").unwrap();
        assert_eq!(state, ConnectivityState::Online);
    }
}
