use std::env;

use serde::Deserialize;

/// Which provider backs the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Platform accessibility API (UI Automation on Windows)
    Native,
    /// In-process simulation
    Memory,
}

impl ProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "native" | "uia" | "windows" => Some(Self::Native),
            "memory" | "mock" | "simulated" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self::Native
        } else {
            Self::Memory
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// `tracing` filter directive
    pub log_filter: String,
    pub provider: ProviderKind,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let provider = match env::var("UIA_BRIDGE_PROVIDER") {
            Ok(value) => ProviderKind::parse(&value).unwrap_or_else(|| {
                tracing::warn!("Unknown provider kind: {}", value);
                ProviderKind::default()
            }),
            Err(_) => ProviderKind::default(),
        };

        Self {
            log_filter: env::var("UIA_BRIDGE_LOG").unwrap_or_else(|_| "info".to_string()),
            provider,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            provider: ProviderKind::default(),
        }
    }
}
