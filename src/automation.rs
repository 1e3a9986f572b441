use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::BridgeConfig;
use crate::error::{translate, Result};
use crate::native::NativeStatus;
use crate::provider::{create_provider, AutomationProvider};

static PROVIDER: OnceCell<Arc<dyn AutomationProvider>> = OnceCell::new();

/// Process-wide entry point to the installed provider.
pub struct Automation;

impl Automation {
    /// Install the provider used by every wrapper in this process.
    ///
    /// Only the first installation takes effect; returns `false` if a provider was
    /// already installed.
    pub fn install(provider: Arc<dyn AutomationProvider>) -> bool {
        let installed = PROVIDER.set(provider).is_ok();
        if !installed {
            tracing::warn!("Automation provider already installed; keeping the existing one");
        }
        installed
    }

    /// Create and install the provider selected by `config`. Fails if a
    /// provider is already installed.
    pub fn install_from_config(config: &BridgeConfig) -> anyhow::Result<()> {
        let provider = create_provider(config)?;
        tracing::info!("Installing {:?} automation provider", config.provider);
        if !Self::install(provider) {
            anyhow::bail!("An automation provider is already installed");
        }
        Ok(())
    }

    pub fn is_installed() -> bool {
        PROVIDER.get().is_some()
    }

    /// The installed provider. Fails the same way an uninitialized native
    /// automation client does.
    pub fn provider() -> Result<&'static Arc<dyn AutomationProvider>> {
        PROVIDER
            .get()
            .ok_or_else(|| translate(NativeStatus::NOT_INITIALIZED))
    }
}
