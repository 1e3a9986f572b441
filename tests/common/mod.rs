//! Shared fixture: one in-memory provider installed for the whole test binary.

#![allow(dead_code)]

use std::sync::Arc;

use once_cell::sync::Lazy;
use uia_bridge::provider::memory::MemoryProvider;
use uia_bridge::Automation;

static PROVIDER: Lazy<Arc<MemoryProvider>> = Lazy::new(|| {
    let provider = Arc::new(MemoryProvider::new());
    Automation::install(provider.clone());
    provider
});

/// The installed provider. Tests share it and keep to their own documents.
pub fn provider() -> &'static MemoryProvider {
    &PROVIDER
}
