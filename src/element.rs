use std::fmt;

use crate::automation::Automation;
use crate::error::{native_call, Result};
use crate::native::same_element;
use crate::provider::ElementHandle;
use crate::schema::{self, AutomationProperty};
use crate::value::AutomationValue;

/// Thin wrapper over a native element handle.
///
/// Only wrap/unwrap, identity and property reads are provided here; pattern
/// access lives with the pattern wrappers.
#[derive(Clone)]
pub struct AutomationElement {
    native: ElementHandle,
}

impl AutomationElement {
    pub fn from_native(native: ElementHandle) -> Self {
        Self { native }
    }

    /// A null handle wraps to `None`.
    pub fn wrap(native: Option<ElementHandle>) -> Option<Self> {
        native.map(Self::from_native)
    }

    pub fn native(&self) -> &ElementHandle {
        &self.native
    }

    /// Desktop root element as reported by the installed provider.
    pub fn root() -> Result<Self> {
        let provider = Automation::provider()?;
        let native = native_call("GetRootElement", || provider.root_element())?;
        Ok(Self::from_native(native))
    }

    pub fn runtime_id(&self) -> Result<Vec<i32>> {
        native_call("GetRuntimeId", || self.native.runtime_id())
    }

    /// Current value of `property`, converted through the property schema.
    pub fn current_property_value(&self, property: &AutomationProperty) -> Result<AutomationValue> {
        let raw = native_call("GetCurrentPropertyValue", || {
            self.native.property_value(property.id())
        })?;
        Ok(schema::convert(schema::lookup(property.id()), raw))
    }
}

impl PartialEq for AutomationElement {
    fn eq(&self, other: &Self) -> bool {
        same_element(&self.native, &other.native)
    }
}

impl fmt::Debug for AutomationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationElement")
            .field("runtime_id", &self.native.runtime_id().ok())
            .finish()
    }
}
