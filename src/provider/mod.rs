//! Native automation provider abstraction.
//!
//! A provider exposes factories for conditions and access to elements and text
//! ranges through opaque handles. Capability queries on a condition handle play the
//! role of interface queries: each returns `Some` only for the variant the handle
//! actually implements.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::config::{BridgeConfig, ProviderKind};
use crate::native::{NativeBool, NativeResult, NativeValue};

pub mod memory;

#[cfg(target_os = "windows")]
pub mod windows;

pub type ConditionHandle = Arc<dyn NativeCondition>;
pub type ElementHandle = Arc<dyn NativeElement>;
pub type TextRangeHandle = Arc<dyn NativeTextRange>;

/// Factory side of the provider.
pub trait AutomationProvider: Send + Sync {
    fn create_true_condition(&self) -> NativeResult<ConditionHandle>;

    fn create_false_condition(&self) -> NativeResult<ConditionHandle>;

    fn create_and_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle>;

    fn create_or_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle>;

    fn create_not_condition(&self, condition: &ConditionHandle) -> NativeResult<ConditionHandle>;

    fn create_property_condition(
        &self,
        property_id: i32,
        value: NativeValue,
        flags: u32,
    ) -> NativeResult<ConditionHandle>;

    fn root_element(&self) -> NativeResult<ElementHandle>;
}

/// Native condition handle. Probes default to "not this variant".
pub trait NativeCondition: Send + Sync + fmt::Debug {
    fn as_bool_condition(&self) -> Option<&dyn NativeBoolCondition> {
        None
    }

    fn as_and_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        None
    }

    fn as_or_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        None
    }

    fn as_not_condition(&self) -> Option<&dyn NativeNotCondition> {
        None
    }

    fn as_property_condition(&self) -> Option<&dyn NativePropertyCondition> {
        None
    }

    /// Concrete object behind the handle, for providers that unwrap handles
    /// they created themselves.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

pub trait NativeBoolCondition {
    fn boolean_value(&self) -> NativeResult<NativeBool>;
}

pub trait NativeCompositeCondition {
    fn children(&self) -> NativeResult<Vec<ConditionHandle>>;
}

pub trait NativeNotCondition {
    fn child(&self) -> NativeResult<ConditionHandle>;
}

pub trait NativePropertyCondition {
    fn property_id(&self) -> NativeResult<i32>;

    fn property_value(&self) -> NativeResult<NativeValue>;

    fn property_condition_flags(&self) -> NativeResult<u32>;
}

pub trait NativeElement: Send + Sync {
    fn runtime_id(&self) -> NativeResult<Vec<i32>>;

    fn property_value(&self, property_id: i32) -> NativeResult<NativeValue>;

    fn as_any(&self) -> &dyn Any;
}

/// Native text range. Mutating operations take `&self`; the provider owns the
/// endpoint state.
pub trait NativeTextRange: Send + Sync {
    fn clone_range(&self) -> NativeResult<TextRangeHandle>;

    fn compare(&self, range: &dyn NativeTextRange) -> NativeResult<NativeBool>;

    fn compare_endpoints(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<i32>;

    fn expand_to_enclosing_unit(&self, unit: i32) -> NativeResult<()>;

    fn find_attribute(
        &self,
        attribute_id: i32,
        value: NativeValue,
        backward: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>>;

    fn find_text(
        &self,
        text: &str,
        backward: NativeBool,
        ignore_case: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>>;

    fn attribute_value(&self, attribute_id: i32) -> NativeResult<NativeValue>;

    /// Flat `[x, y, w, h, ...]` list; `None` for a null array.
    fn bounding_rectangles(&self) -> NativeResult<Option<Vec<f64>>>;

    fn enclosing_element(&self) -> NativeResult<Option<ElementHandle>>;

    fn text(&self, max_length: i32) -> NativeResult<String>;

    fn move_by(&self, unit: i32, count: i32) -> NativeResult<i32>;

    fn move_endpoint_by_unit(&self, endpoint: i32, unit: i32, count: i32) -> NativeResult<i32>;

    fn move_endpoint_by_range(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<()>;

    fn select(&self) -> NativeResult<()>;

    fn add_to_selection(&self) -> NativeResult<()>;

    fn remove_from_selection(&self) -> NativeResult<()>;

    fn scroll_into_view(&self, align_to_top: NativeBool) -> NativeResult<()>;

    fn children(&self) -> NativeResult<Option<Vec<ElementHandle>>>;

    fn as_any(&self) -> &dyn Any;
}

/// Create the provider selected by `config`.
pub fn create_provider(config: &BridgeConfig) -> Result<Arc<dyn AutomationProvider>> {
    match config.provider {
        ProviderKind::Memory => Ok(Arc::new(memory::MemoryProvider::new())),
        ProviderKind::Native => {
            #[cfg(target_os = "windows")]
            {
                Ok(Arc::new(windows::WindowsProvider::new()?))
            }

            #[cfg(not(target_os = "windows"))]
            {
                Err(anyhow::anyhow!("No native automation provider on this platform"))
            }
        }
    }
}
