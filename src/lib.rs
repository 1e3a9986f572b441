//! Client-side marshalling layer for UI Automation.
//!
//! Wraps native condition, element and text range handles from an
//! [`AutomationProvider`](provider::AutomationProvider) in typed values, converts
//! raw property and text attribute values through a fixed schema, and maps native
//! failure codes onto [`AutomationError`].

pub mod automation;
pub mod condition;
pub mod config;
pub mod element;
pub mod error;
pub mod logging;
pub mod native;
pub mod provider;
pub mod schema;
pub mod text_range;
pub mod types;
pub mod value;

pub use automation::Automation;
pub use condition::{
    AndCondition, BoolCondition, Condition, ConditionKind, ConditionSnapshot, NotCondition,
    OrCondition, PropertyCondition, PropertyConditionFlags,
};
pub use config::{BridgeConfig, ProviderKind};
pub use element::AutomationElement;
pub use error::{AutomationError, ErrorKind, Result};
pub use schema::{AutomationProperty, AutomationTextAttribute};
pub use text_range::{TextPatternRange, TextPatternRangeEndpoint, TextUnit};
pub use types::{Culture, ControlType, EnumKind, EnumValue, Point, Rect};
pub use value::AutomationValue;
