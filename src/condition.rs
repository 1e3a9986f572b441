//! Condition model: boolean predicates over automation elements.
//!
//! A [`Condition`] is a closed sum type reconstructed from native handles by
//! [`Condition::wrap`]. Composite conditions never cache their children; every read
//! re-wraps whatever the native tree holds.

use bitflags::bitflags;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::automation::Automation;
use crate::error::{native_call, AutomationError, Result};
use crate::native::{from_native_bool, to_native};
use crate::provider::{
    ConditionHandle, NativeCompositeCondition, NativeNotCondition, NativePropertyCondition,
};
use crate::schema::{self, AutomationProperty};
use crate::value::AutomationValue;

bitflags! {
    /// Match semantics of a property condition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyConditionFlags: u32 {
        const IGNORE_CASE = 0x1;
        const MATCH_SUBSTRING = 0x2;
    }
}

static TRUE_CONDITION: OnceCell<Condition> = OnceCell::new();
static FALSE_CONDITION: OnceCell<Condition> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConditionKind {
    Bool,
    And,
    Or,
    Not,
    Property,
}

#[derive(Debug, Clone)]
pub enum Condition {
    Bool(BoolCondition),
    And(AndCondition),
    Or(OrCondition),
    Not(NotCondition),
    Property(PropertyCondition),
}

impl Condition {
    /// Classify a native handle. Probes run in the order Bool, And, Or, Not,
    /// Property and the first match wins.
    pub fn wrap(native: ConditionHandle) -> Result<Self> {
        let condition = if native.as_bool_condition().is_some() {
            Self::Bool(BoolCondition { native })
        } else if native.as_and_condition().is_some() {
            Self::And(AndCondition { native })
        } else if native.as_or_condition().is_some() {
            Self::Or(OrCondition { native })
        } else if native.as_not_condition().is_some() {
            Self::Not(NotCondition { native })
        } else if native.as_property_condition().is_some() {
            Self::Property(PropertyCondition { native })
        } else {
            tracing::debug!(?native, "Native condition answered no capability query");
            return Err(AutomationError::UnsupportedVariant);
        };
        tracing::trace!(kind = ?condition.kind(), "Wrapped native condition");
        Ok(condition)
    }

    /// Null wraps to [`AutomationError::UnsupportedVariant`], like any unclassifiable handle.
    pub fn wrap_optional(native: Option<ConditionHandle>) -> Result<Self> {
        native
            .ok_or(AutomationError::UnsupportedVariant)
            .and_then(Self::wrap)
    }

    pub fn wrap_all(natives: Vec<ConditionHandle>) -> Result<Vec<Self>> {
        natives.into_iter().map(Self::wrap).collect()
    }

    /// Native handle of `condition`; `None` is passed through as the null handle.
    pub fn unwrap(condition: Option<&Condition>) -> Option<ConditionHandle> {
        condition.map(|c| c.native().clone())
    }

    pub fn unwrap_all(conditions: &[Condition]) -> Vec<ConditionHandle> {
        conditions.iter().map(|c| c.native().clone()).collect()
    }

    pub fn native(&self) -> &ConditionHandle {
        match self {
            Self::Bool(c) => &c.native,
            Self::And(c) => &c.native,
            Self::Or(c) => &c.native,
            Self::Not(c) => &c.native,
            Self::Property(c) => &c.native,
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Bool(_) => ConditionKind::Bool,
            Self::And(_) => ConditionKind::And,
            Self::Or(_) => ConditionKind::Or,
            Self::Not(_) => ConditionKind::Not,
            Self::Property(_) => ConditionKind::Property,
        }
    }

    /// Shared constant-true condition, created on first use.
    pub fn true_condition() -> Result<Self> {
        TRUE_CONDITION
            .get_or_try_init(|| BoolCondition::create(true).map(Self::Bool))
            .cloned()
    }

    /// Shared constant-false condition, created on first use.
    pub fn false_condition() -> Result<Self> {
        FALSE_CONDITION
            .get_or_try_init(|| BoolCondition::create(false).map(Self::Bool))
            .cloned()
    }

    pub fn and(conditions: &[Condition]) -> Result<Self> {
        AndCondition::new(conditions).map(Self::And)
    }

    pub fn or(conditions: &[Condition]) -> Result<Self> {
        OrCondition::new(conditions).map(Self::Or)
    }

    pub fn not(condition: &Condition) -> Result<Self> {
        NotCondition::new(condition).map(Self::Not)
    }

    pub fn property(property: &AutomationProperty, value: impl Into<AutomationValue>) -> Result<Self> {
        PropertyCondition::new(property, value).map(Self::Property)
    }

    /// Serializable view of the whole tree, read from the native side.
    pub fn snapshot(&self) -> Result<ConditionSnapshot> {
        Ok(match self {
            Self::Bool(c) => ConditionSnapshot::Bool { value: c.value()? },
            Self::Not(c) => ConditionSnapshot::Not {
                condition: Box::new(c.condition()?.snapshot()?),
            },
            Self::And(c) => ConditionSnapshot::And {
                conditions: snapshot_all(&c.conditions()?)?,
            },
            Self::Or(c) => ConditionSnapshot::Or {
                conditions: snapshot_all(&c.conditions()?)?,
            },
            Self::Property(c) => {
                let property_id = c.property_id()?;
                ConditionSnapshot::Property {
                    property_id,
                    property: AutomationProperty::lookup_by_id(property_id).map(|p| p.name()),
                    value: format!("{:?}", c.value()?),
                    flags: c.flags()?.bits(),
                }
            }
        })
    }
}

fn snapshot_all(conditions: &[Condition]) -> Result<Vec<ConditionSnapshot>> {
    conditions.iter().map(Condition::snapshot).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionSnapshot {
    Bool {
        value: bool,
    },
    Not {
        condition: Box<ConditionSnapshot>,
    },
    And {
        conditions: Vec<ConditionSnapshot>,
    },
    Or {
        conditions: Vec<ConditionSnapshot>,
    },
    Property {
        property_id: i32,
        property: Option<&'static str>,
        value: String,
        flags: u32,
    },
}

#[derive(Debug, Clone)]
pub struct BoolCondition {
    native: ConditionHandle,
}

impl BoolCondition {
    fn create(value: bool) -> Result<Self> {
        let provider = Automation::provider()?;
        let native = if value {
            native_call("CreateTrueCondition", || provider.create_true_condition())?
        } else {
            native_call("CreateFalseCondition", || provider.create_false_condition())?
        };
        Ok(Self { native })
    }

    pub fn value(&self) -> Result<bool> {
        let capability = self
            .native
            .as_bool_condition()
            .ok_or(AutomationError::UnsupportedVariant)?;
        native_call("BoolCondition::BooleanValue", || capability.boolean_value()).map(from_native_bool)
    }
}

fn composite_children(
    operation: &'static str,
    capability: Option<&dyn NativeCompositeCondition>,
) -> Result<Vec<Condition>> {
    let capability = capability.ok_or(AutomationError::UnsupportedVariant)?;
    let children = native_call(operation, || capability.children())?;
    Condition::wrap_all(children)
}

#[derive(Debug, Clone)]
pub struct AndCondition {
    native: ConditionHandle,
}

impl AndCondition {
    pub fn new(conditions: &[Condition]) -> Result<Self> {
        let provider = Automation::provider()?;
        let natives = Condition::unwrap_all(conditions);
        let native = native_call("CreateAndConditionFromArray", || {
            provider.create_and_condition(&natives)
        })?;
        Ok(Self { native })
    }

    /// Children in construction order, freshly wrapped.
    pub fn conditions(&self) -> Result<Vec<Condition>> {
        composite_children("AndCondition::GetChildren", self.native.as_and_condition())
    }
}

#[derive(Debug, Clone)]
pub struct OrCondition {
    native: ConditionHandle,
}

impl OrCondition {
    pub fn new(conditions: &[Condition]) -> Result<Self> {
        let provider = Automation::provider()?;
        let natives = Condition::unwrap_all(conditions);
        let native = native_call("CreateOrConditionFromArray", || {
            provider.create_or_condition(&natives)
        })?;
        Ok(Self { native })
    }

    /// Children in construction order, freshly wrapped.
    pub fn conditions(&self) -> Result<Vec<Condition>> {
        composite_children("OrCondition::GetChildren", self.native.as_or_condition())
    }
}

#[derive(Debug, Clone)]
pub struct NotCondition {
    native: ConditionHandle,
}

impl NotCondition {
    pub fn new(condition: &Condition) -> Result<Self> {
        let provider = Automation::provider()?;
        let native = native_call("CreateNotCondition", || {
            provider.create_not_condition(condition.native())
        })?;
        Ok(Self { native })
    }

    fn capability(&self) -> Result<&dyn NativeNotCondition> {
        self.native
            .as_not_condition()
            .ok_or(AutomationError::UnsupportedVariant)
    }

    pub fn condition(&self) -> Result<Condition> {
        let capability = self.capability()?;
        let child = native_call("NotCondition::GetChild", || capability.child())?;
        Condition::wrap(child)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyCondition {
    native: ConditionHandle,
}

impl PropertyCondition {
    pub fn new(property: &AutomationProperty, value: impl Into<AutomationValue>) -> Result<Self> {
        Self::with_flags(property, value, PropertyConditionFlags::empty())
    }

    pub fn with_flags(
        property: &AutomationProperty,
        value: impl Into<AutomationValue>,
        flags: PropertyConditionFlags,
    ) -> Result<Self> {
        if property.id() == 0 {
            return Err(AutomationError::invalid_argument("property"));
        }
        let provider = Automation::provider()?;
        let value = to_native(&value.into());
        let native = native_call("CreatePropertyConditionEx", || {
            provider.create_property_condition(property.id(), value, flags.bits())
        })?;
        Ok(Self { native })
    }

    fn capability(&self) -> Result<&dyn NativePropertyCondition> {
        self.native
            .as_property_condition()
            .ok_or(AutomationError::UnsupportedVariant)
    }

    pub fn property_id(&self) -> Result<i32> {
        let capability = self.capability()?;
        native_call("PropertyCondition::PropertyId", || capability.property_id())
    }

    /// Schema entry for the property, or `None` for an id outside the schema.
    pub fn property(&self) -> Result<Option<AutomationProperty>> {
        Ok(AutomationProperty::lookup_by_id(self.property_id()?))
    }

    /// Condition value, converted through the property schema.
    pub fn value(&self) -> Result<AutomationValue> {
        let capability = self.capability()?;
        let property_id = native_call("PropertyCondition::PropertyId", || capability.property_id())?;
        let raw = native_call("PropertyCondition::PropertyValue", || capability.property_value())?;
        Ok(schema::convert(schema::lookup(property_id), raw))
    }

    pub fn flags(&self) -> Result<PropertyConditionFlags> {
        let capability = self.capability()?;
        native_call("PropertyCondition::PropertyConditionFlags", || {
            capability.property_condition_flags()
        })
        .map(PropertyConditionFlags::from_bits_retain)
    }
}
