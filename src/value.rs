use crate::element::AutomationElement;
use crate::native::NativeValue;
use crate::types::{
    BulletStyle, CapStyle, ControlType, Culture, DockPosition, EnumKind, EnumValue,
    ExpandCollapseState, HorizontalTextAlignment, OrientationType, Point, Rect, RowOrColumnMajor,
    TextDecorationLineStyle, ToggleState, WindowInteractionState, WindowVisualState,
};

/// Property or attribute value after conversion from its native form.
#[derive(Debug, Clone, PartialEq)]
pub enum AutomationValue {
    Empty,
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    Rect(Rect),
    Point(Point),
    Culture(Culture),
    ControlType(ControlType),
    Enum(EnumValue),
    /// Element-typed value; `None` is a null element reference.
    Element(Option<AutomationElement>),
    /// The provider does not support this property on this element.
    NotSupported,
    /// The text attribute is not uniform across the range.
    Mixed,
}

impl AutomationValue {
    /// Best-effort conversion used when no schema entry describes the value:
    /// primitives pass through, element handles are wrapped.
    pub fn from_native(raw: NativeValue) -> Self {
        match raw {
            NativeValue::Empty => Self::Empty,
            NativeValue::Bool(v) => Self::Bool(v),
            NativeValue::Int(v) => Self::Int(v),
            NativeValue::Double(v) => Self::Double(v),
            NativeValue::String(v) => Self::String(v),
            NativeValue::IntArray(v) => Self::IntArray(v),
            NativeValue::DoubleArray(v) => Self::DoubleArray(v),
            NativeValue::Element(handle) => {
                Self::Element(Some(AutomationElement::from_native(handle)))
            }
            NativeValue::NotSupported => Self::NotSupported,
            NativeValue::Mixed => Self::Mixed,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported)
    }

    pub fn as_enum(&self, kind: EnumKind) -> Option<EnumValue> {
        match self {
            Self::Enum(e) if e.kind() == kind => Some(*e),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&AutomationElement> {
        match self {
            Self::Element(Some(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<bool> for AutomationValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AutomationValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AutomationValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for AutomationValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AutomationValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Rect> for AutomationValue {
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

impl From<Point> for AutomationValue {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<Culture> for AutomationValue {
    fn from(value: Culture) -> Self {
        Self::Culture(value)
    }
}

impl From<ControlType> for AutomationValue {
    fn from(value: ControlType) -> Self {
        Self::ControlType(value)
    }
}

impl From<EnumValue> for AutomationValue {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<AutomationElement> for AutomationValue {
    fn from(value: AutomationElement) -> Self {
        Self::Element(Some(value))
    }
}

macro_rules! enum_into_value {
    ($($name:ident),+ $(,)?) => {
        $(
            impl From<$name> for AutomationValue {
                fn from(value: $name) -> Self {
                    Self::Enum(EnumValue::from(value))
                }
            }
        )+
    };
}

enum_into_value!(
    OrientationType,
    DockPosition,
    ExpandCollapseState,
    WindowVisualState,
    WindowInteractionState,
    RowOrColumnMajor,
    ToggleState,
    HorizontalTextAlignment,
    BulletStyle,
    CapStyle,
    TextDecorationLineStyle,
);
