//! Property and text attribute schema.
//!
//! Every known identifier maps to the type its values carry and, where the raw
//! native shape differs from that type, a converter. The table is built once on
//! first use and never changes afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::element::AutomationElement;
use crate::native::{point_from_doubles, unflatten_rects, NativeValue};
use crate::types::{ControlType, Culture, EnumKind, EnumValue};
use crate::value::AutomationValue;

/// Shape of the values a property carries once converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    Bool,
    Int,
    Double,
    String,
    IntArray,
    DoubleArray,
    Rect,
    Point,
    Culture,
    ControlType,
    Enum(EnumKind),
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdentifierKind {
    Property,
    TextAttribute,
}

/// Returns `None` when the raw value does not have the expected shape; the
/// generic conversion is used instead.
pub type Converter = fn(&NativeValue) -> Option<AutomationValue>;

#[derive(Debug, Clone, Copy)]
pub struct PropertyTypeInfo {
    pub id: i32,
    pub name: &'static str,
    pub kind: IdentifierKind,
    pub value_type: ValueType,
    pub converter: Option<Converter>,
}

fn convert_rect(raw: &NativeValue) -> Option<AutomationValue> {
    match raw {
        NativeValue::DoubleArray(values) => unflatten_rects(values)
            .first()
            .copied()
            .map(AutomationValue::Rect),
        _ => None,
    }
}

fn convert_point(raw: &NativeValue) -> Option<AutomationValue> {
    match raw {
        NativeValue::DoubleArray(values) => point_from_doubles(values).map(AutomationValue::Point),
        _ => None,
    }
}

fn convert_culture(raw: &NativeValue) -> Option<AutomationValue> {
    match raw {
        NativeValue::Int(lcid) => Some(AutomationValue::Culture(Culture::from_native(*lcid))),
        _ => None,
    }
}

fn convert_control_type(raw: &NativeValue) -> Option<AutomationValue> {
    match raw {
        NativeValue::Int(id) => Some(AutomationValue::ControlType(ControlType::from_id(*id))),
        _ => None,
    }
}

fn convert_element(raw: &NativeValue) -> Option<AutomationValue> {
    match raw {
        NativeValue::Empty => Some(AutomationValue::Element(None)),
        NativeValue::Element(handle) => Some(AutomationValue::Element(Some(
            AutomationElement::from_native(handle.clone()),
        ))),
        _ => None,
    }
}

macro_rules! schema_table {
    ($($kind:ident $id:literal $name:literal => $ty:expr, $conv:expr;)+) => {
        const SCHEMA: &[PropertyTypeInfo] = &[
            $(PropertyTypeInfo {
                id: $id,
                name: $name,
                kind: IdentifierKind::$kind,
                value_type: $ty,
                converter: $conv,
            },)+
        ];
    };
}

use ValueType as T;

schema_table! {
    Property 30000 "RuntimeId" => T::IntArray, None;
    Property 30001 "BoundingRectangle" => T::Rect, Some(convert_rect);
    Property 30002 "ProcessId" => T::Int, None;
    Property 30003 "ControlType" => T::ControlType, Some(convert_control_type);
    Property 30004 "LocalizedControlType" => T::String, None;
    Property 30005 "Name" => T::String, None;
    Property 30006 "AcceleratorKey" => T::String, None;
    Property 30007 "AccessKey" => T::String, None;
    Property 30008 "HasKeyboardFocus" => T::Bool, None;
    Property 30009 "IsKeyboardFocusable" => T::Bool, None;
    Property 30010 "IsEnabled" => T::Bool, None;
    Property 30011 "AutomationId" => T::String, None;
    Property 30012 "ClassName" => T::String, None;
    Property 30013 "HelpText" => T::String, None;
    Property 30014 "ClickablePoint" => T::Point, Some(convert_point);
    Property 30015 "Culture" => T::Culture, Some(convert_culture);
    Property 30016 "IsControlElement" => T::Bool, None;
    Property 30017 "IsContentElement" => T::Bool, None;
    Property 30018 "LabeledBy" => T::Element, Some(convert_element);
    Property 30019 "IsPassword" => T::Bool, None;
    Property 30020 "NativeWindowHandle" => T::Int, None;
    Property 30021 "ItemType" => T::String, None;
    Property 30022 "IsOffscreen" => T::Bool, None;
    Property 30023 "Orientation" => T::Enum(EnumKind::Orientation), None;
    Property 30024 "FrameworkId" => T::String, None;
    Property 30025 "IsRequiredForForm" => T::Bool, None;
    Property 30026 "ItemStatus" => T::String, None;
    Property 30045 "Value.Value" => T::String, None;
    Property 30046 "Value.IsReadOnly" => T::Bool, None;
    Property 30069 "Dock.DockPosition" => T::Enum(EnumKind::DockPosition), None;
    Property 30070 "ExpandCollapse.ExpandCollapseState" => T::Enum(EnumKind::ExpandCollapseState), None;
    Property 30075 "Window.WindowVisualState" => T::Enum(EnumKind::WindowVisualState), None;
    Property 30076 "Window.WindowInteractionState" => T::Enum(EnumKind::WindowInteractionState), None;
    Property 30079 "SelectionItem.IsSelected" => T::Bool, None;
    Property 30080 "SelectionItem.SelectionContainer" => T::Element, Some(convert_element);
    Property 30083 "Table.RowOrColumnMajor" => T::Enum(EnumKind::RowOrColumnMajor), None;
    Property 30086 "Toggle.ToggleState" => T::Enum(EnumKind::ToggleState), None;
    TextAttribute 40001 "BackgroundColor" => T::Int, None;
    TextAttribute 40002 "BulletStyle" => T::Enum(EnumKind::BulletStyle), None;
    TextAttribute 40003 "CapStyle" => T::Enum(EnumKind::CapStyle), None;
    TextAttribute 40004 "Culture" => T::Culture, Some(convert_culture);
    TextAttribute 40005 "FontName" => T::String, None;
    TextAttribute 40006 "FontSize" => T::Double, None;
    TextAttribute 40007 "FontWeight" => T::Int, None;
    TextAttribute 40008 "ForegroundColor" => T::Int, None;
    TextAttribute 40009 "HorizontalTextAlignment" => T::Enum(EnumKind::HorizontalTextAlignment), None;
    TextAttribute 40010 "IndentationFirstLine" => T::Double, None;
    TextAttribute 40013 "IsHidden" => T::Bool, None;
    TextAttribute 40014 "IsItalic" => T::Bool, None;
    TextAttribute 40015 "IsReadOnly" => T::Bool, None;
    TextAttribute 40016 "IsSubscript" => T::Bool, None;
    TextAttribute 40017 "IsSuperscript" => T::Bool, None;
    TextAttribute 40026 "StrikethroughStyle" => T::Enum(EnumKind::TextDecorationLineStyle), None;
    TextAttribute 40027 "Tabs" => T::DoubleArray, None;
    TextAttribute 40030 "UnderlineStyle" => T::Enum(EnumKind::TextDecorationLineStyle), None;
}

static TABLE: Lazy<HashMap<i32, &'static PropertyTypeInfo>> =
    Lazy::new(|| SCHEMA.iter().map(|info| (info.id, info)).collect());

/// Schema entry for a property or text attribute id.
pub fn lookup(id: i32) -> Option<&'static PropertyTypeInfo> {
    TABLE.get(&id).copied()
}

/// Apply the conversion rules to a raw native value.
///
/// Provider sentinels are returned as they are, whatever the schema says.
pub fn convert(info: Option<&PropertyTypeInfo>, raw: NativeValue) -> AutomationValue {
    match raw {
        NativeValue::NotSupported => return AutomationValue::NotSupported,
        NativeValue::Mixed => return AutomationValue::Mixed,
        _ => {}
    }

    let Some(info) = info else {
        return AutomationValue::from_native(raw);
    };

    if let (ValueType::Enum(kind), NativeValue::Int(ordinal)) = (info.value_type, &raw) {
        return AutomationValue::Enum(EnumValue::new(kind, *ordinal));
    }

    info.converter
        .and_then(|convert| convert(&raw))
        .unwrap_or_else(|| AutomationValue::from_native(raw))
}

/// Element property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AutomationProperty {
    id: i32,
    name: &'static str,
}

impl AutomationProperty {
    pub const RUNTIME_ID: Self = Self::new(30000, "RuntimeId");
    pub const BOUNDING_RECTANGLE: Self = Self::new(30001, "BoundingRectangle");
    pub const PROCESS_ID: Self = Self::new(30002, "ProcessId");
    pub const CONTROL_TYPE: Self = Self::new(30003, "ControlType");
    pub const NAME: Self = Self::new(30005, "Name");
    pub const IS_ENABLED: Self = Self::new(30010, "IsEnabled");
    pub const AUTOMATION_ID: Self = Self::new(30011, "AutomationId");
    pub const CLASS_NAME: Self = Self::new(30012, "ClassName");
    pub const CLICKABLE_POINT: Self = Self::new(30014, "ClickablePoint");
    pub const CULTURE: Self = Self::new(30015, "Culture");
    pub const LABELED_BY: Self = Self::new(30018, "LabeledBy");
    pub const IS_OFFSCREEN: Self = Self::new(30022, "IsOffscreen");
    pub const ORIENTATION: Self = Self::new(30023, "Orientation");
    pub const VALUE: Self = Self::new(30045, "Value.Value");
    pub const DOCK_POSITION: Self = Self::new(30069, "Dock.DockPosition");
    pub const EXPAND_COLLAPSE_STATE: Self =
        Self::new(30070, "ExpandCollapse.ExpandCollapseState");
    pub const WINDOW_VISUAL_STATE: Self = Self::new(30075, "Window.WindowVisualState");
    pub const WINDOW_INTERACTION_STATE: Self =
        Self::new(30076, "Window.WindowInteractionState");
    pub const SELECTION_CONTAINER: Self = Self::new(30080, "SelectionItem.SelectionContainer");
    pub const ROW_OR_COLUMN_MAJOR: Self = Self::new(30083, "Table.RowOrColumnMajor");
    pub const TOGGLE_STATE: Self = Self::new(30086, "Toggle.ToggleState");

    const fn new(id: i32, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Identifier for an id outside the schema, e.g. a custom property
    /// registered with the provider.
    pub const fn custom(id: i32, name: &'static str) -> Self {
        Self::new(id, name)
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lookup_by_id(id: i32) -> Option<Self> {
        lookup(id)
            .filter(|info| info.kind == IdentifierKind::Property)
            .map(|info| Self::new(info.id, info.name))
    }

    pub fn by_name(name: &str) -> Option<Self> {
        SCHEMA
            .iter()
            .find(|info| info.kind == IdentifierKind::Property && info.name == name)
            .map(|info| Self::new(info.id, info.name))
    }
}

/// Text attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AutomationTextAttribute {
    id: i32,
    name: &'static str,
}

impl AutomationTextAttribute {
    pub const BACKGROUND_COLOR: Self = Self::new(40001, "BackgroundColor");
    pub const BULLET_STYLE: Self = Self::new(40002, "BulletStyle");
    pub const CAP_STYLE: Self = Self::new(40003, "CapStyle");
    pub const CULTURE: Self = Self::new(40004, "Culture");
    pub const FONT_NAME: Self = Self::new(40005, "FontName");
    pub const FONT_SIZE: Self = Self::new(40006, "FontSize");
    pub const FONT_WEIGHT: Self = Self::new(40007, "FontWeight");
    pub const FOREGROUND_COLOR: Self = Self::new(40008, "ForegroundColor");
    pub const HORIZONTAL_TEXT_ALIGNMENT: Self = Self::new(40009, "HorizontalTextAlignment");
    pub const IS_HIDDEN: Self = Self::new(40013, "IsHidden");
    pub const IS_ITALIC: Self = Self::new(40014, "IsItalic");
    pub const IS_READ_ONLY: Self = Self::new(40015, "IsReadOnly");
    pub const STRIKETHROUGH_STYLE: Self = Self::new(40026, "StrikethroughStyle");
    pub const TABS: Self = Self::new(40027, "Tabs");
    pub const UNDERLINE_STYLE: Self = Self::new(40030, "UnderlineStyle");

    const fn new(id: i32, name: &'static str) -> Self {
        Self { id, name }
    }

    pub const fn custom(id: i32, name: &'static str) -> Self {
        Self::new(id, name)
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lookup_by_id(id: i32) -> Option<Self> {
        lookup(id)
            .filter(|info| info.kind == IdentifierKind::TextAttribute)
            .map(|info| Self::new(info.id, info.name))
    }
}
