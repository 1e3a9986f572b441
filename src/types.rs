use serde::{Deserialize, Serialize};

/// Bounding rectangle in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Locale identified by its Windows LCID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Culture {
    lcid: u32,
}

const CULTURE_NAMES: &[(u32, &str)] = &[
    (0x007F, ""),
    (0x0407, "de-DE"),
    (0x0409, "en-US"),
    (0x040C, "fr-FR"),
    (0x0410, "it-IT"),
    (0x0411, "ja-JP"),
    (0x0412, "ko-KR"),
    (0x0419, "ru-RU"),
    (0x0804, "zh-CN"),
    (0x0809, "en-GB"),
    (0x0C0A, "es-ES"),
];

impl Culture {
    pub const INVARIANT_LCID: u32 = 0x007F;

    pub fn invariant() -> Self {
        Self {
            lcid: Self::INVARIANT_LCID,
        }
    }

    pub fn from_lcid(lcid: u32) -> Self {
        Self { lcid }
    }

    /// Provider convention: locale id 0 means the invariant culture.
    pub fn from_native(raw: i32) -> Self {
        if raw == 0 {
            Self::invariant()
        } else {
            Self::from_lcid(raw as u32)
        }
    }

    pub fn lcid(&self) -> u32 {
        self.lcid
    }

    pub fn is_invariant(&self) -> bool {
        self.lcid == Self::INVARIANT_LCID
    }

    /// BCP-47 name for well-known locales.
    pub fn name(&self) -> Option<&'static str> {
        CULTURE_NAMES
            .iter()
            .find(|(lcid, _)| *lcid == self.lcid)
            .map(|(_, name)| *name)
    }
}

/// Control type identifier (`50000`-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlType(i32);

const CONTROL_TYPE_NAMES: &[&str] = &[
    "Button",
    "Calendar",
    "CheckBox",
    "ComboBox",
    "Edit",
    "Hyperlink",
    "Image",
    "ListItem",
    "List",
    "Menu",
    "MenuBar",
    "MenuItem",
    "ProgressBar",
    "RadioButton",
    "ScrollBar",
    "Slider",
    "Spinner",
    "StatusBar",
    "Tab",
    "TabItem",
    "Text",
    "ToolBar",
    "ToolTip",
    "Tree",
    "TreeItem",
    "Custom",
    "Group",
    "Thumb",
    "DataGrid",
    "DataItem",
    "Document",
    "SplitButton",
    "Window",
    "Pane",
    "Header",
    "HeaderItem",
    "Table",
    "TitleBar",
    "Separator",
];

impl ControlType {
    const BASE: i32 = 50000;

    pub const BUTTON: Self = Self(50000);
    pub const CHECK_BOX: Self = Self(50002);
    pub const COMBO_BOX: Self = Self(50003);
    pub const EDIT: Self = Self(50004);
    pub const HYPERLINK: Self = Self(50005);
    pub const LIST_ITEM: Self = Self(50007);
    pub const LIST: Self = Self(50008);
    pub const MENU_ITEM: Self = Self(50011);
    pub const TEXT: Self = Self(50020);
    pub const TREE_ITEM: Self = Self(50024);
    pub const DOCUMENT: Self = Self(50030);
    pub const WINDOW: Self = Self(50032);
    pub const PANE: Self = Self(50033);

    pub const fn from_id(id: i32) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> i32 {
        self.0
    }

    pub fn name(&self) -> Option<&'static str> {
        self.0
            .checked_sub(Self::BASE)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|i| CONTROL_TYPE_NAMES.get(i).copied())
    }
}

/// Enumerations whose members cross the boundary as plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumKind {
    Orientation,
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
}

/// Member of an [`EnumKind`] at a raw ordinal. Ordinals outside the declared members
/// are kept as unnamed members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    kind: EnumKind,
    raw: i32,
}

impl EnumValue {
    pub fn new(kind: EnumKind, raw: i32) -> Self {
        Self { kind, raw }
    }

    pub fn kind(&self) -> EnumKind {
        self.kind
    }

    pub fn raw(&self) -> i32 {
        self.raw
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.kind {
            EnumKind::Orientation => OrientationType(self.raw).name(),
            EnumKind::DockPosition => DockPosition(self.raw).name(),
            EnumKind::ExpandCollapseState => ExpandCollapseState(self.raw).name(),
            EnumKind::WindowVisualState => WindowVisualState(self.raw).name(),
            EnumKind::WindowInteractionState => WindowInteractionState(self.raw).name(),
            EnumKind::RowOrColumnMajor => RowOrColumnMajor(self.raw).name(),
            EnumKind::ToggleState => ToggleState(self.raw).name(),
            EnumKind::HorizontalTextAlignment => HorizontalTextAlignment(self.raw).name(),
            EnumKind::BulletStyle => BulletStyle(self.raw).name(),
            EnumKind::CapStyle => CapStyle(self.raw).name(),
            EnumKind::TextDecorationLineStyle => TextDecorationLineStyle(self.raw).name(),
        }
    }

    /// Typed view of this value, if it belongs to `T`.
    pub fn get<T: AutomationEnum>(&self) -> Option<T> {
        (self.kind == T::KIND).then(|| T::from_raw(self.raw))
    }
}

pub trait AutomationEnum: Copy {
    const KIND: EnumKind;

    fn from_raw(raw: i32) -> Self;

    fn raw(&self) -> i32;
}

macro_rules! automation_enum {
    ($(#[$meta:meta])* $name:ident: $kind:ident { $($member:ident = $value:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            $(pub const $member: Self = Self($value);)+

            pub fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($label),)+
                    _ => None,
                }
            }
        }

        impl AutomationEnum for $name {
            const KIND: EnumKind = EnumKind::$kind;

            fn from_raw(raw: i32) -> Self {
                Self(raw)
            }

            fn raw(&self) -> i32 {
                self.0
            }
        }

        impl From<$name> for EnumValue {
            fn from(value: $name) -> Self {
                EnumValue::new(EnumKind::$kind, value.0)
            }
        }
    };
}

automation_enum!(OrientationType: Orientation {
    NONE = 0 => "None",
    HORIZONTAL = 1 => "Horizontal",
    VERTICAL = 2 => "Vertical",
});

automation_enum!(DockPosition: DockPosition {
    TOP = 0 => "Top",
    LEFT = 1 => "Left",
    BOTTOM = 2 => "Bottom",
    RIGHT = 3 => "Right",
    FILL = 4 => "Fill",
    NONE = 5 => "None",
});

automation_enum!(ExpandCollapseState: ExpandCollapseState {
    COLLAPSED = 0 => "Collapsed",
    EXPANDED = 1 => "Expanded",
    PARTIALLY_EXPANDED = 2 => "PartiallyExpanded",
    LEAF_NODE = 3 => "LeafNode",
});

automation_enum!(WindowVisualState: WindowVisualState {
    NORMAL = 0 => "Normal",
    MAXIMIZED = 1 => "Maximized",
    MINIMIZED = 2 => "Minimized",
});

automation_enum!(WindowInteractionState: WindowInteractionState {
    RUNNING = 0 => "Running",
    CLOSING = 1 => "Closing",
    READY_FOR_USER_INTERACTION = 2 => "ReadyForUserInteraction",
    BLOCKED_BY_MODAL_WINDOW = 3 => "BlockedByModalWindow",
    NOT_RESPONDING = 4 => "NotResponding",
});

automation_enum!(RowOrColumnMajor: RowOrColumnMajor {
    ROW_MAJOR = 0 => "RowMajor",
    COLUMN_MAJOR = 1 => "ColumnMajor",
    INDETERMINATE = 2 => "Indeterminate",
});

automation_enum!(ToggleState: ToggleState {
    OFF = 0 => "Off",
    ON = 1 => "On",
    INDETERMINATE = 2 => "Indeterminate",
});

automation_enum!(HorizontalTextAlignment: HorizontalTextAlignment {
    LEFT = 0 => "Left",
    CENTERED = 1 => "Centered",
    RIGHT = 2 => "Right",
    JUSTIFIED = 3 => "Justified",
});

automation_enum!(BulletStyle: BulletStyle {
    OTHER = -1 => "Other",
    NONE = 0 => "None",
    HOLLOW_ROUND_BULLET = 1 => "HollowRoundBullet",
    FILLED_ROUND_BULLET = 2 => "FilledRoundBullet",
    HOLLOW_SQUARE_BULLET = 3 => "HollowSquareBullet",
    FILLED_SQUARE_BULLET = 4 => "FilledSquareBullet",
    DASH_BULLET = 5 => "DashBullet",
});

automation_enum!(CapStyle: CapStyle {
    OTHER = -1 => "Other",
    NONE = 0 => "None",
    SMALL_CAP = 1 => "SmallCap",
    ALL_CAP = 2 => "AllCap",
    ALL_PETITE_CAPS = 3 => "AllPetiteCaps",
    PETITE_CAPS = 4 => "PetiteCaps",
    UNICASE = 5 => "Unicase",
    TITLING = 6 => "Titling",
});

automation_enum!(TextDecorationLineStyle: TextDecorationLineStyle {
    OTHER = -1 => "Other",
    NONE = 0 => "None",
    SINGLE = 1 => "Single",
    WORDS_ONLY = 2 => "WordsOnly",
    DOUBLE = 3 => "Double",
    DOT = 4 => "Dot",
    DASH = 5 => "Dash",
    DASH_DOT = 6 => "DashDot",
    DASH_DOT_DOT = 7 => "DashDotDot",
    WAVY = 8 => "Wavy",
    THICK_SINGLE = 9 => "ThickSingle",
    DOUBLE_WAVY = 11 => "DoubleWavy",
    THICK_WAVY = 12 => "ThickWavy",
    LONG_DASH = 13 => "LongDash",
});
