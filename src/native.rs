//! Native-side primitives and the marshalling helpers that move values across the
//! provider boundary.

use std::fmt;
use std::sync::Arc;

use crate::element::AutomationElement;
use crate::provider::ElementHandle;
use crate::types::{Point, Rect};
use crate::value::AutomationValue;

/// HRESULT-style status code reported by the provider for a failed call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeStatus(u32);

impl NativeStatus {
    pub const NOT_IMPLEMENTED: Self = Self(0x8000_4001);
    pub const FAIL: Self = Self(0x8000_4005);
    pub const INVALID_ARG: Self = Self(0x8007_0057);
    pub const POINTER: Self = Self(0x8000_4003);
    pub const NOT_INITIALIZED: Self = Self(0x8004_01F0);
    pub const OBJECT_NOT_CONNECTED: Self = Self(0x8004_01FD);
    pub const RPC_DISCONNECTED: Self = Self(0x8001_0108);
    pub const ELEMENT_NOT_ENABLED: Self = Self(0x8004_0200);
    pub const ELEMENT_NOT_AVAILABLE: Self = Self(0x8004_0201);
    pub const NO_CLICKABLE_POINT: Self = Self(0x8004_0202);
    pub const NOT_SUPPORTED: Self = Self(0x8004_0204);
    pub const INVALID_OPERATION: Self = Self(0x8013_1509);
    pub const TIMEOUT: Self = Self(0x8013_1505);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn from_hresult(hr: i32) -> Self {
        Self(hr as u32)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::Debug for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeStatus(0x{:08X})", self.0)
    }
}

pub type NativeResult<T> = std::result::Result<T, NativeStatus>;

/// Integer truth value used by the provider for every boolean flag.
pub type NativeBool = i32;

pub fn to_native_bool(value: bool) -> NativeBool {
    if value {
        1
    } else {
        0
    }
}

pub fn from_native_bool(value: NativeBool) -> bool {
    value != 0
}

/// Raw value as the provider hands it over, before any schema conversion.
#[derive(Clone)]
pub enum NativeValue {
    /// Null / VT_EMPTY
    Empty,
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    Element(ElementHandle),
    /// Provider sentinel: the property is not supported on this element.
    NotSupported,
    /// Provider sentinel: a text attribute varies across the range.
    Mixed,
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Bool(v) => write!(f, "Bool({})", v),
            Self::Int(v) => write!(f, "Int({})", v),
            Self::Double(v) => write!(f, "Double({})", v),
            Self::String(v) => write!(f, "String({:?})", v),
            Self::IntArray(v) => write!(f, "IntArray({:?})", v),
            Self::DoubleArray(v) => write!(f, "DoubleArray({:?})", v),
            Self::Element(e) => write!(f, "Element({:?})", e.runtime_id().ok()),
            Self::NotSupported => write!(f, "NotSupported"),
            Self::Mixed => write!(f, "Mixed"),
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::IntArray(a), Self::IntArray(b)) => a == b,
            (Self::DoubleArray(a), Self::DoubleArray(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => same_element(a, b),
            (Self::NotSupported, Self::NotSupported) => true,
            (Self::Mixed, Self::Mixed) => true,
            _ => false,
        }
    }
}

/// Two element handles denote the same element when their runtime ids match.
pub fn same_element(a: &ElementHandle, b: &ElementHandle) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    match (a.runtime_id(), b.runtime_id()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Convert a typed value into the primitive the provider expects.
pub fn to_native(value: &AutomationValue) -> NativeValue {
    match value {
        AutomationValue::Empty => NativeValue::Empty,
        AutomationValue::Bool(v) => NativeValue::Bool(*v),
        AutomationValue::Int(v) => NativeValue::Int(*v),
        AutomationValue::Double(v) => NativeValue::Double(*v),
        AutomationValue::String(v) => NativeValue::String(v.clone()),
        AutomationValue::IntArray(v) => NativeValue::IntArray(v.clone()),
        AutomationValue::DoubleArray(v) => NativeValue::DoubleArray(v.clone()),
        AutomationValue::Rect(r) => NativeValue::DoubleArray(flatten_rects(std::slice::from_ref(r))),
        AutomationValue::Point(p) => NativeValue::DoubleArray(vec![p.x, p.y]),
        AutomationValue::Culture(c) => NativeValue::Int(c.lcid() as i32),
        AutomationValue::ControlType(c) => NativeValue::Int(c.id()),
        AutomationValue::Enum(e) => NativeValue::Int(e.raw()),
        AutomationValue::Element(Some(e)) => NativeValue::Element(e.native().clone()),
        AutomationValue::Element(None) => NativeValue::Empty,
        AutomationValue::NotSupported => NativeValue::NotSupported,
        AutomationValue::Mixed => NativeValue::Mixed,
    }
}

/// Decode the provider's flat `[x, y, w, h, x, y, w, h, ...]` convention.
///
/// Trailing values that do not form a whole rectangle are dropped.
pub fn unflatten_rects(values: &[f64]) -> Vec<Rect> {
    let chunks = values.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        tracing::warn!(
            len = values.len(),
            dropped = chunks.remainder().len(),
            "Rectangle array length is not a multiple of 4; dropping trailing values"
        );
    }
    chunks
        .map(|c| Rect::new(c[0], c[1], c[2], c[3]))
        .collect()
}

pub fn flatten_rects(rects: &[Rect]) -> Vec<f64> {
    rects
        .iter()
        .flat_map(|r| [r.x, r.y, r.width, r.height])
        .collect()
}

/// `[x, y]` to a point; `None` when fewer than two values are present.
pub fn point_from_doubles(values: &[f64]) -> Option<Point> {
    match values {
        [x, y, ..] => Some(Point::new(*x, *y)),
        _ => None,
    }
}

/// A null native array stays `None`; an empty one stays empty.
pub fn wrap_element_array(elements: Option<Vec<ElementHandle>>) -> Option<Vec<AutomationElement>> {
    elements.map(|handles| handles.into_iter().map(AutomationElement::from_native).collect())
}

/// Every slot of a native handle array, in order. A null slot fails the whole
/// array with `POINTER`.
pub fn require_handles<T>(slots: Vec<Option<T>>) -> NativeResult<Vec<T>> {
    let len = slots.len();
    let handles: Vec<T> = slots.into_iter().flatten().collect();
    if handles.len() == len {
        Ok(handles)
    } else {
        tracing::warn!("Native array held {} null handles", len - handles.len());
        Err(NativeStatus::POINTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_bool_coercion() {
        assert_eq!(to_native_bool(true), 1);
        assert_eq!(to_native_bool(false), 0);
        assert!(from_native_bool(1));
        assert!(from_native_bool(-1));
        assert!(!from_native_bool(0));
    }

    #[test]
    fn test_unflatten_exact_rects() {
        let rects = unflatten_rects(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(rects, vec![Rect::new(1.0, 2.0, 3.0, 4.0), Rect::new(5.0, 6.0, 7.0, 8.0)]);
    }

    #[test]
    fn test_unflatten_drops_trailing_values() {
        let raw: Vec<f64> = (1..=9).map(f64::from).collect();
        let rects = unflatten_rects(&raw);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[1], Rect::new(5.0, 6.0, 7.0, 8.0));

        assert!(unflatten_rects(&[1.0, 2.0, 3.0]).is_empty());
    }

    #[test]
    fn test_flatten_inverts_unflatten() {
        let rects = vec![Rect::new(0.0, 0.0, 10.0, 20.0), Rect::new(0.0, 20.0, 5.0, 20.0)];
        assert_eq!(unflatten_rects(&flatten_rects(&rects)), rects);
    }

    #[test]
    fn test_point_from_doubles() {
        assert_eq!(point_from_doubles(&[1.0, 2.0]), Some(Point::new(1.0, 2.0)));
        assert_eq!(point_from_doubles(&[1.0]), None);
    }

    #[test]
    fn test_wrap_element_array_keeps_null_distinct() {
        assert!(wrap_element_array(None).is_none());
        assert_eq!(wrap_element_array(Some(Vec::new())).map(|v| v.len()), Some(0));
    }

    #[test]
    fn test_require_handles_rejects_null_slots() {
        assert_eq!(require_handles(vec![Some(1), Some(2), Some(3)]), Ok(vec![1, 2, 3]));
        assert_eq!(require_handles::<i32>(Vec::new()), Ok(Vec::new()));
        assert_eq!(require_handles(vec![Some(1), None, Some(3)]), Err(NativeStatus::POINTER));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(NativeStatus::ELEMENT_NOT_AVAILABLE.to_string(), "0x80040201");
        assert_eq!(NativeStatus::from_hresult(-2147467259), NativeStatus::FAIL);
    }
}
