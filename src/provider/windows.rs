#![cfg(target_os = "windows")]

use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use windows::{
    core::{Interface, IUnknown, BSTR, VARIANT},
    Win32::{
        Foundation::BOOL,
        System::{
            Com::{CoCreateInstance, CoInitializeEx, CoTaskMemFree, CLSCTX_ALL, COINIT_MULTITHREADED, SAFEARRAY},
            Ole::{SafeArrayAccessData, SafeArrayDestroy, SafeArrayGetLBound, SafeArrayGetUBound, SafeArrayUnaccessData},
            Variant::{
                InitVariantFromDoubleArray, InitVariantFromInt32Array, VariantToDoubleArrayAlloc,
                VariantToInt32ArrayAlloc, VT_ARRAY, VT_BOOL, VT_BSTR, VT_EMPTY, VT_I4, VT_R8, VT_UNKNOWN,
            },
        },
        UI::Accessibility::{
            CUIAutomation, IUIAutomation, IUIAutomationAndCondition, IUIAutomationBoolCondition,
            IUIAutomationCondition, IUIAutomationElement, IUIAutomationNotCondition,
            IUIAutomationOrCondition, IUIAutomationPropertyCondition, IUIAutomationTextRange,
            PropertyConditionFlags, TextPatternRangeEndpoint, TextUnit, UIA_PROPERTY_ID,
            UIA_TEXTATTRIBUTE_ID,
        },
    },
};

use super::{
    AutomationProvider, ConditionHandle, ElementHandle, NativeBoolCondition,
    NativeCompositeCondition, NativeCondition, NativeElement, NativeNotCondition,
    NativePropertyCondition, NativeTextRange, TextRangeHandle,
};
use crate::native::{require_handles, NativeBool, NativeResult, NativeStatus, NativeValue};

fn status(err: windows::core::Error) -> NativeStatus {
    NativeStatus::from_hresult(err.code().0)
}

/// A successful call that produced a null interface comes back as an error
/// carrying a success code.
fn optional<T>(result: windows::core::Result<T>) -> NativeResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.code().is_ok() => Ok(None),
        Err(err) => Err(status(err)),
    }
}

/// Copy a one-dimensional SAFEARRAY out and destroy it, whether or not the
/// copy succeeds.
unsafe fn take_safearray<T: Copy>(array: *mut SAFEARRAY) -> NativeResult<Option<Vec<T>>> {
    if array.is_null() {
        return Ok(None);
    }
    let values = read_safearray(array);
    let _ = SafeArrayDestroy(array);
    values.map(Some)
}

unsafe fn read_safearray<T: Copy>(array: *mut SAFEARRAY) -> NativeResult<Vec<T>> {
    let lower = SafeArrayGetLBound(array, 1).map_err(status)?;
    let upper = SafeArrayGetUBound(array, 1).map_err(status)?;
    let count = usize::try_from(upper - lower + 1).unwrap_or(0);

    let mut data: *mut c_void = std::ptr::null_mut();
    SafeArrayAccessData(array, &mut data).map_err(status)?;
    let values = if count == 0 || data.is_null() {
        Vec::new()
    } else {
        std::slice::from_raw_parts(data as *const T, count).to_vec()
    };
    let _ = SafeArrayUnaccessData(array);
    Ok(values)
}

/// Shared automation object plus the reserved sentinel values it hands out.
struct ComContext {
    automation: IUIAutomation,
    not_supported: IUnknown,
    mixed: IUnknown,
}

impl ComContext {
    fn from_variant(self: &Arc<Self>, variant: &VARIANT) -> NativeResult<NativeValue> {
        let vt = variant.vt();
        let value = if vt == VT_EMPTY.0 {
            NativeValue::Empty
        } else if vt == VT_BOOL.0 {
            NativeValue::Bool(bool::try_from(variant).map_err(status)?)
        } else if vt == VT_I4.0 {
            NativeValue::Int(i32::try_from(variant).map_err(status)?)
        } else if vt == VT_R8.0 {
            NativeValue::Double(f64::try_from(variant).map_err(status)?)
        } else if vt == VT_BSTR.0 {
            NativeValue::String(BSTR::try_from(variant).map_err(status)?.to_string())
        } else if vt == VT_UNKNOWN.0 {
            let unknown = IUnknown::try_from(variant).map_err(status)?;
            if unknown == self.not_supported {
                NativeValue::NotSupported
            } else if unknown == self.mixed {
                NativeValue::Mixed
            } else {
                match unknown.cast::<IUIAutomationElement>() {
                    Ok(element) => NativeValue::Element(self.element(element)),
                    Err(err) => {
                        tracing::warn!("VARIANT holds an interface that is not an element");
                        return Err(status(err));
                    }
                }
            }
        } else if vt == VT_ARRAY.0 | VT_I4.0 {
            NativeValue::IntArray(unsafe { variant_ints(variant)? })
        } else if vt == VT_ARRAY.0 | VT_R8.0 {
            NativeValue::DoubleArray(unsafe { variant_doubles(variant)? })
        } else {
            tracing::debug!("Unhandled VARIANT type 0x{:x}", vt);
            NativeValue::Empty
        };
        Ok(value)
    }

    fn to_variant(&self, value: &NativeValue) -> NativeResult<VARIANT> {
        Ok(match value {
            NativeValue::Empty => VARIANT::new(),
            NativeValue::Bool(b) => VARIANT::from(*b),
            NativeValue::Int(i) => VARIANT::from(*i),
            NativeValue::Double(d) => VARIANT::from(*d),
            NativeValue::String(s) => VARIANT::from(BSTR::from(s.as_str())),
            NativeValue::IntArray(values) => unsafe { InitVariantFromInt32Array(values).map_err(status)? },
            NativeValue::DoubleArray(values) => unsafe {
                InitVariantFromDoubleArray(values).map_err(status)?
            },
            NativeValue::Element(element) => {
                let element = element
                    .as_any()
                    .downcast_ref::<ComElement>()
                    .ok_or(NativeStatus::INVALID_ARG)?;
                VARIANT::from(element.element.cast::<IUnknown>().map_err(status)?)
            }
            NativeValue::NotSupported => VARIANT::from(self.not_supported.clone()),
            NativeValue::Mixed => VARIANT::from(self.mixed.clone()),
        })
    }

    fn element(self: &Arc<Self>, element: IUIAutomationElement) -> ElementHandle {
        Arc::new(ComElement {
            context: self.clone(),
            element,
        })
    }

    fn condition(self: &Arc<Self>, condition: IUIAutomationCondition) -> ConditionHandle {
        let kind = if let Ok(c) = condition.cast::<IUIAutomationBoolCondition>() {
            ComConditionKind::Bool(c)
        } else if let Ok(c) = condition.cast::<IUIAutomationAndCondition>() {
            ComConditionKind::And(c)
        } else if let Ok(c) = condition.cast::<IUIAutomationOrCondition>() {
            ComConditionKind::Or(c)
        } else if let Ok(c) = condition.cast::<IUIAutomationNotCondition>() {
            ComConditionKind::Not(c)
        } else if let Ok(c) = condition.cast::<IUIAutomationPropertyCondition>() {
            ComConditionKind::Property(c)
        } else {
            ComConditionKind::Other
        };
        Arc::new(ComCondition {
            context: self.clone(),
            condition,
            kind,
        })
    }

    fn text_range(self: &Arc<Self>, range: IUIAutomationTextRange) -> TextRangeHandle {
        Arc::new(ComTextRange {
            context: self.clone(),
            range,
        })
    }
}

unsafe fn variant_ints(variant: &VARIANT) -> NativeResult<Vec<i32>> {
    let mut data: *mut i32 = std::ptr::null_mut();
    let mut count = 0u32;
    VariantToInt32ArrayAlloc(variant, &mut data, &mut count).map_err(status)?;
    let values = if data.is_null() {
        Vec::new()
    } else {
        std::slice::from_raw_parts(data, count as usize).to_vec()
    };
    CoTaskMemFree(Some(data as *const c_void));
    Ok(values)
}

unsafe fn variant_doubles(variant: &VARIANT) -> NativeResult<Vec<f64>> {
    let mut data: *mut f64 = std::ptr::null_mut();
    let mut count = 0u32;
    VariantToDoubleArrayAlloc(variant, &mut data, &mut count).map_err(status)?;
    let values = if data.is_null() {
        Vec::new()
    } else {
        std::slice::from_raw_parts(data, count as usize).to_vec()
    };
    CoTaskMemFree(Some(data as *const c_void));
    Ok(values)
}

/// Windows UI Automation provider.
pub struct WindowsProvider {
    context: Arc<ComContext>,
}

impl WindowsProvider {
    pub fn new() -> Result<Self> {
        unsafe {
            let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
            let automation: IUIAutomation = CoCreateInstance(&CUIAutomation, None, CLSCTX_ALL)
                .map_err(|e| anyhow!("Failed to create UIAutomation: {}", e))?;
            let not_supported = automation
                .ReservedNotSupportedValue()
                .map_err(|e| anyhow!("Failed to read reserved not-supported value: {}", e))?;
            let mixed = automation
                .ReservedMixedAttributeValue()
                .map_err(|e| anyhow!("Failed to read reserved mixed-attribute value: {}", e))?;
            tracing::info!("UI Automation provider initialized");
            Ok(Self {
                context: Arc::new(ComContext {
                    automation,
                    not_supported,
                    mixed,
                }),
            })
        }
    }

    fn natives(conditions: &[ConditionHandle]) -> NativeResult<Vec<Option<IUIAutomationCondition>>> {
        conditions
            .iter()
            .map(|handle| {
                handle
                    .as_any()
                    .and_then(|any| any.downcast_ref::<ComCondition>())
                    .map(|c| Some(c.condition.clone()))
                    .ok_or(NativeStatus::INVALID_ARG)
            })
            .collect()
    }
}

impl AutomationProvider for WindowsProvider {
    fn create_true_condition(&self) -> NativeResult<ConditionHandle> {
        let condition = unsafe { self.context.automation.CreateTrueCondition() }.map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn create_false_condition(&self) -> NativeResult<ConditionHandle> {
        let condition = unsafe { self.context.automation.CreateFalseCondition() }.map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn create_and_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle> {
        let natives = Self::natives(conditions)?;
        let condition = unsafe { self.context.automation.CreateAndConditionFromNativeArray(&natives) }
            .map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn create_or_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle> {
        let natives = Self::natives(conditions)?;
        let condition = unsafe { self.context.automation.CreateOrConditionFromNativeArray(&natives) }
            .map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn create_not_condition(&self, condition: &ConditionHandle) -> NativeResult<ConditionHandle> {
        let child = Self::natives(std::slice::from_ref(condition))?
            .pop()
            .flatten()
            .ok_or(NativeStatus::INVALID_ARG)?;
        let condition = unsafe { self.context.automation.CreateNotCondition(&child) }.map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn create_property_condition(
        &self,
        property_id: i32,
        value: NativeValue,
        flags: u32,
    ) -> NativeResult<ConditionHandle> {
        let variant = self.context.to_variant(&value)?;
        let condition = unsafe {
            self.context.automation.CreatePropertyConditionEx(
                UIA_PROPERTY_ID(property_id),
                &variant,
                PropertyConditionFlags(flags as i32),
            )
        }
        .map_err(status)?;
        Ok(self.context.condition(condition))
    }

    fn root_element(&self) -> NativeResult<ElementHandle> {
        let element = unsafe { self.context.automation.GetRootElement() }.map_err(status)?;
        Ok(self.context.element(element))
    }
}

// COM objects are only touched through the free-threaded automation client.
unsafe impl Send for WindowsProvider {}
unsafe impl Sync for WindowsProvider {}
unsafe impl Send for ComContext {}
unsafe impl Sync for ComContext {}

enum ComConditionKind {
    Bool(IUIAutomationBoolCondition),
    And(IUIAutomationAndCondition),
    Or(IUIAutomationOrCondition),
    Not(IUIAutomationNotCondition),
    Property(IUIAutomationPropertyCondition),
    Other,
}

struct ComCondition {
    context: Arc<ComContext>,
    condition: IUIAutomationCondition,
    kind: ComConditionKind,
}

unsafe impl Send for ComCondition {}
unsafe impl Sync for ComCondition {}

impl fmt::Debug for ComCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ComConditionKind::Bool(_) => "Bool",
            ComConditionKind::And(_) => "And",
            ComConditionKind::Or(_) => "Or",
            ComConditionKind::Not(_) => "Not",
            ComConditionKind::Property(_) => "Property",
            ComConditionKind::Other => "Other",
        };
        f.debug_struct("ComCondition").field("kind", &kind).finish()
    }
}

impl NativeCondition for ComCondition {
    fn as_bool_condition(&self) -> Option<&dyn NativeBoolCondition> {
        matches!(self.kind, ComConditionKind::Bool(_)).then_some(self as &dyn NativeBoolCondition)
    }

    fn as_and_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        matches!(self.kind, ComConditionKind::And(_)).then_some(self as &dyn NativeCompositeCondition)
    }

    fn as_or_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        matches!(self.kind, ComConditionKind::Or(_)).then_some(self as &dyn NativeCompositeCondition)
    }

    fn as_not_condition(&self) -> Option<&dyn NativeNotCondition> {
        matches!(self.kind, ComConditionKind::Not(_)).then_some(self as &dyn NativeNotCondition)
    }

    fn as_property_condition(&self) -> Option<&dyn NativePropertyCondition> {
        matches!(self.kind, ComConditionKind::Property(_))
            .then_some(self as &dyn NativePropertyCondition)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl NativeBoolCondition for ComCondition {
    fn boolean_value(&self) -> NativeResult<NativeBool> {
        match &self.kind {
            ComConditionKind::Bool(c) => unsafe { c.BooleanValue() }.map(|b| b.0).map_err(status),
            _ => Err(NativeStatus::NOT_SUPPORTED),
        }
    }
}

impl NativeCompositeCondition for ComCondition {
    fn children(&self) -> NativeResult<Vec<ConditionHandle>> {
        let mut array: *mut Option<IUIAutomationCondition> = std::ptr::null_mut();
        let mut count = 0i32;
        unsafe {
            match &self.kind {
                ComConditionKind::And(c) => c.GetChildrenAsNativeArray(&mut array, &mut count),
                ComConditionKind::Or(c) => c.GetChildrenAsNativeArray(&mut array, &mut count),
                _ => return Err(NativeStatus::NOT_SUPPORTED),
            }
            .map_err(status)?;

            let slots: Vec<Option<IUIAutomationCondition>> = (0..count.max(0) as usize)
                .map(|i| std::ptr::read(array.add(i)))
                .collect();
            CoTaskMemFree(Some(array as *const c_void));
            Ok(require_handles(slots)?
                .into_iter()
                .map(|child| self.context.condition(child))
                .collect())
        }
    }
}

impl NativeNotCondition for ComCondition {
    fn child(&self) -> NativeResult<ConditionHandle> {
        match &self.kind {
            ComConditionKind::Not(c) => {
                let child = unsafe { c.GetChild() }.map_err(status)?;
                Ok(self.context.condition(child))
            }
            _ => Err(NativeStatus::NOT_SUPPORTED),
        }
    }
}

impl NativePropertyCondition for ComCondition {
    fn property_id(&self) -> NativeResult<i32> {
        match &self.kind {
            ComConditionKind::Property(c) => unsafe { c.PropertyId() }.map(|id| id.0).map_err(status),
            _ => Err(NativeStatus::NOT_SUPPORTED),
        }
    }

    fn property_value(&self) -> NativeResult<NativeValue> {
        match &self.kind {
            ComConditionKind::Property(c) => {
                let variant = unsafe { c.PropertyValue() }.map_err(status)?;
                self.context.from_variant(&variant)
            }
            _ => Err(NativeStatus::NOT_SUPPORTED),
        }
    }

    fn property_condition_flags(&self) -> NativeResult<u32> {
        match &self.kind {
            ComConditionKind::Property(c) => unsafe { c.PropertyConditionFlags() }
                .map(|flags| flags.0 as u32)
                .map_err(status),
            _ => Err(NativeStatus::NOT_SUPPORTED),
        }
    }
}

struct ComElement {
    context: Arc<ComContext>,
    element: IUIAutomationElement,
}

unsafe impl Send for ComElement {}
unsafe impl Sync for ComElement {}

impl NativeElement for ComElement {
    fn runtime_id(&self) -> NativeResult<Vec<i32>> {
        unsafe {
            let array = self.element.GetRuntimeId().map_err(status)?;
            Ok(take_safearray::<i32>(array)?.unwrap_or_default())
        }
    }

    fn property_value(&self, property_id: i32) -> NativeResult<NativeValue> {
        let variant = unsafe {
            self.element
                .GetCurrentPropertyValueEx(UIA_PROPERTY_ID(property_id), BOOL::from(true))
        }
        .map_err(status)?;
        self.context.from_variant(&variant)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ComTextRange {
    context: Arc<ComContext>,
    range: IUIAutomationTextRange,
}

unsafe impl Send for ComTextRange {}
unsafe impl Sync for ComTextRange {}

impl ComTextRange {
    fn peer(range: &dyn NativeTextRange) -> NativeResult<&IUIAutomationTextRange> {
        range
            .as_any()
            .downcast_ref::<ComTextRange>()
            .map(|r| &r.range)
            .ok_or(NativeStatus::INVALID_ARG)
    }

    fn wrap(&self, range: windows::core::Result<IUIAutomationTextRange>) -> NativeResult<Option<TextRangeHandle>> {
        Ok(optional(range)?.map(|r| self.context.text_range(r)))
    }
}

impl NativeTextRange for ComTextRange {
    fn clone_range(&self) -> NativeResult<TextRangeHandle> {
        let range = unsafe { self.range.Clone() }.map_err(status)?;
        Ok(self.context.text_range(range))
    }

    fn compare(&self, range: &dyn NativeTextRange) -> NativeResult<NativeBool> {
        let other = Self::peer(range)?;
        unsafe { self.range.Compare(other) }.map(|b| b.0).map_err(status)
    }

    fn compare_endpoints(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<i32> {
        let other = Self::peer(range)?;
        unsafe {
            self.range.CompareEndpoints(
                TextPatternRangeEndpoint(endpoint),
                other,
                TextPatternRangeEndpoint(target_endpoint),
            )
        }
        .map_err(status)
    }

    fn expand_to_enclosing_unit(&self, unit: i32) -> NativeResult<()> {
        unsafe { self.range.ExpandToEnclosingUnit(TextUnit(unit)) }.map_err(status)
    }

    fn find_attribute(
        &self,
        attribute_id: i32,
        value: NativeValue,
        backward: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>> {
        let variant = self.context.to_variant(&value)?;
        self.wrap(unsafe {
            self.range
                .FindAttribute(UIA_TEXTATTRIBUTE_ID(attribute_id), &variant, BOOL(backward))
        })
    }

    fn find_text(
        &self,
        text: &str,
        backward: NativeBool,
        ignore_case: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>> {
        let text = BSTR::from(text);
        self.wrap(unsafe { self.range.FindText(&text, BOOL(backward), BOOL(ignore_case)) })
    }

    fn attribute_value(&self, attribute_id: i32) -> NativeResult<NativeValue> {
        let variant =
            unsafe { self.range.GetAttributeValue(UIA_TEXTATTRIBUTE_ID(attribute_id)) }.map_err(status)?;
        self.context.from_variant(&variant)
    }

    fn bounding_rectangles(&self) -> NativeResult<Option<Vec<f64>>> {
        unsafe {
            let array = self.range.GetBoundingRectangles().map_err(status)?;
            take_safearray::<f64>(array)
        }
    }

    fn enclosing_element(&self) -> NativeResult<Option<ElementHandle>> {
        Ok(optional(unsafe { self.range.GetEnclosingElement() })?.map(|e| self.context.element(e)))
    }

    fn text(&self, max_length: i32) -> NativeResult<String> {
        unsafe { self.range.GetText(max_length) }
            .map(|text| text.to_string())
            .map_err(status)
    }

    fn move_by(&self, unit: i32, count: i32) -> NativeResult<i32> {
        unsafe { self.range.Move(TextUnit(unit), count) }.map_err(status)
    }

    fn move_endpoint_by_unit(&self, endpoint: i32, unit: i32, count: i32) -> NativeResult<i32> {
        unsafe {
            self.range
                .MoveEndpointByUnit(TextPatternRangeEndpoint(endpoint), TextUnit(unit), count)
        }
        .map_err(status)
    }

    fn move_endpoint_by_range(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<()> {
        let other = Self::peer(range)?;
        unsafe {
            self.range.MoveEndpointByRange(
                TextPatternRangeEndpoint(endpoint),
                other,
                TextPatternRangeEndpoint(target_endpoint),
            )
        }
        .map_err(status)
    }

    fn select(&self) -> NativeResult<()> {
        unsafe { self.range.Select() }.map_err(status)
    }

    fn add_to_selection(&self) -> NativeResult<()> {
        unsafe { self.range.AddToSelection() }.map_err(status)
    }

    fn remove_from_selection(&self) -> NativeResult<()> {
        unsafe { self.range.RemoveFromSelection() }.map_err(status)
    }

    fn scroll_into_view(&self, align_to_top: NativeBool) -> NativeResult<()> {
        unsafe { self.range.ScrollIntoView(BOOL(align_to_top)) }.map_err(status)
    }

    fn children(&self) -> NativeResult<Option<Vec<ElementHandle>>> {
        let Some(array) = optional(unsafe { self.range.GetChildren() })? else {
            return Ok(None);
        };
        unsafe {
            let length = array.Length().map_err(status)?;
            let mut elements = Vec::with_capacity(length.max(0) as usize);
            for i in 0..length {
                let element = array.GetElement(i).map_err(status)?;
                elements.push(self.context.element(element));
            }
            Ok(Some(elements))
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
