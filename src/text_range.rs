//! Text range protocol.
//!
//! A [`TextPatternRange`] is a span over a text provider's content with a Start
//! and an End endpoint. Positions are never cached here: after every call the
//! native range is the only source of truth.

use serde::{Deserialize, Serialize};

use crate::element::AutomationElement;
use crate::error::{native_call, AutomationError, Result};
use crate::native::{
    from_native_bool, to_native, to_native_bool, unflatten_rects, wrap_element_array, NativeStatus,
};
use crate::provider::TextRangeHandle;
use crate::schema::{self, AutomationTextAttribute};
use crate::types::Rect;
use crate::value::AutomationValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextUnit {
    Character = 0,
    Format = 1,
    Word = 2,
    Line = 3,
    Paragraph = 4,
    Page = 5,
    Document = 6,
}

impl TextUnit {
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::Character,
            1 => Self::Format,
            2 => Self::Word,
            3 => Self::Line,
            4 => Self::Paragraph,
            5 => Self::Page,
            6 => Self::Document,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextPatternRangeEndpoint {
    Start = 0,
    End = 1,
}

impl TextPatternRangeEndpoint {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Start),
            1 => Some(Self::End),
            _ => None,
        }
    }
}

pub struct TextPatternRange {
    native: TextRangeHandle,
}

impl TextPatternRange {
    pub fn from_native(native: TextRangeHandle) -> Self {
        Self { native }
    }

    /// A null native range wraps to `None`.
    pub fn wrap(native: Option<TextRangeHandle>) -> Option<Self> {
        native.map(Self::from_native)
    }

    pub fn wrap_array(natives: Option<Vec<TextRangeHandle>>) -> Option<Vec<Self>> {
        natives.map(|ranges| ranges.into_iter().map(Self::from_native).collect())
    }

    pub fn native(&self) -> &TextRangeHandle {
        &self.native
    }

    /// Independent copy; later moves of either range do not affect the other.
    pub fn try_clone(&self) -> Result<Self> {
        native_call("TextRange::Clone", || self.native.clone_range()).map(Self::from_native)
    }

    /// Whether both ranges span the same content.
    pub fn compare(&self, range: &TextPatternRange) -> Result<bool> {
        native_call("TextRange::Compare", || self.native.compare(range.native.as_ref()))
            .map(from_native_bool)
    }

    /// Sign of (this endpoint - target endpoint): -1, 0 or 1.
    pub fn compare_endpoints(
        &self,
        endpoint: TextPatternRangeEndpoint,
        target: &TextPatternRange,
        target_endpoint: TextPatternRangeEndpoint,
    ) -> Result<i32> {
        native_call("TextRange::CompareEndpoints", || {
            self.native
                .compare_endpoints(endpoint as i32, target.native.as_ref(), target_endpoint as i32)
        })
        .map(i32::signum)
    }

    pub fn expand_to_enclosing_unit(&self, unit: TextUnit) -> Result<()> {
        native_call("TextRange::ExpandToEnclosingUnit", || {
            self.native.expand_to_enclosing_unit(unit as i32)
        })
    }

    /// Move the whole range by `count` units. Returns the number actually moved,
    /// which is smaller in magnitude when the content boundary is reached.
    pub fn move_by(&self, unit: TextUnit, count: i32) -> Result<i32> {
        native_call("TextRange::Move", || self.native.move_by(unit as i32, count))
    }

    /// Move one endpoint. Moving it across the other endpoint collapses the range.
    pub fn move_endpoint_by_unit(
        &self,
        endpoint: TextPatternRangeEndpoint,
        unit: TextUnit,
        count: i32,
    ) -> Result<i32> {
        native_call("TextRange::MoveEndpointByUnit", || {
            self.native
                .move_endpoint_by_unit(endpoint as i32, unit as i32, count)
        })
    }

    pub fn move_endpoint_by_range(
        &self,
        endpoint: TextPatternRangeEndpoint,
        target: &TextPatternRange,
        target_endpoint: TextPatternRangeEndpoint,
    ) -> Result<()> {
        native_call("TextRange::MoveEndpointByRange", || {
            self.native.move_endpoint_by_range(
                endpoint as i32,
                target.native.as_ref(),
                target_endpoint as i32,
            )
        })
    }

    /// First (or last, when `backward`) subrange whose `attribute` equals `value`.
    pub fn find_attribute(
        &self,
        attribute: &AutomationTextAttribute,
        value: impl Into<AutomationValue>,
        backward: bool,
    ) -> Result<Option<TextPatternRange>> {
        let value = value.into();
        if matches!(value, AutomationValue::Empty | AutomationValue::Element(None)) {
            return Err(AutomationError::invalid_argument("value"));
        }
        let native_value = to_native(&value);
        native_call("TextRange::FindAttribute", || {
            self.native
                .find_attribute(attribute.id(), native_value, to_native_bool(backward))
        })
        .map(Self::wrap)
    }

    pub fn find_text(
        &self,
        text: &str,
        backward: bool,
        ignore_case: bool,
    ) -> Result<Option<TextPatternRange>> {
        native_call("TextRange::FindText", || {
            self.native
                .find_text(text, to_native_bool(backward), to_native_bool(ignore_case))
        })
        .map(Self::wrap)
    }

    /// Value of `attribute` over the range.
    ///
    /// Attributes outside the schema fail with `UnsupportedAttribute` before the
    /// provider is asked. The provider's not-supported and mixed sentinels are
    /// returned as they are.
    pub fn attribute_value(&self, attribute: &AutomationTextAttribute) -> Result<AutomationValue> {
        let info = schema::lookup(attribute.id())
            .ok_or(AutomationError::UnsupportedAttribute(attribute.id()))?;
        let raw = native_call("TextRange::GetAttributeValue", || {
            self.native.attribute_value(attribute.id())
        })?;
        Ok(schema::convert(Some(info), raw))
    }

    /// One rectangle per visual line the range covers. `None` when the provider
    /// returns a null array.
    pub fn bounding_rectangles(&self) -> Result<Option<Vec<Rect>>> {
        native_call("TextRange::GetBoundingRectangles", || {
            self.native.bounding_rectangles()
        })
        .map(|raw| raw.map(|values| unflatten_rects(&values)))
    }

    pub fn enclosing_element(&self) -> Result<Option<AutomationElement>> {
        native_call("TextRange::GetEnclosingElement", || {
            self.native.enclosing_element()
        })
        .map(AutomationElement::wrap)
    }

    /// Embedded elements inside the range.
    pub fn children(&self) -> Result<Option<Vec<AutomationElement>>> {
        native_call("TextRange::GetChildren", || self.native.children()).map(wrap_element_array)
    }

    /// Plain text of the range, truncated to `max_length` characters (`-1` for all).
    pub fn text(&self, max_length: i32) -> Result<String> {
        if max_length < -1 {
            return Err(AutomationError::invalid_argument("max_length"));
        }
        native_call("TextRange::GetText", || self.native.text(max_length))
    }

    pub fn text_all(&self) -> Result<String> {
        self.text(-1)
    }

    pub fn select(&self) -> Result<()> {
        native_call("TextRange::Select", || self.native.select())
    }

    pub fn add_to_selection(&self) -> Result<()> {
        native_call("TextRange::AddToSelection", || self.native.add_to_selection())
    }

    pub fn remove_from_selection(&self) -> Result<()> {
        native_call("TextRange::RemoveFromSelection", || {
            self.native.remove_from_selection()
        })
    }

    /// Scroll the content so the range is visible. Content that cannot scroll is
    /// left as it is; every other failure is returned.
    pub fn scroll_into_view(&self, align_to_top: bool) -> Result<()> {
        match native_call("TextRange::ScrollIntoView", || {
            self.native.scroll_into_view(to_native_bool(align_to_top))
        }) {
            Err(err) if err.code() == Some(NativeStatus::NOT_SUPPORTED) => {
                tracing::debug!("Text range content is not scrollable");
                Ok(())
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for TextPatternRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPatternRange").finish_non_exhaustive()
    }
}
