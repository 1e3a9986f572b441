//! In-process automation provider.
//!
//! Conditions, elements and text documents live in ordinary memory and report
//! failures with the same status codes a UI Automation server would. Used by
//! clients that need a provider without a desktop session, and by the tests.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use regex::RegexBuilder;
use uuid::Uuid;

use super::{
    AutomationProvider, ConditionHandle, ElementHandle, NativeBoolCondition,
    NativeCompositeCondition, NativeCondition, NativeElement, NativeNotCondition,
    NativePropertyCondition, NativeTextRange, TextRangeHandle,
};
use crate::native::{from_native_bool, to_native_bool, NativeBool, NativeResult, NativeStatus, NativeValue};
use crate::text_range::{TextPatternRangeEndpoint, TextUnit};

const RUNTIME_ID_PROPERTY: i32 = 30000;
const CONTROL_TYPE_PROPERTY: i32 = 30003;
const DOCUMENT_CONTROL_TYPE: i32 = 50030;
const PROVIDER_RUNTIME_PREFIX: i32 = 42;

// Conditions

#[derive(Debug)]
struct MemoryBoolCondition {
    value: bool,
}

impl NativeCondition for MemoryBoolCondition {
    fn as_bool_condition(&self) -> Option<&dyn NativeBoolCondition> {
        Some(self)
    }
}

impl NativeBoolCondition for MemoryBoolCondition {
    fn boolean_value(&self) -> NativeResult<NativeBool> {
        Ok(to_native_bool(self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompositeOp {
    And,
    Or,
}

#[derive(Debug)]
struct MemoryCompositeCondition {
    op: CompositeOp,
    children: Vec<ConditionHandle>,
}

impl NativeCondition for MemoryCompositeCondition {
    fn as_and_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        (self.op == CompositeOp::And).then_some(self as &dyn NativeCompositeCondition)
    }

    fn as_or_condition(&self) -> Option<&dyn NativeCompositeCondition> {
        (self.op == CompositeOp::Or).then_some(self as &dyn NativeCompositeCondition)
    }
}

impl NativeCompositeCondition for MemoryCompositeCondition {
    fn children(&self) -> NativeResult<Vec<ConditionHandle>> {
        Ok(self.children.clone())
    }
}

#[derive(Debug)]
struct MemoryNotCondition {
    child: ConditionHandle,
}

impl NativeCondition for MemoryNotCondition {
    fn as_not_condition(&self) -> Option<&dyn NativeNotCondition> {
        Some(self)
    }
}

impl NativeNotCondition for MemoryNotCondition {
    fn child(&self) -> NativeResult<ConditionHandle> {
        Ok(self.child.clone())
    }
}

#[derive(Debug)]
struct MemoryPropertyCondition {
    property_id: i32,
    value: NativeValue,
    flags: u32,
}

impl NativeCondition for MemoryPropertyCondition {
    fn as_property_condition(&self) -> Option<&dyn NativePropertyCondition> {
        Some(self)
    }
}

impl NativePropertyCondition for MemoryPropertyCondition {
    fn property_id(&self) -> NativeResult<i32> {
        Ok(self.property_id)
    }

    fn property_value(&self) -> NativeResult<NativeValue> {
        Ok(self.value.clone())
    }

    fn property_condition_flags(&self) -> NativeResult<u32> {
        Ok(self.flags)
    }
}

// Elements

pub struct MemoryElement {
    runtime_id: Vec<i32>,
    properties: RwLock<HashMap<i32, NativeValue>>,
}

impl MemoryElement {
    pub fn set_property(&self, property_id: i32, value: NativeValue) {
        self.properties.write().insert(property_id, value);
    }
}

impl NativeElement for MemoryElement {
    fn runtime_id(&self) -> NativeResult<Vec<i32>> {
        Ok(self.runtime_id.clone())
    }

    fn property_value(&self, property_id: i32) -> NativeResult<NativeValue> {
        if property_id == RUNTIME_ID_PROPERTY {
            return Ok(NativeValue::IntArray(self.runtime_id.clone()));
        }
        Ok(self
            .properties
            .read()
            .get(&property_id)
            .cloned()
            .unwrap_or(NativeValue::NotSupported))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("runtime_id", &self.runtime_id)
            .finish()
    }
}

// Provider

pub struct MemoryProvider {
    root: Arc<MemoryElement>,
    next_element: AtomicI32,
    documents: DashMap<Uuid, Weak<MemoryDocument>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self {
            root: Arc::new(MemoryElement {
                runtime_id: vec![PROVIDER_RUNTIME_PREFIX, 0],
                properties: RwLock::new(HashMap::new()),
            }),
            next_element: AtomicI32::new(1),
            documents: DashMap::new(),
        }
    }

    pub fn root(&self) -> ElementHandle {
        self.root.clone()
    }

    /// New element with a fresh runtime id.
    pub fn create_element(
        &self,
        properties: impl IntoIterator<Item = (i32, NativeValue)>,
    ) -> Arc<MemoryElement> {
        let id = self.next_element.fetch_add(1, Ordering::Relaxed);
        Arc::new(MemoryElement {
            runtime_id: vec![PROVIDER_RUNTIME_PREFIX, id],
            properties: RwLock::new(properties.into_iter().collect()),
        })
    }

    pub fn document(&self, text: &str) -> DocumentBuilder<'_> {
        DocumentBuilder {
            provider: self,
            text: text.to_string(),
            runs: Vec::new(),
            defaults: HashMap::new(),
            multiple_selection: true,
            scrollable: true,
            enabled: true,
            children: Vec::new(),
            char_width: 8.0,
            line_height: 16.0,
        }
    }

    /// Live document registered under `id`. A document is live while the
    /// caller or one of its ranges still holds it.
    pub fn find_document(&self, id: &Uuid) -> Option<Arc<MemoryDocument>> {
        let document = self.documents.get(id)?.value().upgrade();
        if document.is_none() {
            self.documents.remove(id);
        }
        document
    }

    pub fn document_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationProvider for MemoryProvider {
    fn create_true_condition(&self) -> NativeResult<ConditionHandle> {
        Ok(Arc::new(MemoryBoolCondition { value: true }))
    }

    fn create_false_condition(&self) -> NativeResult<ConditionHandle> {
        Ok(Arc::new(MemoryBoolCondition { value: false }))
    }

    fn create_and_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle> {
        Ok(Arc::new(MemoryCompositeCondition {
            op: CompositeOp::And,
            children: conditions.to_vec(),
        }))
    }

    fn create_or_condition(&self, conditions: &[ConditionHandle]) -> NativeResult<ConditionHandle> {
        Ok(Arc::new(MemoryCompositeCondition {
            op: CompositeOp::Or,
            children: conditions.to_vec(),
        }))
    }

    fn create_not_condition(&self, condition: &ConditionHandle) -> NativeResult<ConditionHandle> {
        Ok(Arc::new(MemoryNotCondition {
            child: condition.clone(),
        }))
    }

    fn create_property_condition(
        &self,
        property_id: i32,
        value: NativeValue,
        flags: u32,
    ) -> NativeResult<ConditionHandle> {
        if property_id == 0 {
            return Err(NativeStatus::INVALID_ARG);
        }
        Ok(Arc::new(MemoryPropertyCondition {
            property_id,
            value,
            flags,
        }))
    }

    fn root_element(&self) -> NativeResult<ElementHandle> {
        Ok(self.root())
    }
}

// Text documents

#[derive(Debug, Clone)]
struct AttributeRun {
    range: Range<usize>,
    attribute_id: i32,
    value: NativeValue,
}

pub struct DocumentBuilder<'a> {
    provider: &'a MemoryProvider,
    text: String,
    runs: Vec<AttributeRun>,
    defaults: HashMap<i32, NativeValue>,
    multiple_selection: bool,
    scrollable: bool,
    enabled: bool,
    children: Vec<(usize, ElementHandle)>,
    char_width: f64,
    line_height: f64,
}

impl<'a> DocumentBuilder<'a> {
    /// Give `attribute_id` the value `value` over the character range `range`.
    /// Later runs win where runs overlap.
    pub fn attribute(mut self, range: Range<usize>, attribute_id: i32, value: NativeValue) -> Self {
        self.runs.push(AttributeRun {
            range,
            attribute_id,
            value,
        });
        self
    }

    /// Value of `attribute_id` outside any run.
    pub fn default_attribute(mut self, attribute_id: i32, value: NativeValue) -> Self {
        self.defaults.insert(attribute_id, value);
        self
    }

    pub fn single_selection(mut self) -> Self {
        self.multiple_selection = false;
        self
    }

    pub fn not_scrollable(mut self) -> Self {
        self.scrollable = false;
        self
    }

    /// Selection and scrolling fail with `ELEMENT_NOT_ENABLED`.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Embed `element` at character `position`.
    pub fn child(mut self, position: usize, element: ElementHandle) -> Self {
        self.children.push((position, element));
        self
    }

    pub fn char_size(mut self, width: f64, height: f64) -> Self {
        self.char_width = width;
        self.line_height = height;
        self
    }

    pub fn build(self) -> Arc<MemoryDocument> {
        let enclosing: ElementHandle = self
            .provider
            .create_element([(CONTROL_TYPE_PROPERTY, NativeValue::Int(DOCUMENT_CONTROL_TYPE))]);
        let document = Arc::new(MemoryDocument {
            id: Uuid::new_v4(),
            chars: self.text.chars().collect(),
            runs: self.runs,
            defaults: self.defaults,
            multiple_selection: self.multiple_selection,
            scrollable: self.scrollable,
            enabled: self.enabled,
            children: self.children,
            enclosing,
            char_width: self.char_width,
            line_height: self.line_height,
            selection: Mutex::new(Vec::new()),
            scrolled_to: Mutex::new(None),
            available: AtomicBool::new(true),
        });
        let documents = &self.provider.documents;
        documents.retain(|_, entry| entry.strong_count() > 0);
        documents.insert(document.id, Arc::downgrade(&document));
        document
    }
}

/// Text content with attribute runs, a fixed-pitch layout and selection state.
pub struct MemoryDocument {
    id: Uuid,
    chars: Vec<char>,
    runs: Vec<AttributeRun>,
    defaults: HashMap<i32, NativeValue>,
    multiple_selection: bool,
    scrollable: bool,
    enabled: bool,
    children: Vec<(usize, ElementHandle)>,
    enclosing: ElementHandle,
    char_width: f64,
    line_height: f64,
    selection: Mutex<Vec<(usize, usize)>>,
    scrolled_to: Mutex<Option<(usize, bool)>>,
    available: AtomicBool,
}

impl MemoryDocument {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Range over `[start, end)` in characters, clamped to the content.
    pub fn range(self: &Arc<Self>, start: usize, end: usize) -> TextRangeHandle {
        let end = end.min(self.len());
        let start = start.min(end);
        Arc::new(MemoryTextRange {
            document: self.clone(),
            span: Mutex::new((start, end)),
        })
    }

    pub fn range_all(self: &Arc<Self>) -> TextRangeHandle {
        self.range(0, self.len())
    }

    pub fn selection(&self) -> Vec<Range<usize>> {
        self.selection.lock().iter().map(|&(s, e)| s..e).collect()
    }

    /// Position and alignment of the last successful scroll request.
    pub fn scrolled_to(&self) -> Option<(usize, bool)> {
        *self.scrolled_to.lock()
    }

    pub fn enclosing_element(&self) -> ElementHandle {
        self.enclosing.clone()
    }

    /// Make every range over this document stale.
    pub fn invalidate(&self) {
        self.available.store(false, Ordering::SeqCst);
    }

    fn is_boundary(&self, unit: TextUnit, pos: usize) -> bool {
        let len = self.len();
        if pos == 0 || pos >= len {
            return true;
        }
        match unit {
            TextUnit::Character => true,
            TextUnit::Format => self
                .runs
                .iter()
                .any(|run| run.range.start == pos || run.range.end == pos),
            TextUnit::Word => self.chars[pos - 1].is_whitespace() && !self.chars[pos].is_whitespace(),
            TextUnit::Line | TextUnit::Paragraph => self.chars[pos - 1] == '\n',
            TextUnit::Page | TextUnit::Document => false,
        }
    }

    fn next_boundary(&self, unit: TextUnit, pos: usize) -> Option<usize> {
        (pos + 1..=self.len()).find(|&p| self.is_boundary(unit, p))
    }

    fn prev_boundary(&self, unit: TextUnit, pos: usize) -> Option<usize> {
        (0..pos.min(self.len() + 1)).rev().find(|&p| self.is_boundary(unit, p))
    }

    fn floor(&self, unit: TextUnit, pos: usize) -> usize {
        if self.is_boundary(unit, pos) {
            pos
        } else {
            self.prev_boundary(unit, pos).unwrap_or(0)
        }
    }

    fn ceil(&self, unit: TextUnit, pos: usize) -> usize {
        if self.is_boundary(unit, pos) {
            pos
        } else {
            self.next_boundary(unit, pos).unwrap_or(self.len())
        }
    }

    fn value_at(&self, attribute_id: i32, pos: usize) -> NativeValue {
        self.runs
            .iter()
            .rev()
            .find(|run| run.attribute_id == attribute_id && run.range.contains(&pos))
            .map(|run| run.value.clone())
            .or_else(|| self.defaults.get(&attribute_id).cloned())
            .unwrap_or(NativeValue::NotSupported)
    }

    fn line_segments(&self, start: usize, end: usize) -> Vec<(usize, usize, usize)> {
        let mut segments = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;
        let (mut line, mut column) = (0, 0);

        for (pos, ch) in self.chars.iter().enumerate().take(end) {
            if pos >= start && *ch != '\n' {
                let same_line = matches!(current, Some((l, _, _)) if l == line);
                if same_line {
                    if let Some((_, _, count)) = current.as_mut() {
                        *count += 1;
                    }
                } else {
                    if let Some(segment) = current.take() {
                        segments.push(segment);
                    }
                    current = Some((line, column, 1));
                }
            }
            if *ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        if let Some(segment) = current {
            segments.push(segment);
        }
        segments
    }
}

fn parse_unit(unit: i32) -> NativeResult<TextUnit> {
    TextUnit::from_raw(unit).ok_or(NativeStatus::INVALID_ARG)
}

fn parse_endpoint(endpoint: i32) -> NativeResult<TextPatternRangeEndpoint> {
    TextPatternRangeEndpoint::from_raw(endpoint).ok_or(NativeStatus::INVALID_ARG)
}

fn endpoint_of(span: (usize, usize), endpoint: TextPatternRangeEndpoint) -> usize {
    match endpoint {
        TextPatternRangeEndpoint::Start => span.0,
        TextPatternRangeEndpoint::End => span.1,
    }
}

/// Place `endpoint` at `pos`; an endpoint pushed across the other one drags it
/// along so the range never inverts.
fn set_endpoint(span: &mut (usize, usize), endpoint: TextPatternRangeEndpoint, pos: usize) {
    match endpoint {
        TextPatternRangeEndpoint::Start => {
            span.0 = pos;
            if span.1 < pos {
                span.1 = pos;
            }
        }
        TextPatternRangeEndpoint::End => {
            span.1 = pos;
            if span.0 > pos {
                span.0 = pos;
            }
        }
    }
}

pub struct MemoryTextRange {
    document: Arc<MemoryDocument>,
    span: Mutex<(usize, usize)>,
}

impl MemoryTextRange {
    /// Current `[start, end)` in characters.
    pub fn span(&self) -> Range<usize> {
        let (start, end) = *self.span.lock();
        start..end
    }

    fn check(&self) -> NativeResult<()> {
        if self.document.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NativeStatus::ELEMENT_NOT_AVAILABLE)
        }
    }

    fn check_enabled(&self) -> NativeResult<()> {
        self.check()?;
        if self.document.enabled {
            Ok(())
        } else {
            Err(NativeStatus::ELEMENT_NOT_ENABLED)
        }
    }

    fn downcast(range: &dyn NativeTextRange) -> NativeResult<&MemoryTextRange> {
        range
            .as_any()
            .downcast_ref::<MemoryTextRange>()
            .ok_or(NativeStatus::INVALID_ARG)
    }

    /// Another range over the same document.
    fn peer<'r>(&self, range: &'r dyn NativeTextRange) -> NativeResult<&'r MemoryTextRange> {
        let other = Self::downcast(range)?;
        if other.document.id != self.document.id {
            return Err(NativeStatus::INVALID_ARG);
        }
        other.check()?;
        Ok(other)
    }

    fn subrange(&self, start: usize, end: usize) -> TextRangeHandle {
        self.document.range(start, end)
    }
}

impl NativeTextRange for MemoryTextRange {
    fn clone_range(&self) -> NativeResult<TextRangeHandle> {
        self.check()?;
        let (start, end) = *self.span.lock();
        Ok(self.subrange(start, end))
    }

    fn compare(&self, range: &dyn NativeTextRange) -> NativeResult<NativeBool> {
        self.check()?;
        let other = Self::downcast(range)?;
        if other.document.id != self.document.id {
            return Ok(to_native_bool(false));
        }
        let theirs = *other.span.lock();
        let ours = *self.span.lock();
        Ok(to_native_bool(ours == theirs))
    }

    fn compare_endpoints(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<i32> {
        self.check()?;
        let endpoint = parse_endpoint(endpoint)?;
        let target_endpoint = parse_endpoint(target_endpoint)?;
        let other = self.peer(range)?;
        let theirs = endpoint_of(*other.span.lock(), target_endpoint);
        let ours = endpoint_of(*self.span.lock(), endpoint);
        Ok(match ours.cmp(&theirs) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        })
    }

    fn expand_to_enclosing_unit(&self, unit: i32) -> NativeResult<()> {
        self.check()?;
        let unit = parse_unit(unit)?;
        let doc = &self.document;
        let mut span = self.span.lock();

        let mut start = doc.floor(unit, span.0);
        let mut end = doc.ceil(unit, span.1.max(start));
        if end == start {
            match doc.next_boundary(unit, start) {
                Some(next) => end = next,
                None => start = doc.prev_boundary(unit, start).unwrap_or(0),
            }
        }
        *span = (start, end);
        Ok(())
    }

    fn find_attribute(
        &self,
        attribute_id: i32,
        value: NativeValue,
        backward: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>> {
        self.check()?;
        let doc = &self.document;
        let (start, end) = *self.span.lock();
        let matches = |pos: usize| doc.value_at(attribute_id, pos) == value;

        if from_native_bool(backward) {
            let Some(last) = (start..end).rev().find(|&p| matches(p)) else {
                return Ok(None);
            };
            let mut first = last;
            while first > start && matches(first - 1) {
                first -= 1;
            }
            Ok(Some(self.subrange(first, last + 1)))
        } else {
            let Some(first) = (start..end).find(|&p| matches(p)) else {
                return Ok(None);
            };
            let mut last = first + 1;
            while last < end && matches(last) {
                last += 1;
            }
            Ok(Some(self.subrange(first, last)))
        }
    }

    fn find_text(
        &self,
        text: &str,
        backward: NativeBool,
        ignore_case: NativeBool,
    ) -> NativeResult<Option<TextRangeHandle>> {
        self.check()?;
        if text.is_empty() {
            return Err(NativeStatus::INVALID_ARG);
        }
        let (start, end) = *self.span.lock();
        let haystack: String = self.document.chars[start..end].iter().collect();
        let pattern = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(from_native_bool(ignore_case))
            .build()
            .map_err(|_| NativeStatus::INVALID_ARG)?;

        let found = if from_native_bool(backward) {
            pattern.find_iter(&haystack).last()
        } else {
            pattern.find(&haystack)
        };

        Ok(found.map(|m| {
            let first = start + haystack[..m.start()].chars().count();
            let last = first + m.as_str().chars().count();
            self.subrange(first, last)
        }))
    }

    fn attribute_value(&self, attribute_id: i32) -> NativeResult<NativeValue> {
        self.check()?;
        let doc = &self.document;
        let (start, end) = *self.span.lock();
        let first = doc.value_at(attribute_id, start);
        if (start + 1..end).any(|p| doc.value_at(attribute_id, p) != first) {
            return Ok(NativeValue::Mixed);
        }
        Ok(first)
    }

    fn bounding_rectangles(&self) -> NativeResult<Option<Vec<f64>>> {
        self.check()?;
        let doc = &self.document;
        let (start, end) = *self.span.lock();
        let values = doc
            .line_segments(start, end)
            .into_iter()
            .flat_map(|(line, column, count)| {
                [
                    column as f64 * doc.char_width,
                    line as f64 * doc.line_height,
                    count as f64 * doc.char_width,
                    doc.line_height,
                ]
            })
            .collect();
        Ok(Some(values))
    }

    fn enclosing_element(&self) -> NativeResult<Option<ElementHandle>> {
        self.check()?;
        Ok(Some(self.document.enclosing.clone()))
    }

    fn text(&self, max_length: i32) -> NativeResult<String> {
        self.check()?;
        if max_length < -1 {
            return Err(NativeStatus::INVALID_ARG);
        }
        let (start, end) = *self.span.lock();
        let limit = usize::try_from(max_length).unwrap_or(usize::MAX);
        Ok(self.document.chars[start..end].iter().take(limit).collect())
    }

    fn move_by(&self, unit: i32, count: i32) -> NativeResult<i32> {
        self.check()?;
        let unit = parse_unit(unit)?;
        let doc = &self.document;
        let len = doc.len();
        let mut span = self.span.lock();
        if count == 0 {
            return Ok(0);
        }

        let degenerate = span.0 == span.1;
        let mut pos = doc.floor(unit, span.0);
        let mut moved = 0;
        if count > 0 {
            while moved < count {
                match doc.next_boundary(unit, pos) {
                    // A non-empty range needs a whole unit after its new start.
                    Some(next) if next < len || degenerate => {
                        pos = next;
                        moved += 1;
                    }
                    _ => break,
                }
            }
        } else {
            while moved > count {
                match doc.prev_boundary(unit, pos) {
                    Some(prev) => {
                        pos = prev;
                        moved -= 1;
                    }
                    None => break,
                }
            }
        }

        *span = if degenerate {
            (pos, pos)
        } else {
            (pos, doc.next_boundary(unit, pos).unwrap_or(len))
        };
        Ok(moved)
    }

    fn move_endpoint_by_unit(&self, endpoint: i32, unit: i32, count: i32) -> NativeResult<i32> {
        self.check()?;
        let endpoint = parse_endpoint(endpoint)?;
        let unit = parse_unit(unit)?;
        let doc = &self.document;
        let mut span = self.span.lock();

        let mut pos = endpoint_of(*span, endpoint);
        let mut moved = 0;
        while moved < count {
            match doc.next_boundary(unit, pos) {
                Some(next) => {
                    pos = next;
                    moved += 1;
                }
                None => break,
            }
        }
        while moved > count {
            match doc.prev_boundary(unit, pos) {
                Some(prev) => {
                    pos = prev;
                    moved -= 1;
                }
                None => break,
            }
        }

        set_endpoint(&mut span, endpoint, pos);
        Ok(moved)
    }

    fn move_endpoint_by_range(
        &self,
        endpoint: i32,
        range: &dyn NativeTextRange,
        target_endpoint: i32,
    ) -> NativeResult<()> {
        self.check()?;
        let endpoint = parse_endpoint(endpoint)?;
        let target_endpoint = parse_endpoint(target_endpoint)?;
        let other = self.peer(range)?;
        let pos = endpoint_of(*other.span.lock(), target_endpoint);
        set_endpoint(&mut self.span.lock(), endpoint, pos);
        Ok(())
    }

    fn select(&self) -> NativeResult<()> {
        self.check_enabled()?;
        let span = *self.span.lock();
        *self.document.selection.lock() = vec![span];
        Ok(())
    }

    fn add_to_selection(&self) -> NativeResult<()> {
        self.check_enabled()?;
        if !self.document.multiple_selection {
            return Err(NativeStatus::INVALID_OPERATION);
        }
        let span = *self.span.lock();
        let mut selection = self.document.selection.lock();
        if !selection.contains(&span) {
            selection.push(span);
        }
        Ok(())
    }

    fn remove_from_selection(&self) -> NativeResult<()> {
        self.check_enabled()?;
        if !self.document.multiple_selection {
            return Err(NativeStatus::INVALID_OPERATION);
        }
        let span = *self.span.lock();
        self.document.selection.lock().retain(|s| *s != span);
        Ok(())
    }

    fn scroll_into_view(&self, align_to_top: NativeBool) -> NativeResult<()> {
        self.check_enabled()?;
        if !self.document.scrollable {
            return Err(NativeStatus::NOT_SUPPORTED);
        }
        let align_to_top = from_native_bool(align_to_top);
        let (start, end) = *self.span.lock();
        let anchor = if align_to_top { start } else { end };
        *self.document.scrolled_to.lock() = Some((anchor, align_to_top));
        Ok(())
    }

    fn children(&self) -> NativeResult<Option<Vec<ElementHandle>>> {
        self.check()?;
        let (start, end) = *self.span.lock();
        Ok(Some(
            self.document
                .children
                .iter()
                .filter(|(pos, _)| (start..end).contains(pos))
                .map(|(_, element)| element.clone())
                .collect(),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(u: TextUnit) -> i32 {
        u as i32
    }

    const START: i32 = TextPatternRangeEndpoint::Start as i32;
    const END: i32 = TextPatternRangeEndpoint::End as i32;

    fn span_of(range: &TextRangeHandle) -> Range<usize> {
        MemoryTextRange::downcast(range.as_ref()).unwrap().span()
    }

    #[test]
    fn test_word_boundaries() {
        let provider = MemoryProvider::new();
        let doc = provider.document("hello big world").build();
        assert_eq!(doc.next_boundary(TextUnit::Word, 0), Some(6));
        assert_eq!(doc.next_boundary(TextUnit::Word, 6), Some(10));
        assert_eq!(doc.next_boundary(TextUnit::Word, 10), Some(15));
        assert_eq!(doc.prev_boundary(TextUnit::Word, 8), Some(6));
        assert_eq!(doc.next_boundary(TextUnit::Word, 15), None);
    }

    #[test]
    fn test_expand_to_word() {
        let provider = MemoryProvider::new();
        let doc = provider.document("hello big world").build();
        let range = doc.range(7, 7);
        range.expand_to_enclosing_unit(unit(TextUnit::Word)).unwrap();
        assert_eq!(span_of(&range), 6..10);

        let range = doc.range(15, 15);
        range.expand_to_enclosing_unit(unit(TextUnit::Word)).unwrap();
        assert_eq!(span_of(&range), 10..15);
    }

    #[test]
    fn test_move_clips_at_end() {
        let provider = MemoryProvider::new();
        let doc = provider.document("one\ntwo\nthree").build();
        let range = doc.range(0, 3);
        assert_eq!(range.move_by(unit(TextUnit::Line), 5).unwrap(), 2);
        assert_eq!(span_of(&range), 8..13);
        assert_eq!(range.move_by(unit(TextUnit::Line), -5).unwrap(), -2);
        assert_eq!(span_of(&range), 0..4);
    }

    #[test]
    fn test_degenerate_move_reaches_end() {
        let provider = MemoryProvider::new();
        let doc = provider.document("abc").build();
        let range = doc.range(0, 0);
        assert_eq!(range.move_by(unit(TextUnit::Character), 10).unwrap(), 3);
        assert_eq!(span_of(&range), 3..3);
    }

    #[test]
    fn test_endpoint_crossing_collapses() {
        let provider = MemoryProvider::new();
        let doc = provider.document("abcdef").build();
        let range = doc.range(1, 3);
        assert_eq!(
            range
                .move_endpoint_by_unit(START, unit(TextUnit::Character), 4)
                .unwrap(),
            4
        );
        assert_eq!(span_of(&range), 5..5);

        let range = doc.range(2, 4);
        range
            .move_endpoint_by_unit(END, unit(TextUnit::Character), -3)
            .unwrap();
        assert_eq!(span_of(&range), 1..1);
    }

    #[test]
    fn test_line_segments() {
        let provider = MemoryProvider::new();
        let doc = provider.document("ab\ncd").build();
        assert_eq!(doc.line_segments(1, 5), vec![(0, 1, 1), (1, 0, 2)]);
        assert!(doc.line_segments(2, 3).is_empty());
    }

    #[test]
    fn test_attribute_runs() {
        let provider = MemoryProvider::new();
        let doc = provider
            .document("plain bold")
            .default_attribute(40007, NativeValue::Int(400))
            .attribute(6..10, 40007, NativeValue::Int(700))
            .build();
        assert_eq!(doc.value_at(40007, 0), NativeValue::Int(400));
        assert_eq!(doc.value_at(40007, 7), NativeValue::Int(700));
        assert_eq!(doc.value_at(40005, 0), NativeValue::NotSupported);
        assert!(doc.is_boundary(TextUnit::Format, 6));
    }

    #[test]
    fn test_stale_document() {
        let provider = MemoryProvider::new();
        let doc = provider.document("abc").build();
        let range = doc.range_all();
        doc.invalidate();
        assert_eq!(range.text(-1).unwrap_err(), NativeStatus::ELEMENT_NOT_AVAILABLE);
        assert!(provider.find_document(&doc.id()).is_some());
    }

    #[test]
    fn test_dropped_documents_are_released() {
        let provider = MemoryProvider::new();
        let doc = provider.document("short lived").build();
        let id = doc.id();
        let range = doc.range_all();
        drop(doc);

        // The range still holds the content.
        assert!(provider.find_document(&id).is_some());
        assert_eq!(provider.document_count(), 1);

        drop(range);
        assert!(provider.find_document(&id).is_none());
        assert_eq!(provider.document_count(), 0);
    }

    #[test]
    fn test_registry_stays_bounded() {
        let provider = MemoryProvider::new();
        for i in 0..100 {
            provider.document(&format!("doc {i}")).build();
        }
        let kept = provider.document("kept").build();
        assert_eq!(provider.documents.len(), 1);
        assert_eq!(provider.find_document(&kept.id()).map(|d| d.id()), Some(kept.id()));
    }

    #[test]
    fn test_disabled_document_rejects_selection() {
        let provider = MemoryProvider::new();
        let doc = provider.document("locked").disabled().build();
        let range = doc.range_all();
        assert_eq!(range.select().unwrap_err(), NativeStatus::ELEMENT_NOT_ENABLED);
        assert_eq!(
            range.scroll_into_view(to_native_bool(true)).unwrap_err(),
            NativeStatus::ELEMENT_NOT_ENABLED
        );
        assert_eq!(range.text(-1).unwrap(), "locked");
    }
}
