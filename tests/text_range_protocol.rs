//! Text range operations against in-memory documents.

mod common;

use uia_bridge::native::{NativeStatus, NativeValue};
use uia_bridge::types::ControlType;
use uia_bridge::{
    AutomationError, AutomationProperty, AutomationTextAttribute, AutomationValue, Culture,
    ErrorKind, Rect, TextPatternRange, TextPatternRangeEndpoint as Endpoint, TextUnit,
};

fn range(text: &str, start: usize, end: usize) -> TextPatternRange {
    let doc = common::provider().document(text).build();
    TextPatternRange::from_native(doc.range(start, end))
}

fn text_of(range: &TextPatternRange) -> String {
    range.text_all().unwrap()
}

#[test]
fn test_clone_is_independent() {
    let original = range("hello world", 0, 5);
    let copy = original.try_clone().unwrap();
    assert!(original.compare(&copy).unwrap());

    copy.move_by(TextUnit::Word, 1).unwrap();
    assert_eq!(text_of(&original), "hello");
    assert_eq!(text_of(&copy), "world");
    assert!(!original.compare(&copy).unwrap());
}

#[test]
fn test_compare_endpoints_reports_sign() {
    let doc = common::provider().document("abcdefgh").build();
    let left = TextPatternRange::from_native(doc.range(0, 3));
    let right = TextPatternRange::from_native(doc.range(5, 8));

    assert_eq!(left.compare_endpoints(Endpoint::End, &right, Endpoint::Start).unwrap(), -1);
    assert_eq!(right.compare_endpoints(Endpoint::Start, &left, Endpoint::End).unwrap(), 1);
    assert_eq!(left.compare_endpoints(Endpoint::Start, &left, Endpoint::Start).unwrap(), 0);
}

#[test]
fn test_ranges_over_different_content() {
    let first = range("same text", 0, 4);
    let second = range("same text", 0, 4);

    assert!(!first.compare(&second).unwrap());
    let err = first
        .compare_endpoints(Endpoint::Start, &second, Endpoint::Start)
        .unwrap_err();
    assert_eq!(
        err,
        AutomationError::AutomationCallFailed {
            code: NativeStatus::INVALID_ARG.bits()
        }
    );
}

#[test]
fn test_expand_to_enclosing_unit() {
    let doc = common::provider().document("first line\nsecond line\n").build();
    let range = TextPatternRange::from_native(doc.range(13, 13));

    range.expand_to_enclosing_unit(TextUnit::Character).unwrap();
    assert_eq!(text_of(&range), "c");

    range.expand_to_enclosing_unit(TextUnit::Word).unwrap();
    assert_eq!(text_of(&range), "second ");

    range.expand_to_enclosing_unit(TextUnit::Line).unwrap();
    assert_eq!(text_of(&range), "second line\n");

    range.expand_to_enclosing_unit(TextUnit::Document).unwrap();
    assert_eq!(text_of(&range), "first line\nsecond line\n");
}

#[test]
fn test_move_never_overshoots() {
    let range = range("one two three", 0, 3);
    assert_eq!(range.move_by(TextUnit::Word, 10).unwrap(), 2);
    assert_eq!(text_of(&range), "three");

    assert_eq!(range.move_by(TextUnit::Word, -10).unwrap(), -2);
    assert_eq!(text_of(&range), "one ");

    assert_eq!(range.move_by(TextUnit::Character, 0).unwrap(), 0);
}

#[test]
fn test_moving_start_past_end_collapses() {
    let range = range("abcdefgh", 2, 4);
    let moved = range
        .move_endpoint_by_unit(Endpoint::Start, TextUnit::Character, 5)
        .unwrap();
    assert_eq!(moved, 5);
    assert_eq!(range.compare_endpoints(Endpoint::Start, &range, Endpoint::End).unwrap(), 0);
    assert_eq!(text_of(&range), "");
}

#[test]
fn test_moving_end_before_start_collapses() {
    let range = range("abcdefgh", 4, 6);
    range
        .move_endpoint_by_unit(Endpoint::End, TextUnit::Character, -5)
        .unwrap();
    assert_eq!(range.compare_endpoints(Endpoint::Start, &range, Endpoint::End).unwrap(), 0);
}

#[test]
fn test_move_endpoint_by_range() {
    let doc = common::provider().document("abcdefgh").build();
    let range = TextPatternRange::from_native(doc.range(1, 3));
    let target = TextPatternRange::from_native(doc.range(5, 7));

    range
        .move_endpoint_by_range(Endpoint::End, &target, Endpoint::End)
        .unwrap();
    assert_eq!(text_of(&range), "bcdefg");

    range
        .move_endpoint_by_range(Endpoint::Start, &target, Endpoint::End)
        .unwrap();
    assert_eq!(range.compare_endpoints(Endpoint::Start, &range, Endpoint::End).unwrap(), 0);
}

#[test]
fn test_find_text() {
    let range = range("Find me, then find me again", 0, 27);

    let found = range.find_text("FIND", false, true).unwrap().expect("match");
    assert_eq!(text_of(&found), "Find");
    assert_eq!(
        found.compare_endpoints(Endpoint::Start, &range, Endpoint::Start).unwrap(),
        0
    );

    let last = range.find_text("find me", true, false).unwrap().expect("match");
    assert_eq!(text_of(&last), "find me");
    assert_eq!(last.compare_endpoints(Endpoint::Start, &found, Endpoint::Start).unwrap(), 1);

    assert!(range.find_text("FIND", false, false).unwrap().is_none());
    assert!(range.find_text("absent", false, true).unwrap().is_none());
}

#[test]
fn test_find_attribute() {
    let doc = common::provider()
        .document("plain italic plain")
        .default_attribute(AutomationTextAttribute::IS_ITALIC.id(), NativeValue::Bool(false))
        .attribute(6..12, AutomationTextAttribute::IS_ITALIC.id(), NativeValue::Bool(true))
        .build();
    let range = TextPatternRange::from_native(doc.range_all());

    let italic = range
        .find_attribute(&AutomationTextAttribute::IS_ITALIC, true, false)
        .unwrap()
        .expect("italic run");
    assert_eq!(text_of(&italic), "italic");

    let last_plain = range
        .find_attribute(&AutomationTextAttribute::IS_ITALIC, false, true)
        .unwrap()
        .expect("plain run");
    assert_eq!(text_of(&last_plain), " plain");

    let err = range
        .find_attribute(&AutomationTextAttribute::IS_ITALIC, AutomationValue::Empty, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_attribute_values() {
    let doc = common::provider()
        .document("Regular Bold")
        .default_attribute(AutomationTextAttribute::FONT_NAME.id(), NativeValue::String("Segoe UI".into()))
        .default_attribute(AutomationTextAttribute::FONT_WEIGHT.id(), NativeValue::Int(400))
        .default_attribute(AutomationTextAttribute::CULTURE.id(), NativeValue::Int(0))
        .attribute(8..12, AutomationTextAttribute::FONT_WEIGHT.id(), NativeValue::Int(700))
        .build();
    let all = TextPatternRange::from_native(doc.range_all());
    let bold = TextPatternRange::from_native(doc.range(8, 12));

    assert_eq!(
        all.attribute_value(&AutomationTextAttribute::FONT_NAME).unwrap(),
        AutomationValue::from("Segoe UI")
    );
    assert_eq!(
        all.attribute_value(&AutomationTextAttribute::FONT_WEIGHT).unwrap(),
        AutomationValue::Mixed
    );
    assert_eq!(
        bold.attribute_value(&AutomationTextAttribute::FONT_WEIGHT).unwrap(),
        AutomationValue::Int(700)
    );
    assert_eq!(
        all.attribute_value(&AutomationTextAttribute::CULTURE).unwrap(),
        AutomationValue::Culture(Culture::invariant())
    );
}

#[test]
fn test_not_supported_attribute_is_a_value() {
    let range = range("text", 0, 4);
    let value = range
        .attribute_value(&AutomationTextAttribute::CAP_STYLE)
        .unwrap();
    assert!(value.is_not_supported());
}

#[test]
fn test_unknown_attribute_is_rejected() {
    let range = range("text", 0, 4);
    let err = range
        .attribute_value(&AutomationTextAttribute::custom(49_999, "Custom"))
        .unwrap_err();
    assert_eq!(err, AutomationError::UnsupportedAttribute(49_999));
}

#[test]
fn test_bounding_rectangles_per_line() {
    let doc = common::provider().document("ab\ncde").char_size(10.0, 20.0).build();
    let range = TextPatternRange::from_native(doc.range(1, 6));
    let rects = range.bounding_rectangles().unwrap().expect("rectangles");
    assert_eq!(
        rects,
        vec![Rect::new(10.0, 0.0, 10.0, 20.0), Rect::new(0.0, 20.0, 30.0, 20.0)]
    );

    let empty = TextPatternRange::from_native(doc.range(2, 2));
    assert_eq!(empty.bounding_rectangles().unwrap(), Some(Vec::new()));
}

#[test]
fn test_enclosing_element_and_children() {
    let provider = common::provider();
    let image = provider.create_element([(AutomationProperty::NAME.id(), NativeValue::String("logo".into()))]);
    let doc = provider.document("see \u{FFFC} here").child(4, image).build();

    let all = TextPatternRange::from_native(doc.range_all());
    let enclosing = all.enclosing_element().unwrap().expect("enclosing element");
    assert_eq!(
        enclosing
            .current_property_value(&AutomationProperty::CONTROL_TYPE)
            .unwrap(),
        AutomationValue::ControlType(ControlType::DOCUMENT)
    );

    let children = all.children().unwrap().expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(
        children[0]
            .current_property_value(&AutomationProperty::NAME)
            .unwrap(),
        AutomationValue::from("logo")
    );

    let before = TextPatternRange::from_native(doc.range(0, 3));
    assert_eq!(before.children().unwrap().map(|c| c.len()), Some(0));
}

#[test]
fn test_selection() {
    let doc = common::provider().document("alpha beta gamma").build();
    let alpha = TextPatternRange::from_native(doc.range(0, 5));
    let gamma = TextPatternRange::from_native(doc.range(11, 16));

    alpha.select().unwrap();
    gamma.add_to_selection().unwrap();
    assert_eq!(doc.selection(), vec![0..5, 11..16]);

    alpha.remove_from_selection().unwrap();
    assert_eq!(doc.selection(), vec![11..16]);

    alpha.select().unwrap();
    assert_eq!(doc.selection(), vec![0..5]);
}

#[test]
fn test_single_selection_rejects_add_and_remove() {
    let doc = common::provider().document("alpha beta").single_selection().build();
    let beta = TextPatternRange::from_native(doc.range(6, 10));

    beta.select().unwrap();
    assert_eq!(beta.add_to_selection().unwrap_err().kind(), ErrorKind::RequestNotSupported);
    assert_eq!(
        beta.remove_from_selection().unwrap_err().kind(),
        ErrorKind::RequestNotSupported
    );
    assert_eq!(doc.selection(), vec![6..10]);
}

#[test]
fn test_scroll_into_view() {
    let doc = common::provider().document("line\nline\nline").build();
    let last = TextPatternRange::from_native(doc.range(10, 14));
    last.scroll_into_view(true).unwrap();
    assert_eq!(doc.scrolled_to(), Some((10, true)));

    let fixed = common::provider().document("static").not_scrollable().build();
    let range = TextPatternRange::from_native(fixed.range_all());
    range.scroll_into_view(false).unwrap();
    assert_eq!(fixed.scrolled_to(), None);
}

#[test]
fn test_scroll_into_view_reports_disabled_content() {
    let doc = common::provider().document("read only").disabled().build();
    let range = TextPatternRange::from_native(doc.range_all());

    let err = range.scroll_into_view(true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestNotSupported);
    assert_eq!(err.code(), Some(NativeStatus::ELEMENT_NOT_ENABLED));
    assert_eq!(doc.scrolled_to(), None);

    assert_eq!(
        range.select().unwrap_err().code(),
        Some(NativeStatus::ELEMENT_NOT_ENABLED)
    );
}

#[test]
fn test_ranges_keep_their_content_registered() {
    let provider = common::provider();
    let doc = provider.document("kept alive").build();
    let id = doc.id();
    let range = TextPatternRange::from_native(doc.range_all());
    drop(doc);

    assert!(provider.find_document(&id).is_some());
    assert_eq!(text_of(&range), "kept alive");
    drop(range);
    assert!(provider.find_document(&id).is_none());
}

#[test]
fn test_text_length_limit() {
    let range = range("abcdef", 0, 6);
    assert_eq!(range.text(3).unwrap(), "abc");
    assert_eq!(range.text(0).unwrap(), "");
    assert_eq!(range.text(-1).unwrap(), "abcdef");
    assert_eq!(range.text(-2).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_stale_content() {
    let doc = common::provider().document("gone soon").build();
    let range = TextPatternRange::from_native(doc.range_all());
    doc.invalidate();

    let err = range.move_by(TextUnit::Word, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ElementNotAvailable);
    assert_eq!(
        range.scroll_into_view(true).unwrap_err().kind(),
        ErrorKind::ElementNotAvailable
    );
}
