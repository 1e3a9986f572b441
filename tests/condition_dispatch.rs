//! Condition construction and wrap dispatch against the in-memory provider.

mod common;

use std::sync::Arc;

use uia_bridge::native::{NativeBool, NativeResult, NativeValue};
use uia_bridge::provider::{
    ConditionHandle, NativeBoolCondition, NativeCondition, NativePropertyCondition,
};
use uia_bridge::types::OrientationType;
use uia_bridge::{
    AutomationElement, AutomationError, AutomationProperty, AutomationValue, Condition,
    ConditionKind, ConditionSnapshot, PropertyCondition, PropertyConditionFlags,
};

fn name_is(name: &str) -> Condition {
    Condition::property(&AutomationProperty::NAME, name).unwrap()
}

fn names_of(conditions: &[Condition]) -> Vec<AutomationValue> {
    conditions
        .iter()
        .map(|c| match c {
            Condition::Property(p) => p.value().unwrap(),
            other => panic!("expected property condition, got {:?}", other.kind()),
        })
        .collect()
}

#[test]
fn test_bool_conditions_are_singletons() {
    common::provider();
    let first = Condition::true_condition().unwrap();
    let second = Condition::true_condition().unwrap();
    assert!(Arc::ptr_eq(first.native(), second.native()));

    let falsy = Condition::false_condition().unwrap();
    assert!(!Arc::ptr_eq(first.native(), falsy.native()));

    match (first, falsy) {
        (Condition::Bool(t), Condition::Bool(f)) => {
            assert!(t.value().unwrap());
            assert!(!f.value().unwrap());
        }
        _ => panic!("bool singletons must wrap as Bool"),
    }
}

#[test]
fn test_bool_singletons_are_shared_across_threads() {
    common::provider();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let condition = if i % 2 == 0 {
                    Condition::true_condition()
                } else {
                    Condition::false_condition()
                };
                (i % 2 == 0, condition.unwrap().native().clone())
            })
        })
        .collect();

    let expected_true = Condition::true_condition().unwrap();
    let expected_false = Condition::false_condition().unwrap();
    for handle in handles {
        let (truthy, native) = handle.join().unwrap();
        let expected = if truthy { &expected_true } else { &expected_false };
        assert!(Arc::ptr_eq(&native, expected.native()));
    }
}

#[test]
fn test_round_trip_keeps_variant() {
    common::provider();
    let leaf = name_is("OK");
    let conditions = vec![
        Condition::true_condition().unwrap(),
        Condition::and(&[leaf.clone()]).unwrap(),
        Condition::or(&[leaf.clone()]).unwrap(),
        Condition::not(&leaf).unwrap(),
        leaf,
    ];

    for condition in &conditions {
        let native = Condition::unwrap(Some(condition)).unwrap();
        let rewrapped = Condition::wrap(native).unwrap();
        assert_eq!(rewrapped.kind(), condition.kind());
    }

    let kinds: Vec<_> = conditions.iter().map(Condition::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConditionKind::Bool,
            ConditionKind::And,
            ConditionKind::Or,
            ConditionKind::Not,
            ConditionKind::Property
        ]
    );
}

#[test]
fn test_property_round_trip_equality() {
    common::provider();
    let flags = PropertyConditionFlags::IGNORE_CASE | PropertyConditionFlags::MATCH_SUBSTRING;
    let original = PropertyCondition::with_flags(&AutomationProperty::NAME, "Save", flags).unwrap();
    let native = Condition::Property(original).native().clone();

    let Condition::Property(rewrapped) = Condition::wrap(native).unwrap() else {
        panic!("expected property condition");
    };
    assert_eq!(rewrapped.property_id().unwrap(), AutomationProperty::NAME.id());
    assert_eq!(rewrapped.property().unwrap(), Some(AutomationProperty::NAME));
    assert_eq!(rewrapped.value().unwrap(), AutomationValue::from("Save"));
    assert_eq!(rewrapped.flags().unwrap(), flags);
}

#[test]
fn test_property_flags_default_to_none() {
    common::provider();
    let condition = PropertyCondition::new(&AutomationProperty::IS_ENABLED, true).unwrap();
    assert_eq!(condition.flags().unwrap(), PropertyConditionFlags::empty());
    assert_eq!(condition.value().unwrap(), AutomationValue::Bool(true));
}

#[test]
fn test_enum_value_travels_as_integer() {
    common::provider();
    let condition =
        PropertyCondition::new(&AutomationProperty::ORIENTATION, OrientationType::VERTICAL).unwrap();
    let value = condition.value().unwrap();
    let member = value
        .as_enum(uia_bridge::EnumKind::Orientation)
        .expect("orientation member");
    assert_eq!(member.raw(), 2);
    assert_eq!(member.get::<OrientationType>(), Some(OrientationType::VERTICAL));
    assert_eq!(member.name(), Some("Vertical"));
}

#[test]
fn test_element_value_round_trip() {
    let provider = common::provider();
    let label = AutomationElement::from_native(
        provider.create_element([(30005, NativeValue::String("Label".into()))]),
    );
    let condition = PropertyCondition::new(&AutomationProperty::LABELED_BY, label.clone()).unwrap();
    assert_eq!(condition.value().unwrap().as_element(), Some(&label));
}

#[test]
fn test_property_requires_identifier() {
    common::provider();
    let err = PropertyCondition::new(&AutomationProperty::custom(0, "Null"), 1).unwrap_err();
    assert!(matches!(err, AutomationError::InvalidArgument(_)));
}

#[test]
fn test_composites_preserve_order() {
    common::provider();
    for count in [0usize, 1, 2, 5] {
        let children: Vec<Condition> = (0..count).map(|i| name_is(&format!("item {i}"))).collect();
        let expected: Vec<AutomationValue> = (0..count)
            .map(|i| AutomationValue::from(format!("item {i}")))
            .collect();

        let Condition::And(and) = Condition::and(&children).unwrap() else {
            panic!("expected and condition");
        };
        assert_eq!(names_of(&and.conditions().unwrap()), expected);

        let Condition::Or(or) = Condition::or(&children).unwrap() else {
            panic!("expected or condition");
        };
        assert_eq!(names_of(&or.conditions().unwrap()), expected);
    }
}

#[test]
fn test_children_are_rewrapped_on_every_read() {
    common::provider();
    let leaf = name_is("child");
    let Condition::Not(not) = Condition::not(&leaf).unwrap() else {
        panic!("expected not condition");
    };

    let first = not.condition().unwrap();
    let second = not.condition().unwrap();
    assert_eq!(first.kind(), ConditionKind::Property);
    assert!(Arc::ptr_eq(first.native(), second.native()));
    assert!(Arc::ptr_eq(first.native(), leaf.native()));
}

#[test]
fn test_nested_snapshot() {
    common::provider();
    let tree = Condition::and(&[
        Condition::not(&Condition::false_condition().unwrap()).unwrap(),
        Condition::or(&[name_is("a"), name_is("b")]).unwrap(),
    ])
    .unwrap();

    let snapshot = tree.snapshot().unwrap();
    let ConditionSnapshot::And { conditions } = &snapshot else {
        panic!("expected and snapshot");
    };
    assert_eq!(
        conditions[0],
        ConditionSnapshot::Not {
            condition: Box::new(ConditionSnapshot::Bool { value: false })
        }
    );

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["type"], "and");
    assert_eq!(json["conditions"][1]["type"], "or");
    assert_eq!(json["conditions"][1]["conditions"][0]["property"], "Name");
}

#[derive(Debug)]
struct Opaque;

impl NativeCondition for Opaque {}

/// Answers both the Bool and the Property capability query.
#[derive(Debug)]
struct Ambiguous;

impl NativeCondition for Ambiguous {
    fn as_bool_condition(&self) -> Option<&dyn NativeBoolCondition> {
        Some(self)
    }

    fn as_property_condition(&self) -> Option<&dyn NativePropertyCondition> {
        Some(self)
    }
}

impl NativeBoolCondition for Ambiguous {
    fn boolean_value(&self) -> NativeResult<NativeBool> {
        Ok(1)
    }
}

impl NativePropertyCondition for Ambiguous {
    fn property_id(&self) -> NativeResult<i32> {
        Ok(30005)
    }

    fn property_value(&self) -> NativeResult<NativeValue> {
        Ok(NativeValue::String("ambiguous".into()))
    }

    fn property_condition_flags(&self) -> NativeResult<u32> {
        Ok(0)
    }
}

#[test]
fn test_unclassifiable_handle_is_rejected() {
    let handle: ConditionHandle = Arc::new(Opaque);
    assert_eq!(Condition::wrap(handle).unwrap_err(), AutomationError::UnsupportedVariant);
    assert_eq!(
        Condition::wrap_optional(None).unwrap_err(),
        AutomationError::UnsupportedVariant
    );
}

#[test]
fn test_capability_order_decides_ambiguous_handles() {
    let handle: ConditionHandle = Arc::new(Ambiguous);
    let condition = Condition::wrap(handle).unwrap();
    assert_eq!(condition.kind(), ConditionKind::Bool);
}

#[test]
fn test_vectorized_wrap_preserves_order_and_length() {
    let handles: Vec<ConditionHandle> = vec![Arc::new(Ambiguous), Arc::new(Ambiguous)];
    let wrapped = Condition::wrap_all(handles.clone()).unwrap();
    assert_eq!(wrapped.len(), 2);

    let unwrapped = Condition::unwrap_all(&wrapped);
    for (before, after) in handles.iter().zip(&unwrapped) {
        assert!(Arc::ptr_eq(before, after));
    }
    assert!(Condition::unwrap(None).is_none());

    let with_opaque: Vec<ConditionHandle> = vec![Arc::new(Ambiguous), Arc::new(Opaque)];
    assert!(Condition::wrap_all(with_opaque).is_err());
}
