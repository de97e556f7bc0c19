// Tests for the mapping engine: path resolution, value application, failures
use crate::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ==================== Test structs ====================

#[derive(Debug, Default, PartialEq, Captures)]
#[capture(rename_all = "PascalCase")]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub tags: Vec<String>,
    pub nickname: Option<String>,
    pub score: Option<f64>,
    pub order: Option<Order>,
    internal: u32,
}

#[derive(Debug, Default, PartialEq, Captures)]
#[capture(rename_all = "PascalCase")]
pub struct Order {
    pub total: f64,
    pub customer: Option<Customer>,
    pub quantities: Vec<u32>,
}

#[derive(Debug, Default, PartialEq, Captures)]
#[capture(rename_all = "PascalCase")]
pub struct Customer {
    pub first_name: String,
    pub vip: bool,
}

fn person_match() -> MatchResult {
    MatchResult::new("Alice 30 x y")
        .with_group("Name", ["Alice"])
        .with_group("Age", ["30"])
        .with_group("Tags", ["x", "y"])
}

// ==================== Testable properties ====================

#[test]
fn test_whole_match_only_leaves_target_unchanged() {
    let m = MatchResult::new("anything");
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person, Person::default());

    let existing = Person {
        name: "Bob".to_string(),
        age: 7,
        ..Default::default()
    };
    let expected = Person {
        name: "Bob".to_string(),
        age: 7,
        ..Default::default()
    };
    let person = map_match_to_object(&m, None, Some(existing)).unwrap();
    assert_eq!(person, expected);
}

#[test]
fn test_whole_match_group_is_skipped() {
    // A group at ordinal 0 is never mapped, even when its name matches a field
    let m = MatchResult::from_groups(vec![Group::with_captures("Name", ["whole"])]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person.name, "");
}

#[test]
fn test_scalar_field_assignment() {
    let person: Person = map_match_to_object(&person_match(), None, None).unwrap();
    assert_eq!(person.name, "Alice");
    assert_eq!(person.age, 30);
}

#[test]
fn test_name_and_tags_example() {
    let person: Person = map_match_to_object(&person_match(), None, None).unwrap();
    assert_eq!(person.name, "Alice");
    assert_eq!(person.tags, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_collection_appends_in_capture_order() {
    let m = MatchResult::new("").with_group("Order__Quantities", ["3", "1", "2"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person.order.unwrap().quantities, vec![3, 1, 2]);
}

#[test]
fn test_collection_keeps_existing_elements() {
    let m = MatchResult::new("").with_group("Tags", ["b"]);
    let existing = Person {
        tags: vec!["a".to_string()],
        ..Default::default()
    };
    let person = map_match_to_object(&m, None, Some(existing)).unwrap();
    assert_eq!(person.tags, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_nested_object_is_created() {
    let m = MatchResult::new("19.99").with_group("Order__Total", ["19.99"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    let order = person.order.expect("order should be created");
    assert_eq!(order.total, 19.99);
    assert!(order.customer.is_none());
}

#[test]
fn test_three_level_path() {
    let m = MatchResult::new("")
        .with_group("Order__Customer__FirstName", ["Ada"])
        .with_group("Order__Customer__Vip", ["TRUE"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    let customer = person.order.unwrap().customer.unwrap();
    assert_eq!(customer.first_name, "Ada");
    assert!(customer.vip);
}

#[test]
fn test_existing_intermediate_is_reused() {
    let m = MatchResult::new("").with_group("Order__Total", ["5"]);
    let existing = Person {
        order: Some(Order {
            quantities: vec![9],
            ..Default::default()
        }),
        ..Default::default()
    };
    let person = map_match_to_object(&m, None, Some(existing)).unwrap();
    let order = person.order.unwrap();
    assert_eq!(order.total, 5.0);
    assert_eq!(order.quantities, vec![9]);
}

#[test]
fn test_intermediate_created_once_per_call() {
    // Both groups share the Order prefix; the second must not replace the first's object
    let m = MatchResult::new("")
        .with_group("Order__Total", ["1.5"])
        .with_group("Order__Quantities", ["4"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    let order = person.order.unwrap();
    assert_eq!(order.total, 1.5);
    assert_eq!(order.quantities, vec![4]);
}

#[test]
fn test_unknown_groups_are_ignored() {
    let m = MatchResult::new("")
        .with_group("Unknown", ["1"])
        .with_group("Order__Missing", ["2"])
        .with_group("Missing__Total", ["3"])
        .with_group("Internal", ["4"])
        .with_group("1", ["5"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    // Only Order__Missing creates the intermediate; nothing else changes
    assert_eq!(person.name, "");
    assert_eq!(person.internal, 0);
    assert_eq!(person.order, Some(Order::default()));
}

#[test]
fn test_descending_through_scalar_is_ignored() {
    let m = MatchResult::new("")
        .with_group("Name__Length", ["3"])
        .with_group("Nickname__Inner", ["x"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person, Person::default());
}

#[test]
fn test_last_capture_wins_for_scalars() {
    let m = MatchResult::new("").with_group("Age", ["1", "2", "3"]);
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person.age, 3);
}

#[test]
fn test_group_without_captures_writes_nothing() {
    let m = MatchResult::new("").with_group("Age", Vec::<String>::new());
    let person: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(person.age, 0);
}

#[test]
fn test_mapping_is_deterministic() {
    let m = person_match().with_group("Order__Customer__FirstName", ["Ada"]);
    let a: Person = map_match_to_object(&m, None, None).unwrap();
    let b: Person = map_match_to_object(&m, None, None).unwrap();
    assert_eq!(a, b);
}

// ==================== Transforms ====================

#[test]
fn test_transform_doubles_age() {
    let transforms = TransformTable::new()
        .with("Age", |s| Ok(CaptureValue::Integer(s.parse::<i64>()? * 2)));
    let m = MatchResult::new("").with_group("Age", ["21"]);
    let person: Person = map_match_to_object(&m, Some(&transforms), None).unwrap();
    assert_eq!(person.age, 42);
}

#[test]
fn test_transform_keyed_by_full_group_name() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let transforms = TransformTable::new()
        .with("Order__Customer__FirstName", move |s| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(s.to_uppercase().into())
        })
        // Keyed by the terminal segment only: must not fire
        .with("FirstName", |_| Ok("wrong".into()));

    let m = MatchResult::new("").with_group("Order__Customer__FirstName", ["ada"]);
    let person: Person = map_match_to_object(&m, Some(&transforms), None).unwrap();
    assert_eq!(person.order.unwrap().customer.unwrap().first_name, "ADA");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transform_runs_per_capture() {
    let transforms =
        TransformTable::new().with("Tags", |s| Ok(format!("#{}", s).into()));
    let m = MatchResult::new("").with_group("Tags", ["a", "b"]);
    let person: Person = map_match_to_object(&m, Some(&transforms), None).unwrap();
    assert_eq!(person.tags, vec!["#a".to_string(), "#b".to_string()]);
}

#[test]
fn test_transform_nil_clears_nullable_field() {
    let transforms = TransformTable::new().with("Nickname", |_| Ok(CaptureValue::Nil));
    let m = MatchResult::new("").with_group("Nickname", ["-"]);
    let existing = Person {
        nickname: Some("old".to_string()),
        ..Default::default()
    };
    let person = map_match_to_object(&m, Some(&transforms), Some(existing)).unwrap();
    assert_eq!(person.nickname, None);
}

#[test]
fn test_transform_nil_resets_plain_scalar() {
    let transforms = TransformTable::new().with("Age", |_| Ok(CaptureValue::Nil));
    let m = MatchResult::new("").with_group("Age", ["12"]);
    let existing = Person {
        age: 99,
        ..Default::default()
    };
    let person = map_match_to_object(&m, Some(&transforms), Some(existing)).unwrap();
    assert_eq!(person.age, 0);
}

#[test]
fn test_transform_not_invoked_for_unknown_field() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let transforms = TransformTable::new().with("Unknown", move |s| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(s.into())
    });
    let m = MatchResult::new("").with_group("Unknown", ["1"]);
    let _: Person = map_match_to_object(&m, Some(&transforms), None).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_transform_error_propagates_unchanged() {
    let transforms = TransformTable::new().with("Age", |s| {
        let n: i64 = s.parse()?;
        Ok(CaptureValue::Integer(n))
    });
    let m = MatchResult::new("").with_group("Age", ["abc"]);
    let err = map_match_to_object::<Person>(&m, Some(&transforms), None).unwrap_err();
    match err {
        MapError::Transform(inner) => {
            assert!(inner.downcast_ref::<std::num::ParseIntError>().is_some());
        }
        other => panic!("expected transform error, got {:?}", other),
    }
}

// ==================== Failures ====================

#[test]
fn test_conversion_failure_is_fatal() {
    let m = MatchResult::new("").with_group("Age", ["thirty"]);
    let err = map_match_to_object::<Person>(&m, None, None).unwrap_err();
    match &err {
        MapError::Convert {
            group,
            field,
            source,
        } => {
            assert_eq!(group, "Age");
            assert_eq!(field, "Age");
            assert!(matches!(source, ConvertError::Invalid { target: "i32", .. }));
        }
        other => panic!("expected conversion error, got {:?}", other),
    }
    assert_eq!(err.group(), Some("Age"));
    assert_eq!(
        err.to_string(),
        "group 'Age', field 'Age': cannot convert 'thirty' to i32"
    );
}

#[test]
fn test_conversion_failure_keeps_earlier_writes() {
    let m = MatchResult::new("")
        .with_group("Name", ["Alice"])
        .with_group("Age", ["bad"])
        .with_group("Tags", ["never"]);
    let mut person = Person::default();
    let result = Mapper::new().map_into(&m, &mut person);
    assert!(result.is_err());
    assert_eq!(person.name, "Alice");
    assert!(person.tags.is_empty());
}

#[test]
fn test_collection_element_conversion_failure() {
    let m = MatchResult::new("").with_group("Order__Quantities", ["1", "-2"]);
    let mut person = Person::default();
    let err = Mapper::new().map_into(&m, &mut person).unwrap_err();
    assert!(matches!(
        err,
        MapError::Convert {
            source: ConvertError::OutOfRange { target: "u32", .. },
            ..
        }
    ));
    // First element was appended before the failure
    assert_eq!(person.order.unwrap().quantities, vec![1]);
}

#[test]
fn test_object_as_terminal_field_fails() {
    let m = MatchResult::new("").with_group("Order", ["x"]);
    let err = map_match_to_object::<Person>(&m, None, None).unwrap_err();
    assert!(matches!(
        err,
        MapError::Convert {
            source: ConvertError::Unsupported {
                from: "string",
                target: "Order"
            },
            ..
        }
    ));
}

// ==================== Mapper configuration ====================

#[test]
fn test_mapper_transform_and_map() {
    let mapper = Mapper::new()
        .transform("Age", |s| Ok(CaptureValue::Integer(s.trim_end_matches('y').parse()?)));
    let m = MatchResult::new("").with_group("Age", ["40y"]);
    let person: Person = mapper.map(&m).unwrap();
    assert_eq!(person.age, 40);
    assert!(mapper.transforms().contains("Age"));
}

#[test]
fn test_mapper_registered_converter_overrides_builtin() {
    let mapper = Mapper::new().converter(|v: CaptureValue| {
        let s = String::from_capture(v)?;
        s.replace(',', "")
            .parse::<f64>()
            .map_err(|_| ConvertError::invalid(&s, "f64"))
    });
    let m = MatchResult::new("").with_group("Order__Total", ["1,234.5"]);
    let person: Person = mapper.map(&m).unwrap();
    assert_eq!(person.order.unwrap().total, 1234.5);
    assert!(mapper.converters().contains::<f64>());
}

#[test]
fn test_mapper_custom_separator() {
    let options = MapOptions {
        separator: ".".to_string(),
        ..Default::default()
    };
    let mapper = Mapper::new().options(options);
    let m = MatchResult::new("")
        .with_group("Order.Total", ["2"])
        .with_group("Order__Total", ["3"]);
    let person: Person = mapper.map(&m).unwrap();
    assert_eq!(person.order.unwrap().total, 2.0);
}

#[test]
fn test_mapper_map_onto_existing() {
    let m = MatchResult::new("").with_group("Score", ["0.5"]);
    let existing = Person {
        name: "Keep".to_string(),
        ..Default::default()
    };
    let person = Mapper::new().map_onto(&m, existing).unwrap();
    assert_eq!(person.name, "Keep");
    assert_eq!(person.score, Some(0.5));
}

#[test]
fn test_mapper_is_shareable_across_threads() {
    let mapper = Arc::new(Mapper::new().transform("Name", |s| Ok(s.trim().into())));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mapper = mapper.clone();
            std::thread::spawn(move || {
                let m = MatchResult::new("").with_group("Name", [format!(" n{} ", i)]);
                let person: Person = mapper.map(&m).unwrap();
                person.name
            })
        })
        .collect();
    let names: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(names, vec!["n0", "n1", "n2", "n3"]);
}

#[test]
fn test_prebuilt_object_for_nested_field() {
    let mapper = Mapper::new().transform("Order", |s| {
        Ok(CaptureValue::other(Order {
            total: s.parse::<f64>()?,
            ..Default::default()
        }))
    });
    let m = MatchResult::new("")
        .with_group("Order", ["12.5"])
        .with_group("Order__Quantities", ["3"]);
    let person: Person = mapper.map(&m).unwrap();
    let order = person.order.unwrap();
    assert_eq!(order.total, 12.5);
    assert_eq!(order.quantities, vec![3]);
}

#[test]
fn test_prebuilt_object_of_wrong_type_is_rejected() {
    let mapper = Mapper::new().transform("Order", |_| {
        Ok(CaptureValue::other(Customer::default()))
    });
    let m = MatchResult::new("").with_group("Order", ["x"]);
    let err = mapper.map::<Person>(&m).unwrap_err();
    assert_eq!(
        err.to_string(),
        "group 'Order', field 'Order': no conversion from value to Order"
    );
}
