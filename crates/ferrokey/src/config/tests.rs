use crate::{Properties, params};

#[test]
fn blank_values_read_as_missing() {
    let props = Properties::new()
        .with(params::TABLE, "  ")
        .with(params::COLUMN, "next_hi");
    assert_eq!(props.get(params::TABLE), None);
    assert_eq!(props.get_or(params::TABLE, "fallback"), "fallback");
    assert_eq!(props.get(params::COLUMN), Some("next_hi"));
}

#[test]
fn typed_lookups() {
    let props = Properties::new()
        .with(params::MAX_LO, " 12 ")
        .with("flag", "TRUE");
    assert_eq!(props.get_int(params::MAX_LO, 0).unwrap(), 12);
    assert_eq!(props.get_int("missing", 7).unwrap(), 7);
    assert!(props.get_bool("flag", false).unwrap());

    let bad = Properties::new().with(params::MAX_LO, "lots");
    let err = bad.get_int(params::MAX_LO, 0).unwrap_err();
    assert!(err.is_mapping());
    assert_eq!(err.to_string(), "parameter [max_lo] must be an integer, was [lots]");
    assert!(Properties::new().with("flag", "yes").get_bool("flag", false).is_err());
}

#[test]
fn merged_prefers_the_overriding_side() {
    let defaults: Properties = [(params::TABLE, "a"), (params::COLUMN, "c")]
        .into_iter()
        .collect();
    let merged = defaults.merged(&Properties::new().with(params::TABLE, "b"));
    assert_eq!(merged.get(params::TABLE), Some("b"));
    assert_eq!(merged.get(params::COLUMN), Some("c"));
    assert_eq!(merged.iter().count(), 2);
}

#[cfg(feature = "serde")]
#[test]
fn deserializes_from_a_flat_map() {
    let props: Properties = serde_json::from_str(r#"{"max_lo": "5", "table": "t"}"#).unwrap();
    assert_eq!(props.get_int(params::MAX_LO, 0).unwrap(), 5);
    assert_eq!(props.get(params::TABLE), Some("t"));
}
