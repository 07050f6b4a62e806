//! Tests for record flattening.

use anyhow::Result;
use ironflow::testing::*;
use ironflow::*;
use serde_json::json;

#[test]
fn collapse_keeps_depth_first_order() {
    let flat = collapse_record(&sample_nested_records()[0], KEY_SEPARATOR);
    assert_eq!(
        flat.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["id", "user.name", "user.address.city", "user.address.zip", "tags"]
    );
}

#[test]
fn collapse_leaves_flat_records_alone() {
    let r = sample_flat_records().remove(0);
    assert_eq!(collapse_record(&r, KEY_SEPARATOR), r);
}

#[test]
fn expand_rebuilds_nesting() -> Result<()> {
    let nested = expand_record(&record(json!({"a.b": 1, "a.c": 2, "d": 3})), KEY_SEPARATOR)?;
    assert_eq!(nested, record(json!({"a": {"b": 1, "c": 2}, "d": 3})));
    Ok(())
}
