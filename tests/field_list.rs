//! Tests for field metadata and its persistence.

use anyhow::Result;
use ironflow::testing::*;
use ironflow::*;
use serde_json::json;

#[test]
fn push_rejects_duplicates() -> Result<()> {
    let mut fields = FieldList::from_names(["a", "b"])?;
    let err = fields.push(Field::new("a")).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StreamError>(),
        Some(&StreamError::DuplicateField("a".into()))
    );
    assert_eq!(fields.len(), 2);
    Ok(())
}

#[test]
fn lookup_by_name_and_position() -> Result<()> {
    let fields = FieldList::from_names(["a", "b", "c"])?;
    assert_eq!(fields.index_of("c"), Some(2));
    assert_eq!(fields[1].name, "b");
    assert!(fields.contains("a"));
    assert!(fields.field("missing").is_none());
    Ok(())
}

#[test]
fn row_record_conversion() -> Result<()> {
    let fields = FieldList::from_names(["x", "y"])?;
    let rec = fields.row_to_record(vec![json!(1), json!("two")])?;
    assert_eq!(rec, record(json!({"x": 1, "y": "two"})));
    assert_eq!(fields.record_to_row(&rec)?, vec![json!(1), json!("two")]);
    Ok(())
}

#[test]
fn json_shape_is_a_list_of_fields() -> Result<()> {
    let mut source = CountingSource::new(records(vec![json!({"n": 1, "t": [1]})]));
    let fields = source.read_fields(0, false)?;

    let value: serde_json::Value = serde_json::from_str(&fields.to_json()?)?;
    assert_eq!(
        value,
        json!([
            {"name": "n", "storage_type": "integer"},
            {"name": "t", "storage_type": "unknown", "concrete_storage_type": "array"}
        ])
    );
    assert_eq!(FieldList::from_json(&fields.to_json()?)?, fields);
    Ok(())
}

#[test]
fn hand_edited_metadata_loads() -> Result<()> {
    let fields = FieldList::from_json(
        r#"[
            {"name": "id", "storage_type": "integer", "analytical_type": "ordered"},
            {"name": "geom", "storage_type": "geometry", "label": "Shape"},
            {"name": "code", "missing_values": ["", "n/a"]}
        ]"#,
    )?;
    assert_eq!(fields[0].analytical_type, Some(AnalyticalType::Ordered));
    assert_eq!(fields[1].storage_type, StorageType::Other("geometry".into()));
    assert_eq!(fields[2].storage_type, StorageType::Unknown);
    assert!(fields[2].is_missing(&json!("n/a")));
    assert!(fields[2].is_missing(&json!(null)));
    assert!(!fields[2].is_missing(&json!("x")));
    Ok(())
}

#[test]
fn save_and_load_through_a_file() -> Result<()> {
    let mut source = CountingSource::new(sample_nested_records()).with_expand(true);
    let fields = source.read_fields(0, false)?;

    let file = field_list_file(&fields)?;
    assert_eq!(FieldList::load(file.path())?, fields);
    Ok(())
}

#[test]
fn save_creates_parent_directories() -> Result<()> {
    let dir = ScratchDir::create()?;
    let path = dir.join("meta/nested/fields.json");
    FieldList::from_names(["a"])?.save(&path)?;
    assert!(path.exists());
    Ok(())
}

#[test]
fn load_reports_the_path() -> Result<()> {
    let dir = ScratchDir::create()?;
    let err = FieldList::load(dir.join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
    Ok(())
}

#[test]
fn display_shows_concrete_kind() {
    let field = field_from_summary("t", Some(ValueKind::Array));
    assert_eq!(field.to_string(), "t (unknown) [array]");
    let field = Field::new("n").with_storage_type(StorageType::Integer);
    assert_eq!(field.to_string(), "n (integer)");
}

#[test]
fn rename_through_field_mut_updates_lookup() -> Result<()> {
    let mut fields = FieldList::from_names(["a", "b"])?;
    if let Some(mut a) = fields.field_mut("a") {
        a.name = "alpha".into();
        a.storage_type = StorageType::Integer;
    }

    assert_eq!(fields.names(), vec!["alpha", "b"]);
    assert_eq!(fields.index_of("alpha"), Some(0));
    assert!(fields.field("a").is_none());
    assert_eq!(
        fields.field("alpha").map(|f| &f.storage_type),
        Some(&StorageType::Integer)
    );
    let rec = fields.row_to_record(vec![json!(1), json!(2)])?;
    assert_eq!(fields.record_to_row(&rec)?, vec![json!(1), json!(2)]);
    Ok(())
}

#[test]
fn colliding_rename_through_field_mut_is_undone() -> Result<()> {
    let mut fields = FieldList::from_names(["a", "b"])?;
    if let Some(mut a) = fields.field_mut("a") {
        a.name = "b".into();
        a.label = Some("kept".into());
    }

    assert_eq!(fields.names(), vec!["a", "b"]);
    assert_eq!(fields.index_of("a"), Some(0));
    assert_eq!(fields.index_of("b"), Some(1));
    assert_eq!(fields[0].label.as_deref(), Some("kept"));
    assert_eq!(FieldList::from_json(&fields.to_json()?)?, fields);
    Ok(())
}

#[test]
fn rename_rejects_duplicate_and_unknown_names() -> Result<()> {
    let mut fields = FieldList::from_names(["a", "b"])?;

    let err = fields.rename("a", "b").unwrap_err();
    assert_eq!(
        err.downcast_ref::<StreamError>(),
        Some(&StreamError::DuplicateField("b".into()))
    );
    let err = fields.rename("zzz", "c").unwrap_err();
    assert_eq!(
        err.downcast_ref::<StreamError>(),
        Some(&StreamError::UnknownField("zzz".into()))
    );
    assert_eq!(fields.names(), vec!["a", "b"]);

    fields.rename("b", "beta")?;
    fields.rename("a", "a")?;
    assert_eq!(fields.names(), vec!["a", "beta"]);
    assert_eq!(fields.index_of("beta"), Some(1));
    assert!(!fields.contains("b"));
    Ok(())
}
