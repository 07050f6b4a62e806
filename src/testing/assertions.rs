//! Assertion functions for inferred field lists.

use crate::field::{FieldList, StorageType};
use crate::value::ValueKind;

/// Assert that a field list has exactly these names, in this order.
///
/// # Panics
///
/// Panics if the names differ in length, content or order.
///
/// # Example
///
/// ```
/// use ironflow::FieldList;
/// use ironflow::testing::assert_field_names;
///
/// let fields = FieldList::from_names(["a", "b"]).unwrap();
/// assert_field_names(&fields, &["a", "b"]);
/// ```
pub fn assert_field_names(fields: &FieldList, expected: &[&str]) {
    let actual = fields.names();
    assert_eq!(
        actual, expected,
        "Field names mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert the storage type of each named field.
///
/// # Panics
///
/// Panics if a field is missing or has a different storage type.
pub fn assert_storage_types(fields: &FieldList, expected: &[(&str, StorageType)]) {
    for (name, storage_type) in expected {
        let field = fields
            .field(name)
            .unwrap_or_else(|| panic!("Field '{name}' not found in {:?}", fields.names()));
        assert_eq!(
            &field.storage_type, storage_type,
            "Storage type mismatch for '{name}':\n  Expected: {storage_type}\n  Actual: {}",
            field.storage_type
        );
    }
}

/// Assert that a field is unknown with the given concrete kind (or none).
///
/// # Panics
///
/// Panics if the field is missing, resolved, or carries another concrete kind.
pub fn assert_unresolved(fields: &FieldList, name: &str, concrete: Option<ValueKind>) {
    let field = fields
        .field(name)
        .unwrap_or_else(|| panic!("Field '{name}' not found in {:?}", fields.names()));
    assert!(
        field.storage_type.is_unknown(),
        "Field '{name}' should be unknown, got {}",
        field.storage_type
    );
    assert_eq!(
        field.concrete_storage_type, concrete,
        "Concrete type mismatch for '{name}'"
    );
}
