//! Field metadata: [`Field`], [`FieldList`] and the type vocabularies.
//!
//! A [`FieldList`] is ordered and duplicate-free. Inference fills it in
//! first-seen order; callers may refine fields afterwards through
//! [`FieldList::field_mut`] or rename them with [`FieldList::rename`]. Field
//! lists are serde types and can be kept as JSON next to the data they describe
//! ([`FieldList::save`], [`FieldList::load`]).

use crate::error::StreamError;
use crate::value::{Record, Row, ValueKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter, Write};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::warn;

/// Physical representation assigned to a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    #[default]
    Unknown,
    /// Backend-specific type outside the built-in vocabulary.
    Other(String),
}

impl StorageType {
    pub fn as_str(&self) -> &str {
        match self {
            StorageType::String => "string",
            StorageType::Text => "text",
            StorageType::Integer => "integer",
            StorageType::Float => "float",
            StorageType::Boolean => "boolean",
            StorageType::Date => "date",
            StorageType::Unknown => "unknown",
            StorageType::Other(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, StorageType::Unknown)
    }
}

impl From<&str> for StorageType {
    fn from(name: &str) -> Self {
        match name {
            "string" => StorageType::String,
            "text" => StorageType::Text,
            "integer" => StorageType::Integer,
            "float" => StorageType::Float,
            "boolean" => StorageType::Boolean,
            "date" => StorageType::Date,
            "unknown" => StorageType::Unknown,
            other => StorageType::Other(other.to_string()),
        }
    }
}

impl From<String> for StorageType {
    fn from(name: String) -> Self {
        StorageType::from(name.as_str())
    }
}

impl From<StorageType> for String {
    fn from(t: StorageType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic classification of a field. Never set by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticalType {
    Default,
    Typeless,
    Flag,
    Discrete,
    Measure,
    Set,
    Ordered,
    Range,
}

/// Description of one data attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub storage_type: StorageType,
    /// Native kind observed when `storage_type` is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_storage_type: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytical_type: Option<AnalyticalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Values that should be treated as missing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_values: Vec<Value>,
}

impl Field {
    /// Create a field with unknown storage type.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            storage_type: StorageType::Unknown,
            concrete_storage_type: None,
            analytical_type: None,
            label: None,
            missing_values: Vec::new(),
        }
    }

    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub fn with_analytical_type(mut self, analytical_type: AnalyticalType) -> Self {
        self.analytical_type = Some(analytical_type);
        self
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether `value` is null or listed in `missing_values`.
    pub fn is_missing(&self, value: &Value) -> bool {
        value.is_null() || self.missing_values.contains(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.storage_type)?;
        if let Some(kind) = self.concrete_storage_type {
            write!(f, " [{kind}]")?;
        }
        Ok(())
    }
}

/// Ordered, duplicate-free list of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct FieldList {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list of untyped fields from names.
    ///
    /// # Errors
    /// Returns [`StreamError::DuplicateField`] if a name repeats.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for name in names {
            list.push(Field::new(name))?;
        }
        Ok(list)
    }

    /// Append a field.
    ///
    /// # Errors
    /// Returns [`StreamError::DuplicateField`] if the name is already present.
    pub fn push(&mut self, field: Field) -> Result<()> {
        if self.index.contains_key(&field.name) {
            return Err(StreamError::DuplicateField(field.name).into());
        }
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Mutable access for refining a field after inference.
    ///
    /// The returned [`FieldMut`] re-indexes the list when it is dropped, so a
    /// changed `name` is picked up by [`FieldList::field`] and
    /// [`FieldList::index_of`]. A rename onto a name already in the list is
    /// undone; use [`FieldList::rename`] to get that as an error instead.
    pub fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        let pos = self.index_of(name)?;
        Some(FieldMut {
            list: self,
            pos,
            original: name.to_string(),
        })
    }

    /// Rename a field in place, keeping its position.
    ///
    /// # Errors
    /// Returns [`StreamError::UnknownField`] if `from` is absent and
    /// [`StreamError::DuplicateField`] if another field is already called `to`.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        let pos = self
            .index_of(from)
            .ok_or_else(|| StreamError::UnknownField(from.to_string()))?;
        if to == from {
            return Ok(());
        }
        if self.index.contains_key(&to) {
            return Err(StreamError::DuplicateField(to).into());
        }
        self.index.remove(from);
        self.index.insert(to.clone(), pos);
        self.fields[pos].name = to;
        Ok(())
    }

    /// Check that a row has exactly one value per field.
    pub fn check_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(StreamError::CardinalityMismatch {
                expected: self.fields.len(),
                actual: row.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Check that every record key names a field.
    pub fn check_record(&self, record: &Record) -> Result<()> {
        match record.keys().find(|k| !self.contains(k)) {
            Some(key) => Err(StreamError::UnknownField(key.clone()).into()),
            None => Ok(()),
        }
    }

    /// Project a record onto field order. Absent keys become null.
    pub fn record_to_row(&self, record: &Record) -> Result<Row> {
        self.check_record(record)?;
        Ok(self
            .fields
            .iter()
            .map(|f| record.get(&f.name).cloned().unwrap_or(Value::Null))
            .collect())
    }

    /// Pair row values with field names.
    pub fn row_to_record(&self, row: Row) -> Result<Record> {
        self.check_row(&row)?;
        Ok(self
            .fields
            .iter()
            .map(|f| f.name.clone())
            .zip(row)
            .collect())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize field list")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse field list")
    }

    /// Write the field list as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .with_context(|| format!("serialize field list to {}", path.display()))?;
        w.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse field list in {}", path.display()))
    }
}

/// Mutable handle to one field of a [`FieldList`].
///
/// Dereferences to [`Field`]. Dropping it brings the list's name index back in
/// line with the field's name.
pub struct FieldMut<'a> {
    list: &'a mut FieldList,
    pos: usize,
    original: String,
}

impl Deref for FieldMut<'_> {
    type Target = Field;

    fn deref(&self) -> &Field {
        &self.list.fields[self.pos]
    }
}

impl DerefMut for FieldMut<'_> {
    fn deref_mut(&mut self) -> &mut Field {
        &mut self.list.fields[self.pos]
    }
}

impl Drop for FieldMut<'_> {
    fn drop(&mut self) {
        let renamed = self.list.fields[self.pos].name.clone();
        if renamed == self.original {
            return;
        }
        if self.list.index.contains_key(&renamed) {
            warn!(
                field = %self.original,
                rejected = %renamed,
                "rename collides with an existing field; keeping the old name"
            );
            self.list.fields[self.pos].name = std::mem::take(&mut self.original);
            return;
        }
        self.list.index.remove(&self.original);
        self.list.index.insert(renamed, self.pos);
    }
}

impl TryFrom<Vec<Field>> for FieldList {
    type Error = StreamError;

    fn try_from(fields: Vec<Field>) -> Result<Self, StreamError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            if index.insert(f.name.clone(), i).is_some() {
                return Err(StreamError::DuplicateField(f.name.clone()));
            }
        }
        Ok(Self { fields, index })
    }
}

impl From<FieldList> for Vec<Field> {
    fn from(list: FieldList) -> Self {
        list.fields
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl std::ops::Index<usize> for FieldList {
    type Output = Field;

    fn index(&self, i: usize) -> &Field {
        &self.fields[i]
    }
}
