//! Field Accessor Tables
//!
//! Explicit per-type tables mapping a declared field name to an accessor.
//! Tables are built once per type and shared by the filter and sort stages.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Field Value
// =============================================================================

/// A scalar read from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
}

impl FieldValue<'_> {
    /// Canonical string form: literal for text, decimal for integers
    pub fn canonical(&self) -> String {
        match self {
            FieldValue::Text(s) => (*s).to_string(),
            FieldValue::Int(n) => n.to_string(),
        }
    }

    /// Case-insensitive equality against a query operand
    pub fn matches(&self, operand: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.to_lowercase() == operand.to_lowercase(),
            FieldValue::Int(n) => n.to_string() == operand,
        }
    }

    /// Natural ordering: lexicographic for text, numeric for integers
    pub fn natural_cmp(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (a, b) => a.canonical().cmp(&b.canonical()),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

// =============================================================================
// Accessors
// =============================================================================

enum Accessor<T> {
    Text(fn(&T) -> &str),
    Int(fn(&T) -> i64),
}

impl<T> Accessor<T> {
    fn read<'a>(&self, record: &'a T) -> FieldValue<'a> {
        match self {
            Accessor::Text(get) => FieldValue::Text(get(record)),
            Accessor::Int(get) => FieldValue::Int(get(record)),
        }
    }
}

// =============================================================================
// Field Table
// =============================================================================

/// Name → accessor table for one record type
pub struct FieldTable<T> {
    fields: BTreeMap<&'static str, Accessor<T>>,
}

impl<T> FieldTable<T> {
    /// Start building a table
    pub fn builder() -> FieldTableBuilder<T> {
        FieldTableBuilder {
            fields: BTreeMap::new(),
        }
    }

    /// Read a field by its exact declared name
    pub fn read<'a>(&self, record: &'a T, name: &str) -> Option<FieldValue<'a>> {
        self.fields.get(name).map(|accessor| accessor.read(record))
    }

    /// Resolve a declared field name case-insensitively
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        self.fields
            .keys()
            .find(|declared| declared.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Whether the type declares this exact field
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared field names
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`FieldTable`]
pub struct FieldTableBuilder<T> {
    fields: BTreeMap<&'static str, Accessor<T>>,
}

impl<T> FieldTableBuilder<T> {
    /// Register a string field
    pub fn text(mut self, name: &'static str, get: fn(&T) -> &str) -> Self {
        self.fields.insert(name, Accessor::Text(get));
        self
    }

    /// Register an integer field
    pub fn int(mut self, name: &'static str, get: fn(&T) -> i64) -> Self {
        self.fields.insert(name, Accessor::Int(get));
        self
    }

    pub fn build(self) -> FieldTable<T> {
        FieldTable {
            fields: self.fields,
        }
    }
}

// =============================================================================
// Queryable
// =============================================================================

/// A record type the list pipeline can filter and sort
pub trait Queryable: Sized + 'static {
    /// Sort keys accepted for this type (matched case-insensitively)
    const SORTABLE_KEYS: &'static [&'static str];

    /// The type's accessor table
    fn fields() -> &'static FieldTable<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: String,
        size: i64,
    }

    fn table() -> FieldTable<Row> {
        FieldTable::<Row>::builder()
            .text("name", |r| r.name.as_str())
            .int("size", |r| r.size)
            .build()
    }

    #[test]
    fn test_read_is_case_sensitive() {
        let row = Row {
            name: "gold".into(),
            size: 10,
        };
        let table = table();
        assert_eq!(table.read(&row, "name"), Some(FieldValue::Text("gold")));
        assert_eq!(table.read(&row, "size"), Some(FieldValue::Int(10)));
        assert_eq!(table.read(&row, "Name"), None);
        assert_eq!(table.resolve("NAME"), Some("name"));
        assert_eq!(table.resolve("missing"), None);
    }

    #[test]
    fn test_matches_canonical_forms() {
        assert!(FieldValue::Text("Block").matches("block"));
        assert!(!FieldValue::Text("block").matches("file"));
        assert!(FieldValue::Int(42).matches("42"));
        assert!(!FieldValue::Int(42).matches("042x"));
        assert_eq!(FieldValue::Int(-7).canonical(), "-7");
    }

    #[test]
    fn test_natural_ordering() {
        assert_eq!(
            FieldValue::Int(9).natural_cmp(&FieldValue::Int(10)),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Text("9").natural_cmp(&FieldValue::Text("10")),
            Ordering::Greater
        );
    }
}
