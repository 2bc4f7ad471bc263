//! Equality Filter Stage
//!
//! Every query parameter that is not a reserved control key is a field
//! equality predicate. Predicates are AND-ed; a record whose type does not
//! declare the named field is dropped.

use super::field::Queryable;
use super::QueryParams;

/// Control keys that never act as predicates
pub const RESERVED_KEYS: [&str; 4] = ["limit", "offset", "sortDir", "sortKey"];

/// Whether a parameter name is a control key
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A single `field == value` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: String,
    pub value: String,
}

impl Predicate {
    /// Evaluate against a record
    pub fn accepts<T: Queryable>(&self, record: &T) -> bool {
        match T::fields().read(record, &self.field) {
            Some(actual) => actual.matches(&self.value),
            None => false,
        }
    }
}

/// Extract predicates from query parameters
///
/// Only the first value of each parameter is used; parameters without
/// values are ignored.
pub fn predicates(params: &QueryParams) -> Vec<Predicate> {
    params
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .filter_map(|(key, values)| {
            values.first().map(|value| Predicate {
                field: key.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Keep the records accepted by every predicate, preserving order
pub fn apply<'r, T: Queryable>(records: &'r [T], predicates: &[Predicate]) -> Vec<&'r T> {
    records
        .iter()
        .filter(|record| predicates.iter().all(|p| p.accepts(*record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field::FieldTable;
    use crate::query::params_from_pairs;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        kind: String,
        size: i64,
    }

    impl Queryable for Item {
        const SORTABLE_KEYS: &'static [&'static str] = &["KIND", "SIZE"];

        fn fields() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Item>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::<Self>::builder()
                    .text("kind", |i| i.kind.as_str())
                    .int("size", |i| i.size)
                    .build()
            })
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item { kind: "block".into(), size: 1 },
            Item { kind: "FILE".into(), size: 2 },
            Item { kind: "block".into(), size: 2 },
        ]
    }

    #[test]
    fn test_reserved_keys_are_not_predicates() {
        let params = params_from_pairs([
            ("limit", "2"),
            ("offset", "1"),
            ("sortDir", "asc"),
            ("sortKey", "kind"),
            ("kind", "block"),
        ]);
        let preds = predicates(&params);
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].field, "kind");
    }

    #[test]
    fn test_predicates_are_anded() {
        let items = items();
        let preds = predicates(&params_from_pairs([("kind", "block"), ("size", "2")]));
        let kept = apply(&items, &preds);
        assert_eq!(kept, vec![&items[2]]);
    }

    #[test]
    fn test_case_insensitive_values() {
        let items = items();
        let preds = predicates(&params_from_pairs([("kind", "file")]));
        assert_eq!(apply(&items, &preds), vec![&items[1]]);
    }

    #[test]
    fn test_unknown_field_drops_everything() {
        let items = items();
        let preds = predicates(&params_from_pairs([("Kind", "block")]));
        assert!(apply(&items, &preds).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let items = items();
        let preds = predicates(&params_from_pairs([("kind", "block")]));
        let once: Vec<Item> = apply(&items, &preds).into_iter().cloned().collect();
        let twice: Vec<Item> = apply(&once, &preds).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }
}
