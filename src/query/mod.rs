//! List Query Engine
//!
//! Turns a raw query-parameter map into a filtered, sorted and paginated
//! view over an in-memory record list. The pipeline is pure: the input
//! slice is never mutated and every invalid control value falls back to a
//! default instead of failing.
//!
//! ```text
//! records ─▶ filter (AND of field == value) ─▶ sort (whitelisted key) ─▶ window
//! ```

pub mod field;
pub mod filter;
pub mod paginate;
pub mod sort;

pub use field::{FieldTable, FieldTableBuilder, FieldValue, Queryable};
pub use filter::{Predicate, RESERVED_KEYS};
pub use paginate::{DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use sort::{SortDir, DEFAULT_SORT_KEY};

use std::collections::BTreeMap;

/// Query parameters: name to one or more values, as decoded from a URL
pub type QueryParams = BTreeMap<String, Vec<String>>;

/// Build [`QueryParams`] from name/value pairs; repeated names accumulate
pub fn params_from_pairs<I, K, V>(pairs: I) -> QueryParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut params = QueryParams::new();
    for (key, value) in pairs {
        params.entry(key.into()).or_default().push(value.into());
    }
    params
}

fn first<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
}

// =============================================================================
// List Query
// =============================================================================

/// A parsed list request for records of type `T`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    predicates: Vec<Predicate>,
    sort_field: Option<&'static str>,
    sort_dir: SortDir,
    offset: usize,
    limit: usize,
}

impl ListQuery {
    /// Parse control keys and predicates for record type `T`
    pub fn parse<T: Queryable>(params: &QueryParams) -> Self {
        Self {
            predicates: filter::predicates(params),
            sort_field: first(params, "sortKey").and_then(sort::resolve_key::<T>),
            sort_dir: SortDir::parse(first(params, "sortDir")),
            offset: paginate::parse_offset(first(params, "offset")),
            limit: paginate::parse_limit(first(params, "limit")),
        }
    }

    /// Equality predicates, in parameter-name order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Effective sort key; `id` when none was requested or accepted
    pub fn sort_key(&self) -> &'static str {
        self.sort_field.unwrap_or(DEFAULT_SORT_KEY)
    }

    /// Effective sort direction
    pub fn sort_dir(&self) -> SortDir {
        self.sort_dir
    }

    /// Requested offset before clamping to the filtered size
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Effective page size
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run the pipeline over `records`
    ///
    /// Without an accepted sort key the stored order is kept.
    pub fn apply<T: Queryable + Clone>(&self, records: &[T]) -> Vec<T> {
        let mut selected = filter::apply(records, &self.predicates);
        if let Some(field) = self.sort_field {
            sort::apply(&mut selected, field, self.sort_dir);
        }
        let range = paginate::window(selected.len(), self.offset, self.limit);
        selected[range].iter().map(|record| (*record).clone()).collect()
    }
}

/// Filter, sort and paginate `records` per `params`
pub fn select<T: Queryable + Clone>(records: &[T], params: &QueryParams) -> Vec<T> {
    ListQuery::parse::<T>(params).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, PartialEq)]
    struct Vol {
        id: String,
        name: String,
        status: String,
        size: i64,
    }

    impl Queryable for Vol {
        const SORTABLE_KEYS: &'static [&'static str] = &["ID", "NAME", "STATUS", "SIZE"];

        fn fields() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Vol>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::<Self>::builder()
                    .text("id", |v| v.id.as_str())
                    .text("name", |v| v.name.as_str())
                    .text("status", |v| v.status.as_str())
                    .int("size", |v| v.size)
                    .build()
            })
        }
    }

    fn vol(id: &str, name: &str, status: &str, size: i64) -> Vol {
        Vol {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            size,
        }
    }

    fn five() -> Vec<Vol> {
        (0..5)
            .map(|i| vol(&format!("v{i}"), &format!("n{i}"), "available", i))
            .collect()
    }

    fn ids(list: &[Vol]) -> Vec<&str> {
        list.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_sort_ascending_by_name() {
        let records = vec![
            vol("1", "b", "available", 1),
            vol("2", "c", "available", 1),
            vol("3", "a", "available", 1),
        ];
        let params = params_from_pairs([("sortKey", "name"), ("sortDir", "asc")]);
        let out = select(&records, &params);
        let names: Vec<_> = out.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending_is_default() {
        let records = vec![vol("1", "b", "x", 1), vol("2", "c", "x", 1), vol("3", "a", "x", 1)];
        let out = select(&records, &params_from_pairs([("sortKey", "NAME")]));
        let names: Vec<_> = out.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_limit_and_offset_window() {
        let records = five();
        let out = select(&records, &params_from_pairs([("limit", "2"), ("offset", "3")]));
        assert_eq!(ids(&out), vec!["v3", "v4"]);

        let out = select(&records, &params_from_pairs([("limit", "2"), ("offset", "1")]));
        assert_eq!(ids(&out), vec!["v1", "v2"]);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let records = five();
        let out = select(&records, &params_from_pairs([("offset", "10")]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_controls_fall_back() {
        let records = five();
        let params = params_from_pairs([
            ("limit", "-4"),
            ("offset", "abc"),
            ("sortKey", "bogus"),
            ("sortDir", "up"),
        ]);
        let query = ListQuery::parse::<Vol>(&params);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort_key(), "id");
        assert_eq!(query.sort_dir(), SortDir::Desc);
        assert_eq!(ids(&query.apply(&records)), ids(&records));
    }

    #[test]
    fn test_filter_sort_paginate_together() {
        let records = vec![
            vol("a", "n1", "error", 10),
            vol("b", "n2", "available", 30),
            vol("c", "n3", "available", 20),
            vol("d", "n4", "available", 5),
        ];
        let params = params_from_pairs([
            ("status", "AVAILABLE"),
            ("sortKey", "size"),
            ("sortDir", "asc"),
            ("limit", "2"),
        ]);
        let out = select(&records, &params);
        assert_eq!(ids(&out), vec!["d", "c"]);
    }

    #[test]
    fn test_only_first_value_is_used() {
        let records = five();
        let params = params_from_pairs([("name", "n2"), ("name", "n3")]);
        assert_eq!(ids(&select(&records, &params)), vec!["v2"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let records = five();
        let before = records.clone();
        let _ = select(&records, &params_from_pairs([("sortKey", "size"), ("sortDir", "asc")]));
        assert_eq!(records, before);
    }
}
