//! Sort Stage
//!
//! Stable sort by a whitelisted field in the requested direction.

use super::field::Queryable;
use std::fmt;
use tracing::warn;

/// Field reported when no valid sort key was requested
pub const DEFAULT_SORT_KEY: &str = "id";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    /// Parse a `sortDir` value; anything but `asc`/`desc` falls back to `desc`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortDir::Asc,
            Some(v) if v.eq_ignore_ascii_case("desc") => SortDir::Desc,
            Some(v) => {
                warn!("Invalid sortDir {:?}, using default desc", v);
                SortDir::Desc
            }
            None => SortDir::Desc,
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

/// Resolve a requested `sortKey` to a declared field of `T`
///
/// Returns `None` when the key is not in the type's whitelist or the type
/// declares no matching field.
pub fn resolve_key<T: Queryable>(raw: &str) -> Option<&'static str> {
    let whitelisted = T::SORTABLE_KEYS
        .iter()
        .any(|key| key.eq_ignore_ascii_case(raw));
    if !whitelisted {
        warn!("Sort key {:?} is not sortable, keeping stored order", raw);
        return None;
    }
    T::fields().resolve(raw)
}

/// Stable sort by `field`; ties keep their relative order in both directions
pub fn apply<T: Queryable>(records: &mut [&T], field: &str, dir: SortDir) {
    let table = T::fields();
    records.sort_by(|a, b| {
        let ord = match (table.read(*a, field), table.read(*b, field)) {
            (Some(x), Some(y)) => x.natural_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        };
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field::FieldTable;
    use std::sync::OnceLock;

    #[derive(Debug, PartialEq)]
    struct Row {
        name: &'static str,
        rank: i64,
    }

    impl Queryable for Row {
        const SORTABLE_KEYS: &'static [&'static str] = &["NAME", "RANK"];

        fn fields() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Row>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::<Self>::builder()
                    .text("name", |r| r.name)
                    .int("rank", |r| r.rank)
                    .build()
            })
        }
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(SortDir::parse(Some("ASC")), SortDir::Asc);
        assert_eq!(SortDir::parse(Some("desc")), SortDir::Desc);
        assert_eq!(SortDir::parse(Some("sideways")), SortDir::Desc);
        assert_eq!(SortDir::parse(None), SortDir::Desc);
    }

    #[test]
    fn test_resolve_key_against_whitelist() {
        assert_eq!(resolve_key::<Row>("name"), Some("name"));
        assert_eq!(resolve_key::<Row>("RANK"), Some("rank"));
        assert_eq!(resolve_key::<Row>("id"), None);
    }

    #[test]
    fn test_numeric_sort_is_stable() {
        let rows = [
            Row { name: "a", rank: 10 },
            Row { name: "b", rank: 9 },
            Row { name: "c", rank: 10 },
        ];
        let mut refs: Vec<&Row> = rows.iter().collect();
        apply(&mut refs, "rank", SortDir::Desc);
        let names: Vec<_> = refs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "c", "b"]);

        let mut refs: Vec<&Row> = rows.iter().collect();
        apply(&mut refs, "rank", SortDir::Asc);
        let names: Vec<_> = refs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
