use super::filter::Filters;
use super::filter_order::FilterOrder;
use super::params::QueryParams;
use super::types::{NumericRange, RangeField, SortField};
use super::validator::Validator;
use super::{DEFAULT_PAGE, DEFAULT_SORT};

pub const TITLE_PARAM: &str = "title";

/// How an entity's list endpoint may be queried.
///
/// Every list endpoint filters by an exact, case-insensitive title and one
/// numeric range, and sorts by one of `sort_fields`.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub title_column: &'static str,
    pub sort_fields: &'static [SortField],
    pub range: RangeField,
}

impl ListSpec {
    pub fn sort_safe_list(&self) -> Vec<String> {
        FilterOrder::safe_list(self.sort_fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub title: String,
    pub range: NumericRange,
    pub filters: Filters,
}

impl ListQuery {
    /// Parse and validate a list request. Problems are recorded on `v`; the
    /// returned query must not be executed unless `v.valid()`.
    pub fn from_query(qs: &QueryParams, spec: &ListSpec, default_page_size: i64, v: &mut Validator) -> Self {
        let title = qs.read_string(TITLE_PARAM, "");
        let range = NumericRange {
            from: qs.read_int(spec.range.from_param, 0, v),
            to: qs.read_int(spec.range.to_param, 0, v),
        };

        let filters = Filters::new(
            qs.parse_page(DEFAULT_PAGE, v),
            qs.parse_page_size(default_page_size, v),
            qs.parse_sort(DEFAULT_SORT),
            spec.sort_safe_list(),
        );
        filters.validate(v);

        Self { title, range, filters }
    }

    /// Whether a row with this title passes the title filter.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.is_empty() || self.title.to_lowercase() == title.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SPEC: ListSpec = ListSpec {
        table: "products",
        columns: &["id", "title", "price"],
        title_column: "title",
        sort_fields: &[
            SortField::new("id", "id"),
            SortField::new("title", "title"),
            SortField::new("price", "price"),
        ],
        range: RangeField {
            column: "price",
            from_param: "priceFrom",
            to_param: "priceTo",
        },
    };

    fn parse(pairs: &[(&str, &str)]) -> (ListQuery, Validator) {
        let qs: QueryParams = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
            .into();
        let mut v = Validator::new();
        let query = ListQuery::from_query(&qs, &SPEC, 20, &mut v);
        (query, v)
    }

    #[test]
    fn defaults() {
        let (query, v) = parse(&[]);
        assert!(v.valid());
        assert_eq!(query.title, "");
        assert_eq!(query.range, NumericRange::default());
        assert_eq!(query.filters.page, 1);
        assert_eq!(query.filters.page_size, 20);
        assert_eq!(query.filters.sort, "id");
        assert_eq!(query.filters.sort_safe_list, SPEC.sort_safe_list());
    }

    #[test]
    fn reads_entity_range_fields() {
        let (query, v) = parse(&[("priceFrom", "100"), ("priceTo", "900"), ("title", "iMac")]);
        assert!(v.valid());
        assert_eq!(query.range, NumericRange { from: 100, to: 900 });
        assert_eq!(query.title, "iMac");
    }

    #[test]
    fn collects_errors_across_fields() {
        let (_, v) = parse(&[("page", "0"), ("page_size", "500"), ("sort", "rating"), ("priceTo", "x")]);
        let errors = v.errors();
        assert_eq!(errors["page"], "must be a positive integer");
        assert_eq!(errors["page_size"], "must be a maximum of 100");
        assert_eq!(errors["sort"], "invalid sort value");
        assert_eq!(errors["priceTo"], "must be an integer value");
    }

    #[test]
    fn oversized_page_is_caught_by_validation() {
        let (_, v) = parse(&[("page", "10000001")]);
        assert_eq!(v.errors()["page"], "must be a maximum of 10 million");
    }

    #[test]
    fn title_match_ignores_case() {
        let (query, _) = parse(&[("title", "imac")]);
        assert!(query.title_matches("iMac"));
        assert!(!query.title_matches("iMac Pro"));

        let (any, _) = parse(&[]);
        assert!(any.title_matches("anything"));
    }
}
