use std::collections::HashMap;

use super::validator::Validator;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";
pub const SORT_PARAM: &str = "sort";

/// Read-only view over a request's decoded query string.
///
/// Missing and empty values are treated alike, so `?page=` falls back to the
/// default the same way an absent `page` does.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn read_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Integer value for `key`, or `default` when absent. A value that does
    /// not parse is reported on `key` and the default is returned.
    pub fn read_int(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        }
    }

    pub fn parse_page(&self, default: i64, v: &mut Validator) -> i64 {
        self.read_positive(PAGE_PARAM, default, v)
    }

    pub fn parse_page_size(&self, default: i64, v: &mut Validator) -> i64 {
        let size = self.read_positive(PAGE_SIZE_PARAM, default, v);
        v.check(size <= super::MAX_PAGE_SIZE, PAGE_SIZE_PARAM, "must be a maximum of 100");
        size
    }

    pub fn parse_sort(&self, default: &str) -> String {
        self.read_string(SORT_PARAM, default)
    }

    fn read_positive(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => n,
            Ok(n) => {
                v.add_error(key, "must be a positive integer");
                n
            }
            Err(_) => {
                v.add_error(key, "must be a positive integer");
                default
            }
        }
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn absent_values_use_defaults() {
        let qs = params(&[]);
        let mut v = Validator::new();

        assert_eq!(qs.parse_page(1, &mut v), 1);
        assert_eq!(qs.parse_page_size(20, &mut v), 20);
        assert_eq!(qs.parse_sort("id"), "id");
        assert!(v.valid());
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let qs = params(&[("page", ""), ("sort", "")]);
        let mut v = Validator::new();

        assert_eq!(qs.parse_page(1, &mut v), 1);
        assert_eq!(qs.parse_sort("id"), "id");
        assert!(v.valid());
    }

    #[test]
    fn non_numeric_page_is_flagged() {
        let qs = params(&[("page", "two")]);
        let mut v = Validator::new();

        qs.parse_page(1, &mut v);
        assert_eq!(v.errors()["page"], "must be a positive integer");
    }

    #[test]
    fn zero_and_negative_pages_are_flagged() {
        for raw in ["0", "-3"] {
            let qs = params(&[("page", raw)]);
            let mut v = Validator::new();
            qs.parse_page(1, &mut v);
            assert_eq!(v.errors()["page"], "must be a positive integer", "page={raw}");
        }
    }

    #[test]
    fn page_size_above_maximum_is_flagged() {
        let qs = params(&[("page_size", "101")]);
        let mut v = Validator::new();

        assert_eq!(qs.parse_page_size(20, &mut v), 101);
        assert_eq!(v.errors()["page_size"], "must be a maximum of 100");
    }

    #[test]
    fn read_int_reports_garbage_on_its_own_key() {
        let qs = params(&[("priceFrom", "cheap"), ("priceTo", "500")]);
        let mut v = Validator::new();

        assert_eq!(qs.read_int("priceFrom", 0, &mut v), 0);
        assert_eq!(qs.read_int("priceTo", 0, &mut v), 500);
        assert_eq!(v.errors()["priceFrom"], "must be an integer value");
        assert!(!v.errors().contains_key("priceTo"));
    }
}
