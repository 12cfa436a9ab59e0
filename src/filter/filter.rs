use super::error::FilterError;
use super::types::SortDirection;
use super::validator::Validator;
use super::{MAX_PAGE, MAX_PAGE_SIZE};

/// Pagination and sort intent for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safe_list: Vec<String>,
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>, sort_safe_list: Vec<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safe_list,
        }
    }

    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(self.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        v.check(self.is_safe(&self.sort), "sort", "invalid sort value");
    }

    /// Sort key with any `-` prefix removed.
    ///
    /// Both the requested value and the bare key must be on the safelist. A
    /// miss means validation was skipped, which is a programming error rather
    /// than bad client input.
    pub fn sort_column(&self) -> Result<&str, FilterError> {
        let column = self.sort.strip_prefix('-').unwrap_or(&self.sort);
        if self.is_safe(&self.sort) && self.is_safe(column) {
            Ok(column)
        } else {
            Err(FilterError::UnsafeSortParameter(self.sort.clone()))
        }
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).max(0).saturating_mul(self.page_size)
    }

    fn is_safe(&self, value: &str) -> bool {
        self.sort_safe_list.iter().any(|safe| safe == value)
    }
}
