pub mod types;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod list_query;
pub mod metadata;
pub mod params;
pub mod validator;
pub mod error;

pub use types::*;
pub use filter::Filters;
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
pub use list_query::{ListQuery, ListSpec};
pub use metadata::{calculate_metadata, Metadata};
pub use params::QueryParams;
pub use validator::Validator;
pub use error::FilterError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_SORT: &str = "id";
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Accept only plain SQL identifiers: an ASCII letter or `_` followed by
/// ASCII alphanumerics or `_`.
pub fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidColumn(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        for ok in ["id", "number_of_branches", "_tmp", "col2"] {
            assert!(validate_identifier(ok).is_ok(), "{ok}");
        }
        for bad in ["", "2col", "price; DROP", "title desc", "a-b", "\"id\""] {
            assert_eq!(
                validate_identifier(bad),
                Err(FilterError::InvalidColumn(bad.to_string())),
                "{bad}"
            );
        }
    }
}
