use super::error::FilterError;
use super::filter::Filters;
use super::types::{FilterOrderInfo, SortField};
use super::validate_identifier;

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve the requested sort into a concrete column and direction.
    ///
    /// This runs immediately before the clause is interpolated into SQL, so the
    /// safelist is consulted again here regardless of earlier validation.
    pub fn resolve(filters: &Filters, fields: &[SortField]) -> Result<FilterOrderInfo, FilterError> {
        let key = filters.sort_column()?;
        let field = fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| FilterError::InvalidColumn(key.to_string()))?;
        validate_identifier(field.column)?;

        Ok(FilterOrderInfo {
            column: field.column,
            sort: filters.sort_direction(),
        })
    }

    /// `ORDER BY` clause with `id` as the tie-breaker so pages are stable.
    pub fn generate(info: &FilterOrderInfo) -> String {
        if info.column == "id" {
            format!("ORDER BY id {}", info.sort.to_sql())
        } else {
            format!("ORDER BY {} {}, id ASC", info.column, info.sort.to_sql())
        }
    }

    /// Safelist entries (`key` and `-key`) for the given sort fields.
    pub fn safe_list(fields: &[SortField]) -> Vec<String> {
        let ascending = fields.iter().map(|f| f.key.to_string());
        let descending = fields.iter().map(|f| format!("-{}", f.key));
        ascending.chain(descending).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SortDirection;

    const FIELDS: &[SortField] = &[
        SortField::new("id", "id"),
        SortField::new("title", "title"),
        SortField::new("numberOfBranches", "number_of_branches"),
    ];

    fn filters(sort: &str) -> Filters {
        Filters::new(1, 20, sort, FilterOrder::safe_list(FIELDS))
    }

    #[test]
    fn safe_list_has_both_directions() {
        assert_eq!(
            FilterOrder::safe_list(FIELDS),
            vec!["id", "title", "numberOfBranches", "-id", "-title", "-numberOfBranches"]
        );
    }

    #[test]
    fn resolves_client_key_to_column() {
        let info = FilterOrder::resolve(&filters("-numberOfBranches"), FIELDS).unwrap();
        assert_eq!(info.column, "number_of_branches");
        assert_eq!(info.sort, SortDirection::Desc);
        assert_eq!(
            FilterOrder::generate(&info),
            "ORDER BY number_of_branches DESC, id ASC"
        );
    }

    #[test]
    fn id_sort_has_no_duplicate_tie_breaker() {
        let info = FilterOrder::resolve(&filters("-id"), FIELDS).unwrap();
        assert_eq!(FilterOrder::generate(&info), "ORDER BY id DESC");
    }

    #[test]
    fn safelisted_key_without_column_mapping_is_rejected() {
        let mut f = filters("id");
        f.sort_safe_list.push("rating".to_string());
        f.sort = "rating".to_string();
        assert_eq!(
            FilterOrder::resolve(&f, FIELDS),
            Err(FilterError::InvalidColumn("rating".to_string()))
        );
    }

    #[test]
    fn unsafe_sort_never_reaches_sql() {
        let f = filters("title desc; --");
        assert!(matches!(
            FilterOrder::resolve(&f, FIELDS),
            Err(FilterError::UnsafeSortParameter(_))
        ));
    }

    #[test]
    fn malformed_column_mapping_is_rejected() {
        const BAD: &[SortField] = &[SortField::new("id", "id; DROP")];
        let f = Filters::new(1, 20, "id", FilterOrder::safe_list(BAD));
        assert!(matches!(FilterOrder::resolve(&f, BAD), Err(FilterError::InvalidColumn(_))));
    }
}
