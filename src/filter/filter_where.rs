use serde_json::Value;

use super::error::FilterError;
use super::list_query::{ListQuery, ListSpec};
use super::validate_identifier;

/// Builds the `WHERE` clause of a list query.
///
/// Every client-supplied value becomes a positional parameter; only column
/// names from the entity's `ListSpec` appear in the SQL text.
pub struct FilterWhere {
    param_values: Vec<Value>,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    pub fn generate(spec: &ListSpec, query: &ListQuery) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new();

        let title = filter_where.push_param(Value::from(query.title.clone()));
        filter_where.conditions.push(format!(
            "(LOWER({col}) = LOWER({title}) OR {title} = '')",
            col = Self::column(spec.title_column)?,
        ));

        let range_column = Self::column(spec.range.column)?;
        let from = filter_where.push_param(Value::from(query.range.from));
        filter_where
            .conditions
            .push(format!("({range_column} >= {from} OR {from} = 0)"));
        let to = filter_where.push_param(Value::from(query.range.to));
        filter_where
            .conditions
            .push(format!("({range_column} <= {to} OR {to} = 0)"));

        Ok((filter_where.conditions.join(" AND "), filter_where.param_values))
    }

    /// Register a bound value and return its placeholder.
    fn push_param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }

    fn column(name: &'static str) -> Result<&'static str, FilterError> {
        validate_identifier(name)?;
        Ok(name)
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{NumericRange, RangeField, SortField};
    use crate::filter::Filters;
    use serde_json::json;

    const SPEC: ListSpec = ListSpec {
        table: "stores",
        columns: &["id", "title"],
        title_column: "title",
        sort_fields: &[SortField::new("id", "id")],
        range: RangeField {
            column: "number_of_branches",
            from_param: "branchesFrom",
            to_param: "branchesTo",
        },
    };

    #[test]
    fn values_are_bound_not_interpolated() {
        let query = ListQuery {
            title: "x' OR 1=1 --".to_string(),
            range: NumericRange { from: 2, to: 5 },
            filters: Filters::new(1, 20, "id", SPEC.sort_safe_list()),
        };

        let (clause, params) = FilterWhere::generate(&SPEC, &query).unwrap();
        assert_eq!(
            clause,
            "(LOWER(title) = LOWER($1) OR $1 = '') \
             AND (number_of_branches >= $2 OR $2 = 0) \
             AND (number_of_branches <= $3 OR $3 = 0)"
        );
        assert!(!clause.contains("OR 1=1"));
        assert_eq!(params, vec![json!("x' OR 1=1 --"), json!(2), json!(5)]);
    }

    #[test]
    fn range_column_must_be_a_plain_identifier() {
        const BAD: ListSpec = ListSpec {
            range: RangeField {
                column: "2branches",
                from_param: "branchesFrom",
                to_param: "branchesTo",
            },
            ..SPEC
        };
        let query = ListQuery {
            title: String::new(),
            range: NumericRange::default(),
            filters: Filters::new(1, 20, "id", BAD.sort_safe_list()),
        };
        assert_eq!(
            FilterWhere::generate(&BAD, &query),
            Err(FilterError::InvalidColumn("2branches".to_string()))
        );
    }
}
