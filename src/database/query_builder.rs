use serde_json::Value;
use sqlx::postgres::PgArguments;

use crate::filter::types::SqlResult;
use crate::filter::{validate_identifier, FilterError, FilterOrder, FilterWhere, ListQuery, ListSpec};

/// SQL text for one entity table.
///
/// Identifiers come from the entity's static `ListSpec`; request data only
/// ever arrives through positional parameters.
pub struct QueryBuilder {
    spec: ListSpec,
}

impl QueryBuilder {
    pub fn new(spec: ListSpec) -> Result<Self, FilterError> {
        validate_identifier(spec.table)
            .map_err(|_| FilterError::InvalidTableName(spec.table.to_string()))?;
        for column in spec.columns {
            validate_identifier(column)?;
        }
        Ok(Self { spec })
    }

    /// One page of rows, each carrying the total match count as `total_records`.
    ///
    /// Parameters: `$1` title, `$2`/`$3` range bounds, `$4` limit, `$5` offset.
    pub fn list(&self, query: &ListQuery) -> Result<SqlResult, FilterError> {
        let (where_clause, mut params) = FilterWhere::generate(&self.spec, query)?;
        let order = FilterOrder::resolve(&query.filters, self.spec.sort_fields)?;

        params.push(Value::from(query.filters.limit()));
        let limit = params.len();
        params.push(Value::from(query.filters.offset()));
        let offset = params.len();

        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {columns} FROM {table} WHERE {where_clause} {order} LIMIT ${limit} OFFSET ${offset}",
            columns = self.select_columns(),
            table = self.spec.table,
            order = FilterOrder::generate(&order),
        );

        Ok(SqlResult { query: sql, params })
    }

    /// Total rows matching the list filters, ignoring pagination. Binds the
    /// same `$1`..`$3` as `list`.
    pub fn count(&self, query: &ListQuery) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.spec, query)?;
        let sql = format!(
            "SELECT count(*) AS total_records FROM {} WHERE {}",
            self.spec.table, where_clause
        );
        Ok(SqlResult { query: sql, params })
    }

    pub fn select_by_id(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE id = $1",
            self.select_columns(),
            self.spec.table
        )
    }

    /// Insert `writable` columns and return the full stored row.
    pub fn insert(&self, writable: &[&str]) -> Result<String, FilterError> {
        for column in writable {
            validate_identifier(column)?;
        }
        let placeholders: Vec<String> = (1..=writable.len()).map(|i| format!("${i}")).collect();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.spec.table,
            writable.join(", "),
            placeholders.join(", "),
            self.select_columns()
        ))
    }

    /// Update guarded by the row's `updated_at`, so a concurrent edit makes it
    /// match nothing. The id and the expected `updated_at` follow the
    /// writable values as the last two parameters.
    pub fn update(&self, writable: &[&str]) -> Result<String, FilterError> {
        let mut assignments = Vec::with_capacity(writable.len() + 1);
        for (i, column) in writable.iter().enumerate() {
            validate_identifier(column)?;
            assignments.push(format!("{} = ${}", column, i + 1));
        }
        assignments.push("updated_at = CURRENT_TIMESTAMP".to_string());

        let id_param = writable.len() + 1;
        Ok(format!(
            "UPDATE {} SET {} WHERE id = ${} AND updated_at = ${} RETURNING {}",
            self.spec.table,
            assignments.join(", "),
            id_param,
            id_param + 1,
            self.select_columns()
        ))
    }

    pub fn delete(&self) -> String {
        format!("DELETE FROM {} WHERE id = $1", self.spec.table)
    }

    fn select_columns(&self) -> String {
        self.spec.columns.join(", ")
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Entity, Product, Store};
    use crate::filter::{Filters, NumericRange};
    use serde_json::json;

    fn list_query(spec: &ListSpec, sort: &str, page: i64, page_size: i64) -> ListQuery {
        ListQuery {
            title: String::new(),
            range: NumericRange::default(),
            filters: Filters::new(page, page_size, sort, spec.sort_safe_list()),
        }
    }

    #[test]
    fn list_query_orders_by_resolved_column_and_binds_window() {
        let builder = QueryBuilder::new(Product::LIST).unwrap();
        let sql = builder
            .list(&list_query(&Product::LIST, "-price", 3, 20))
            .unwrap();

        assert!(sql.query.starts_with("SELECT count(*) OVER() AS total_records, id, created_at"));
        assert!(sql.query.contains("FROM products WHERE (LOWER(title) = LOWER($1) OR $1 = '')"));
        assert!(sql.query.contains("ORDER BY price DESC, id ASC LIMIT $4 OFFSET $5"));
        assert_eq!(sql.params, vec![json!(""), json!(0), json!(0), json!(20), json!(40)]);
    }

    #[test]
    fn count_shares_the_list_filters() {
        let builder = QueryBuilder::new(Product::LIST).unwrap();
        let query = list_query(&Product::LIST, "-price", 4, 2);
        let count = builder.count(&query).unwrap();
        let list = builder.list(&query).unwrap();

        assert_eq!(
            count.query,
            "SELECT count(*) AS total_records FROM products WHERE (LOWER(title) = LOWER($1) OR $1 = '') \
             AND (price >= $2 OR $2 = 0) AND (price <= $3 OR $3 = 0)"
        );
        assert_eq!(count.params, list.params[..3].to_vec());
        assert!(!count.query.contains("LIMIT"));
    }

    #[test]
    fn store_sort_key_is_translated_to_column() {
        let builder = QueryBuilder::new(Store::LIST).unwrap();
        let sql = builder
            .list(&list_query(&Store::LIST, "numberOfBranches", 1, 20))
            .unwrap();
        assert!(sql.query.contains("ORDER BY number_of_branches ASC, id ASC"));
        assert!(sql.query.contains("(number_of_branches >= $2 OR $2 = 0)"));
    }

    #[test]
    fn unvalidated_sort_is_refused() {
        let builder = QueryBuilder::new(Product::LIST).unwrap();
        let mut query = list_query(&Product::LIST, "id", 1, 20);
        query.filters.sort = "price; DROP TABLE products".to_string();

        assert!(matches!(
            builder.list(&query),
            Err(FilterError::UnsafeSortParameter(_))
        ));
    }

    #[test]
    fn insert_and_update_statements() {
        let builder = QueryBuilder::new(Product::LIST).unwrap();
        assert_eq!(
            builder.insert(Product::WRITABLE).unwrap(),
            "INSERT INTO products (title, description, for_what_country, price) VALUES ($1, $2, $3, $4) \
             RETURNING id, created_at, updated_at, title, description, for_what_country, price"
        );
        assert_eq!(
            builder.update(Product::WRITABLE).unwrap(),
            "UPDATE products SET title = $1, description = $2, for_what_country = $3, price = $4, \
             updated_at = CURRENT_TIMESTAMP WHERE id = $5 AND updated_at = $6 \
             RETURNING id, created_at, updated_at, title, description, for_what_country, price"
        );
    }

    #[test]
    fn select_and_delete_statements() {
        let builder = QueryBuilder::new(Store::LIST).unwrap();
        assert!(builder.select_by_id().ends_with("FROM stores WHERE id = $1"));
        assert_eq!(builder.delete(), "DELETE FROM stores WHERE id = $1");
    }

    #[test]
    fn rejects_bad_table_name() {
        const BAD: ListSpec = ListSpec {
            table: "products; --",
            ..Product::LIST
        };
        assert!(matches!(
            QueryBuilder::new(BAD),
            Err(FilterError::InvalidTableName(_))
        ));
    }
}
