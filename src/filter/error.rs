use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unsafe sort parameter: {0}")]
    UnsafeSortParameter(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
}
