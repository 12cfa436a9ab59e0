#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sort key exposed to clients and the column it orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub key: &'static str,
    pub column: &'static str,
}

impl SortField {
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self { key, column }
    }
}

/// Numeric column filtered by an inclusive `from`/`to` pair of query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeField {
    pub column: &'static str,
    pub from_param: &'static str,
    pub to_param: &'static str,
}

/// Inclusive bounds read from the query string. Zero means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericRange {
    pub from: i64,
    pub to: i64,
}

impl NumericRange {
    pub fn contains(&self, value: i64) -> bool {
        (self.from == 0 || value >= self.from) && (self.to == 0 || value <= self.to)
    }
}

/// Column and direction resolved from a safelisted sort value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
