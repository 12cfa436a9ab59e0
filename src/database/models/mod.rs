pub mod product;
pub mod store;

pub use product::{Product, ProductInput, ProductPatch};
pub use store::{Store, StoreInput, StorePatch};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow};

use crate::filter::{ListSpec, Validator};

/// Value a record exposes for an in-memory sort on one of its columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Int(i64),
    Text(String),
}

/// A catalogue record served by the generic list/CRUD endpoints.
///
/// Implementors describe their table through `LIST` and `WRITABLE`; the
/// repositories and handlers contain no per-entity code.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    /// Key under which records are wrapped in response envelopes.
    const ENVELOPE: &'static str;
    const LIST: ListSpec;
    /// Columns set on insert and update, in the order of `writable_values`.
    const WRITABLE: &'static [&'static str];

    type Input: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    fn from_input(input: Self::Input) -> Self;
    /// Overwrite only the fields present in `patch`.
    fn apply_patch(&mut self, patch: Self::Patch);
    fn validate(&self, v: &mut Validator);

    fn id(&self) -> i64;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_system_fields(&mut self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);
    fn writable_values(&self) -> Vec<Value>;

    fn title(&self) -> &str;
    /// Value of the column named by `LIST.range`.
    fn range_value(&self) -> i64;
    /// Value of a sortable column, `None` for columns outside `LIST.sort_fields`.
    fn sort_value(&self, column: &str) -> Option<SortValue>;
}

pub(crate) fn check_length(v: &mut Validator, value: &str, max: usize, field: &str) {
    v.check(
        value.len() <= max,
        field,
        &format!("must not be more than {max} bytes long"),
    );
}
