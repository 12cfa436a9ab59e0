use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{check_length, Entity, SortValue};
use crate::filter::{ListSpec, RangeField, SortField, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub address: String,
    pub coordinates: String,
    pub number_of_branches: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: String,
    #[serde(default)]
    pub number_of_branches: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StorePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<String>,
    pub number_of_branches: Option<i32>,
}

impl Entity for Store {
    const ENVELOPE: &'static str = "stores";
    const LIST: ListSpec = ListSpec {
        table: "stores",
        columns: &[
            "id",
            "created_at",
            "updated_at",
            "title",
            "description",
            "address",
            "coordinates",
            "number_of_branches",
        ],
        title_column: "title",
        sort_fields: &[
            SortField::new("id", "id"),
            SortField::new("title", "title"),
            SortField::new("numberOfBranches", "number_of_branches"),
        ],
        range: RangeField {
            column: "number_of_branches",
            from_param: "branchesFrom",
            to_param: "branchesTo",
        },
    };
    const WRITABLE: &'static [&'static str] =
        &["title", "description", "address", "coordinates", "number_of_branches"];

    type Input = StoreInput;
    type Patch = StorePatch;

    fn from_input(input: StoreInput) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            created_at: now,
            updated_at: now,
            title: input.title,
            description: input.description,
            address: input.address,
            coordinates: input.coordinates,
            number_of_branches: input.number_of_branches,
        }
    }

    fn apply_patch(&mut self, patch: StorePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(coordinates) = patch.coordinates {
            self.coordinates = coordinates;
        }
        if let Some(branches) = patch.number_of_branches {
            self.number_of_branches = branches;
        }
    }

    fn validate(&self, v: &mut Validator) {
        v.check(!self.title.is_empty(), "title", "must be provided");
        check_length(v, &self.title, 100, "title");
        check_length(v, &self.description, 1000, "description");
        check_length(v, &self.address, 500, "address");
        check_length(v, &self.coordinates, 100, "coordinates");
        v.check(self.number_of_branches >= 0, "numberOfBranches", "must not be negative");
        v.check(self.number_of_branches <= 500, "numberOfBranches", "must not be more than 500");
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_system_fields(&mut self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn writable_values(&self) -> Vec<Value> {
        vec![
            json!(self.title),
            json!(self.description),
            json!(self.address),
            json!(self.coordinates),
            json!(self.number_of_branches),
        ]
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn range_value(&self) -> i64 {
        i64::from(self.number_of_branches)
    }

    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Int(self.id)),
            "title" => Some(SortValue::Text(self.title.clone())),
            "number_of_branches" => Some(SortValue::Int(i64::from(self.number_of_branches))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_checked_under_their_own_key() {
        let mut store = Store::from_input(StoreInput {
            title: "Sulpak".to_string(),
            coordinates: "4".repeat(101),
            ..Default::default()
        });
        store.number_of_branches = 501;

        let mut v = Validator::new();
        store.validate(&mut v);
        assert_eq!(v.errors()["coordinates"], "must not be more than 100 bytes long");
        assert_eq!(v.errors()["numberOfBranches"], "must not be more than 500");
        assert!(!v.errors().contains_key("address"));
    }

    #[test]
    fn branches_sort_key_maps_to_snake_case_column() {
        let store = Store::from_input(StoreInput {
            title: "iPoint".to_string(),
            number_of_branches: 2,
            ..Default::default()
        });
        assert_eq!(store.sort_value("number_of_branches"), Some(SortValue::Int(2)));
        assert_eq!(store.sort_value("numberOfBranches"), None);
    }

    #[test]
    fn absent_patch_fields_are_kept() {
        let mut store = Store::from_input(StoreInput {
            title: "TechnoDom".to_string(),
            address: "Some street in almaty".to_string(),
            number_of_branches: 3,
            ..Default::default()
        });
        store.apply_patch(StorePatch {
            title: Some("Technodom".to_string()),
            ..Default::default()
        });

        assert_eq!(store.title, "Technodom");
        assert_eq!(store.address, "Some street in almaty");
        assert_eq!(store.number_of_branches, 3);
    }
}
