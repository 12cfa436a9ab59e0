use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{check_length, Entity, SortValue};
use crate::filter::{ListSpec, RangeField, SortField, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub for_what_country: String,
    pub price: i32,
}

/// Body of `POST /api/v1/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub for_what_country: String,
    #[serde(default)]
    pub price: i32,
}

/// Body of `PUT /api/v1/products/:id`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub for_what_country: Option<String>,
    pub price: Option<i32>,
}

impl Entity for Product {
    const ENVELOPE: &'static str = "products";
    const LIST: ListSpec = ListSpec {
        table: "products",
        columns: &[
            "id",
            "created_at",
            "updated_at",
            "title",
            "description",
            "for_what_country",
            "price",
        ],
        title_column: "title",
        sort_fields: &[
            SortField::new("id", "id"),
            SortField::new("title", "title"),
            SortField::new("price", "price"),
        ],
        range: RangeField {
            column: "price",
            from_param: "priceFrom",
            to_param: "priceTo",
        },
    };
    const WRITABLE: &'static [&'static str] = &["title", "description", "for_what_country", "price"];

    type Input = ProductInput;
    type Patch = ProductPatch;

    fn from_input(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            created_at: now,
            updated_at: now,
            title: input.title,
            description: input.description,
            for_what_country: input.for_what_country,
            price: input.price,
        }
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(country) = patch.for_what_country {
            self.for_what_country = country;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }

    fn validate(&self, v: &mut Validator) {
        v.check(!self.title.is_empty(), "title", "must be provided");
        check_length(v, &self.title, 100, "title");
        check_length(v, &self.description, 1000, "description");
        check_length(v, &self.for_what_country, 10, "forWhatCountry");
        v.check(self.price >= 0, "price", "must not be negative");
        v.check(self.price <= 1000, "price", "must not be more than 1000");
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
            json!(self.for_what_country),
            json!(self.price),
        ]
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn range_value(&self) -> i64 {
        i64::from(self.price)
    }

    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Int(self.id)),
            "title" => Some(SortValue::Text(self.title.clone())),
            "price" => Some(SortValue::Int(i64::from(self.price))),
            _ => None,
        }
    }
}
