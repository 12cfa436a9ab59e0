use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::repository::{DynRepository, Page, Repository};
use crate::filter::{calculate_metadata, FilterOrder, ListQuery, SortDirection};

#[derive(Debug)]
struct Rows<T> {
    records: Vec<T>,
    next_id: i64,
}

/// Repository that keeps records in process memory.
///
/// Evaluates list queries with the same safelist resolution and metadata
/// rules as the SQL path, so handlers behave identically on either backend.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    rows: RwLock<Rows<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Rows {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Repository pre-filled with `records`, which receive fresh ids.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let now = Utc::now();
        let mut rows = Rows {
            records: Vec::new(),
            next_id: 1,
        };
        for mut record in records {
            record.set_system_fields(rows.next_id, now, now);
            rows.next_id += 1;
            rows.records.push(record);
        }
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub fn boxed(self) -> DynRepository<T> {
        Arc::new(self)
    }

    fn not_found(id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("{} {}", T::LIST.table, id))
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn list(&self, query: &ListQuery) -> Result<Page<T>, DatabaseError> {
        let order = FilterOrder::resolve(&query.filters, T::LIST.sort_fields)?;
        let rows = self.rows.read().await;

        let mut matching: Vec<&T> = rows
            .records
            .iter()
            .filter(|r| query.title_matches(r.title()) && query.range.contains(r.range_value()))
            .collect();

        matching.sort_by(|a, b| {
            let primary = a.sort_value(order.column).cmp(&b.sort_value(order.column));
            let primary = match order.sort {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id().cmp(&b.id()))
        });

        let total_records = matching.len() as i64;
        let offset = usize::try_from(query.filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.filters.limit()).unwrap_or(0);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page {
            items,
            metadata: calculate_metadata(total_records, query.filters.page, query.filters.page_size),
        })
    }

    async fn get(&self, id: i64) -> Result<T, DatabaseError> {
        let rows = self.rows.read().await;
        rows.records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn insert(&self, mut record: T) -> Result<T, DatabaseError> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();
        record.set_system_fields(rows.next_id, now, now);
        rows.next_id += 1;
        rows.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: T) -> Result<T, DatabaseError> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(DatabaseError::EditConflict(record.id()))?;
        if stored.updated_at() != record.updated_at() {
            return Err(DatabaseError::EditConflict(record.id()));
        }

        // Strictly increasing, even when two updates land in the same tick.
        let now = Utc::now().max(stored.updated_at() + chrono::Duration::microseconds(1));
        record.set_system_fields(record.id(), stored.created_at(), now);
        *stored = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        let before = rows.records.len();
        rows.records.retain(|r| r.id() != id);
        if rows.records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
