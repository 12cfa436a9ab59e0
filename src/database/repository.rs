use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{FromRow, PgPool, Row};

use crate::database::manager::{with_timeout, DatabaseError};
use crate::database::models::Entity;
use crate::database::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::filter::{calculate_metadata, ListQuery, Metadata};

/// One page of a list query together with its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: Metadata,
}

/// Storage for one entity type.
///
/// Implemented by `PgRepository` for PostgreSQL and by `MemoryRepository` for
/// tests and demo runs.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<T>, DatabaseError>;

    async fn get(&self, id: i64) -> Result<T, DatabaseError>;

    /// Store a new record and return it with its id and timestamps assigned.
    async fn insert(&self, record: T) -> Result<T, DatabaseError>;

    /// Persist `record` if nobody changed it since it was read, as judged by
    /// its `updated_at`. Otherwise fails with `EditConflict`.
    async fn update(&self, record: T) -> Result<T, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;
}

pub type DynRepository<T> = Arc<dyn Repository<T>>;

pub struct PgRepository<T> {
    pool: PgPool,
    timeout: Duration,
    log_queries: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> PgRepository<T> {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            log_queries: false,
            _phantom: PhantomData,
        }
    }

    pub fn with_query_logging(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    pub fn boxed(self) -> DynRepository<T> {
        Arc::new(self)
    }

    fn builder() -> Result<QueryBuilder, DatabaseError> {
        Ok(QueryBuilder::new(T::LIST)?)
    }

    fn log(&self, sql: &str) {
        if self.log_queries {
            tracing::debug!(table = T::LIST.table, "{}", sql);
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn list(&self, query: &ListQuery) -> Result<Page<T>, DatabaseError> {
        let builder = Self::builder()?;
        let sql = builder.list(query)?;
        let count_sql = builder.count(query)?;
        self.log(&sql.query);

        with_timeout(self.timeout, async {
            let mut q = sqlx::query(&sql.query);
            for p in sql.params.iter() {
                q = bind_param_query(q, p);
            }

            let mut total_records = 0_i64;
            let mut items = Vec::new();
            let mut rows = q.fetch(&self.pool);
            while let Some(row) = rows.try_next().await? {
                total_records = row.try_get("total_records")?;
                items.push(T::from_row(&row)?);
            }
            drop(rows);

            // Past the last page no row carries the window count.
            if items.is_empty() && query.filters.offset() > 0 {
                self.log(&count_sql.query);
                let mut q = sqlx::query(&count_sql.query);
                for p in count_sql.params.iter() {
                    q = bind_param_query(q, p);
                }
                total_records = q.fetch_one(&self.pool).await?.try_get("total_records")?;
            }

            let metadata = calculate_metadata(
                total_records,
                query.filters.page,
                query.filters.page_size,
            );
            Ok(Page { items, metadata })
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<T, DatabaseError> {
        if id < 1 {
            return Err(DatabaseError::NotFound(format!("{} {}", T::LIST.table, id)));
        }
        let sql = Self::builder()?.select_by_id();
        self.log(&sql);

        with_timeout(self.timeout, async {
            sqlx::query_as::<_, T>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", T::LIST.table, id)))
        })
        .await
    }

    async fn insert(&self, record: T) -> Result<T, DatabaseError> {
        let sql = Self::builder()?.insert(T::WRITABLE)?;
        self.log(&sql);
        let values = record.writable_values();

        with_timeout(self.timeout, async {
            let mut q = sqlx::query_as::<_, T>(&sql);
            for v in values.iter() {
                q = bind_param_query_as(q, v);
            }
            Ok(q.fetch_one(&self.pool).await?)
        })
        .await
    }

    async fn update(&self, record: T) -> Result<T, DatabaseError> {
        let sql = Self::builder()?.update(T::WRITABLE)?;
        self.log(&sql);
        let values = record.writable_values();

        with_timeout(self.timeout, async {
            let mut q = sqlx::query_as::<_, T>(&sql);
            for v in values.iter() {
                q = bind_param_query_as(q, v);
            }
            q.bind(record.id())
                .bind(record.updated_at())
                .fetch_optional(&self.pool)
                .await?
                .ok_or(DatabaseError::EditConflict(record.id()))
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        if id < 1 {
            return Err(DatabaseError::NotFound(format!("{} {}", T::LIST.table, id)));
        }
        let sql = Self::builder()?.delete();
        self.log(&sql);

        with_timeout(self.timeout, async {
            let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound(format!("{} {}", T::LIST.table, id)));
            }
            Ok(())
        })
        .await
    }
}
