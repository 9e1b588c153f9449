use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use scylla::client::session::Session;
use scylla::response::query_result::QueryResult;
use scylla::serialize::row::SerializeRow;
use scylla::value::{CqlValue, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::seedwork::core::{
    AggregateRoot, Criteria, DomainError, DomainResult, Entity, FieldValue, Queryable, Specification,
};
use super::repository::{Page, Repository};

// ============================================================================
// Scylla Repository - Snapshot Persistence with Lightweight Transactions
// ============================================================================
//
// Tables (shared by every aggregate type):
//   aggregate_snapshots  one partition per aggregate: JSON snapshot + version
//   aggregate_catalog    ids per (type, bucket), for full scans
//   aggregate_lookups    ids per (type, field, value), for equality lookups
//
// Optimistic concurrency uses Scylla LWT on the snapshot row:
//   add     -> INSERT ... IF NOT EXISTS
//   update  -> UPDATE ... IF version = <expected>
//
// A rejected LWT reports the stored version, which becomes the `actual`
// field of the ConcurrencyConflict.
//
// Catalog and lookup rows are written before the snapshot. They may point at
// a snapshot that never landed or no longer matches; every candidate is
// re-checked against the specification after loading, so stale index rows
// only cost a read.
//
// ============================================================================

pub const CATALOG_BUCKETS: i32 = 16;

pub const SNAPSHOT_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS aggregate_snapshots (
    aggregate_id uuid,
    aggregate_type text,
    version bigint,
    is_deleted boolean,
    payload text,
    updated_at timestamp,
    PRIMARY KEY ((aggregate_id))
)";

pub const CATALOG_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS aggregate_catalog (
    aggregate_type text,
    bucket int,
    aggregate_id uuid,
    PRIMARY KEY ((aggregate_type, bucket), aggregate_id)
)";

pub const LOOKUP_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS aggregate_lookups (
    aggregate_type text,
    field text,
    value text,
    aggregate_id uuid,
    PRIMARY KEY ((aggregate_type, field, value), aggregate_id)
)";

const INSERT_SNAPSHOT: &str = "INSERT INTO aggregate_snapshots (
    aggregate_id, aggregate_type, version, is_deleted, payload, updated_at
) VALUES (?, ?, ?, ?, ?, ?) IF NOT EXISTS";

const UPDATE_SNAPSHOT: &str = "UPDATE aggregate_snapshots
    SET version = ?, is_deleted = ?, payload = ?, updated_at = ?
    WHERE aggregate_id = ?
    IF version = ?";

const SELECT_ONE: &str = "SELECT aggregate_type, payload FROM aggregate_snapshots WHERE aggregate_id = ?";

const INSERT_CATALOG: &str = "INSERT INTO aggregate_catalog (aggregate_type, bucket, aggregate_id) VALUES (?, ?, ?)";

const SELECT_CATALOG: &str = "SELECT aggregate_id FROM aggregate_catalog WHERE aggregate_type = ? AND bucket = ?";

const INSERT_LOOKUP: &str =
    "INSERT INTO aggregate_lookups (aggregate_type, field, value, aggregate_id) VALUES (?, ?, ?, ?)";

const SELECT_LOOKUP: &str =
    "SELECT aggregate_id FROM aggregate_lookups WHERE aggregate_type = ? AND field = ? AND value = ?";

/// Catalog partition for an aggregate id
pub fn catalog_bucket(id: Uuid) -> i32 {
    (id.as_u128() % CATALOG_BUCKETS as u128) as i32
}

/// Text stored in the lookup table for a field value; NULL is never indexed
pub fn lookup_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::Text(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// First indexed field the criteria pins to a single value
pub fn indexed_lookup(indexed: &[&'static str], criteria: &Criteria) -> Option<(&'static str, String)> {
    indexed.iter().find_map(|field| {
        criteria
            .required_value(field)
            .and_then(lookup_value)
            .map(|value| (*field, value))
    })
}

/// Values written for one aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub aggregate_id: Uuid,
    pub version: i64,
    pub is_deleted: bool,
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

impl SnapshotRow {
    pub fn from_aggregate<A: AggregateRoot + Serialize>(aggregate: &A) -> anyhow::Result<Self> {
        Ok(Self {
            aggregate_id: aggregate.id(),
            version: aggregate.version(),
            is_deleted: aggregate.is_deleted(),
            payload: serde_json::to_string(aggregate)
                .with_context(|| format!("serializing {} {}", A::AGGREGATE_TYPE, aggregate.id()))?,
            updated_at: Utc::now(),
        })
    }
}

pub fn decode_snapshot<A: DeserializeOwned>(payload: &str) -> anyhow::Result<A> {
    serde_json::from_str(payload).context("decoding aggregate snapshot")
}

/// Outcome of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LwtOutcome {
    pub applied: bool,
    /// Stored version reported by a rejected write, if the row exists
    pub current_version: Option<i64>,
}

impl LwtOutcome {
    /// Map a rejected write to the matching domain error
    pub fn into_result(
        self,
        aggregate_type: &'static str,
        aggregate_id: Uuid,
        expected: i64,
    ) -> DomainResult<()> {
        match (self.applied, self.current_version) {
            (true, _) => Ok(()),
            (false, Some(actual)) => Err(DomainError::ConcurrencyConflict {
                aggregate_type,
                aggregate_id,
                expected,
                actual,
            }),
            (false, None) => Err(DomainError::NotFound {
                aggregate_type,
                id: aggregate_id,
            }),
        }
    }
}

fn parse_lwt(result: QueryResult) -> anyhow::Result<LwtOutcome> {
    let rows = result
        .into_rows_result()
        .context("conditional write returned no rows")?;

    let version_index = rows
        .column_specs()
        .iter()
        .position(|spec| spec.name() == "version");

    let row = rows
        .maybe_first_row::<Row>()?
        .context("conditional write returned an empty result")?;

    let applied = matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))));
    let current_version = version_index
        .and_then(|idx| row.columns.get(idx))
        .and_then(|value| value.as_ref())
        .and_then(CqlValue::as_bigint);

    Ok(LwtOutcome {
        applied,
        current_version,
    })
}

/// Create the snapshot, catalog and lookup tables in the session's current keyspace
pub async fn ensure_snapshot_schema(session: &Session) -> anyhow::Result<()> {
    for ddl in [SNAPSHOT_TABLE_DDL, CATALOG_TABLE_DDL, LOOKUP_TABLE_DDL] {
        session.query_unpaged(ddl, &[]).await?;
    }
    tracing::info!("Snapshot tables ready");
    Ok(())
}

pub struct ScyllaRepository<A> {
    session: Arc<Session>,
    /// Queryable fields mirrored into `aggregate_lookups`
    indexed_fields: Vec<&'static str>,
    _phantom: PhantomData<fn() -> A>,
}

impl<A> ScyllaRepository<A>
where
    A: AggregateRoot + Queryable + Serialize + DeserializeOwned + Clone + 'static,
{
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            indexed_fields: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Index `field` so specifications pinning it to one value are point reads
    pub fn with_lookup(mut self, field: &'static str) -> Self {
        if !self.indexed_fields.contains(&field) {
            self.indexed_fields.push(field);
        }
        self
    }

    async fn load_one(&self, id: Uuid) -> anyhow::Result<Option<A>> {
        let result = self.session.query_unpaged(SELECT_ONE, (id,)).await?;

        let rows = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(None),
        };

        match rows.maybe_first_row::<(String, String)>()? {
            Some((aggregate_type, payload)) if aggregate_type == A::AGGREGATE_TYPE => {
                Ok(Some(decode_snapshot(&payload)?))
            }
            _ => Ok(None),
        }
    }

    async fn select_ids(&self, statement: &'static str, values: impl SerializeRow + Send) -> anyhow::Result<Vec<Uuid>> {
        let result = self.session.query_unpaged(statement, values).await?;
        let rows = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(Vec::new()),
        };

        let mut ids = Vec::new();
        for row in rows.rows::<(Uuid,)>()? {
            let (id,) = row?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Ids that may satisfy `criteria`: a lookup partition when an indexed
    /// field is pinned, otherwise every catalog bucket
    async fn candidate_ids(&self, criteria: &Criteria) -> anyhow::Result<Vec<Uuid>> {
        if let Some((field, value)) = indexed_lookup(&self.indexed_fields, criteria) {
            tracing::debug!(aggregate_type = A::AGGREGATE_TYPE, field, "Lookup read");
            return self.select_ids(SELECT_LOOKUP, (A::AGGREGATE_TYPE, field, value)).await;
        }

        let buckets = (0..CATALOG_BUCKETS)
            .map(|bucket| self.select_ids(SELECT_CATALOG, (A::AGGREGATE_TYPE, bucket)));
        Ok(try_join_all(buckets).await?.into_iter().flatten().collect())
    }

    async fn load_matching(&self, spec: &Specification<A>) -> anyhow::Result<Vec<A>> {
        let ids = self.candidate_ids(spec.to_expression()).await?;
        let loaded = try_join_all(ids.into_iter().map(|id| self.load_one(id))).await?;

        let aggregates: Vec<A> = loaded
            .into_iter()
            .flatten()
            .filter(|aggregate| spec.is_satisfied_by(aggregate))
            .collect();

        tracing::debug!(
            aggregate_type = A::AGGREGATE_TYPE,
            count = aggregates.len(),
            "Loaded snapshots"
        );
        Ok(aggregates)
    }

    async fn write_lookups(&self, aggregate: &A) -> anyhow::Result<()> {
        for field in &self.indexed_fields {
            if let Some(value) = aggregate.field(field).as_ref().and_then(lookup_value) {
                self.session
                    .query_unpaged(INSERT_LOOKUP, (A::AGGREGATE_TYPE, *field, value, aggregate.id()))
                    .await?;
            }
        }
        Ok(())
    }

    async fn insert(&self, aggregate: &A) -> anyhow::Result<LwtOutcome> {
        let row = SnapshotRow::from_aggregate(aggregate)?;

        self.session
            .query_unpaged(
                INSERT_CATALOG,
                (A::AGGREGATE_TYPE, catalog_bucket(row.aggregate_id), row.aggregate_id),
            )
            .await?;
        self.write_lookups(aggregate).await?;

        let result = self
            .session
            .query_unpaged(
                INSERT_SNAPSHOT,
                (
                    row.aggregate_id,
                    A::AGGREGATE_TYPE,
                    row.version,
                    row.is_deleted,
                    row.payload,
                    row.updated_at,
                ),
            )
            .await?;
        parse_lwt(result)
    }

    async fn update_row(&self, aggregate: &A, expected_version: i64) -> anyhow::Result<LwtOutcome> {
        let row = SnapshotRow::from_aggregate(aggregate)?;
        self.write_lookups(aggregate).await?;

        let result = self
            .session
            .query_unpaged(
                UPDATE_SNAPSHOT,
                (
                    row.version,
                    row.is_deleted,
                    row.payload,
                    row.updated_at,
                    row.aggregate_id,
                    expected_version,
                ),
            )
            .await?;
        parse_lwt(result)
    }

    async fn compare_and_swap(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        let outcome = self.update_row(aggregate, expected_version).await?;
        outcome.into_result(A::AGGREGATE_TYPE, aggregate.id(), expected_version)?;

        tracing::debug!(
            aggregate_type = A::AGGREGATE_TYPE,
            aggregate_id = %aggregate.id(),
            version = aggregate.version(),
            "Snapshot updated"
        );
        Ok(())
    }
}

#[async_trait]
impl<A> Repository<A> for ScyllaRepository<A>
where
    A: AggregateRoot + Queryable + Serialize + DeserializeOwned + Clone + 'static,
{
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<A>> {
        Ok(self.load_one(id).await?)
    }

    async fn find(&self, spec: &Specification<A>) -> DomainResult<Vec<A>> {
        Ok(spec.apply(self.load_matching(spec).await?))
    }

    async fn find_paged(&self, spec: &Specification<A>) -> DomainResult<Page<A>> {
        let (items, total_count) = spec.apply_counted(self.load_matching(spec).await?);
        Ok(Page {
            items,
            total_count,
            skip: spec.skip(),
            take: spec.take(),
        })
    }

    async fn count(&self, spec: &Specification<A>) -> DomainResult<usize> {
        Ok(self.load_matching(spec).await?.len())
    }

    async fn add(&self, aggregate: &A) -> DomainResult<()> {
        let outcome = self.insert(aggregate).await?;
        if !outcome.applied {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_type: A::AGGREGATE_TYPE,
                aggregate_id: aggregate.id(),
                expected: 0,
                actual: outcome.current_version.unwrap_or_default(),
            });
        }

        tracing::debug!(
            aggregate_type = A::AGGREGATE_TYPE,
            aggregate_id = %aggregate.id(),
            "Snapshot inserted"
        );
        Ok(())
    }

    async fn update(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        self.compare_and_swap(aggregate, expected_version).await
    }

    async fn delete(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        if !aggregate.is_deleted() {
            return Err(DomainError::invalid_operation(format!(
                "{} {} must be marked deleted before it is persisted as deleted",
                A::AGGREGATE_TYPE,
                aggregate.id()
            )));
        }
        self.compare_and_swap(aggregate, expected_version).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Statements against a live cluster are exercised by running the binary
// against ScyllaDB; here we cover the encoding and outcome mapping.
//
// ============================================================================
