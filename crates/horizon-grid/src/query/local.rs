//! In-memory data source.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use horizon_grid_core::logging::targets;
use parking_lot::RwLock;

use crate::error::QueryError;
use crate::settings::NewRowPosition;
use crate::value::{Record, Value};

use super::{DataSource, Query, QueryResult};

/// A data source over a shared record array.
///
/// Queries filter, then sort stably, then page, so records that tie on every
/// sort key keep their storage order. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct LocalDataSource {
    records: Arc<RwLock<Vec<Record>>>,
}

impl LocalDataSource {
    /// A source over `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// A copy of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Run a query synchronously.
    pub fn run(&self, query: &Query) -> QueryResult {
        let records = self.records.read();

        let mut matching: Vec<usize> = (0..records.len())
            .filter(|&row| query.matches(&records[row]))
            .collect();
        if !query.sort.is_empty() {
            matching.sort_by(|&a, &b| query.compare(&records[a], &records[b]));
        }

        let count = matching.len();
        let window = matching.into_iter().skip(query.skip);
        let result: Vec<Record> = match query.take {
            Some(take) => window.take(take).map(|row| records[row].clone()).collect(),
            None => window.map(|row| records[row].clone()).collect(),
        };

        tracing::debug!(
            target: targets::QUERY,
            skip = query.skip,
            take = ?query.take,
            count,
            returned = result.len(),
            "local query executed"
        );
        QueryResult { result, count }
    }

    fn position_of(records: &[Record], key_field: &str, key: &Value) -> Option<usize> {
        records
            .iter()
            .position(|r| r.get_path(key_field).is_some_and(|v| v.loosely_equals(key)))
    }
}

impl DataSource for LocalDataSource {
    fn execute_query(&self, query: Query) -> BoxFuture<'static, Result<QueryResult, QueryError>> {
        future::ready(Ok(self.run(&query))).boxed()
    }

    fn insert(
        &self,
        key_field: &str,
        record: Record,
        position: NewRowPosition,
    ) -> BoxFuture<'static, Result<(), QueryError>> {
        let mut records = self.records.write();
        let key = record.get_path(key_field).cloned().unwrap_or_default();
        if !key.is_null() && Self::position_of(&records, key_field, &key).is_some() {
            return future::ready(Err(QueryError::DuplicateKey(key.to_string()))).boxed();
        }
        match position {
            NewRowPosition::Top => records.insert(0, record),
            NewRowPosition::Bottom => records.push(record),
        }
        tracing::debug!(target: targets::QUERY, %key, "record inserted");
        future::ready(Ok(())).boxed()
    }

    fn update(&self, key_field: &str, record: Record) -> BoxFuture<'static, Result<(), QueryError>> {
        let mut records = self.records.write();
        let key = record.get_path(key_field).cloned().unwrap_or_default();
        let result = match Self::position_of(&records, key_field, &key) {
            Some(row) => {
                records[row].merge(&record);
                tracing::debug!(target: targets::QUERY, %key, "record updated");
                Ok(())
            }
            None => Err(QueryError::KeyNotFound(key.to_string())),
        };
        future::ready(result).boxed()
    }

    fn remove(&self, key_field: &str, key: Value) -> BoxFuture<'static, Result<(), QueryError>> {
        let mut records = self.records.write();
        let result = match Self::position_of(&records, key_field, &key) {
            Some(row) => {
                records.remove(row);
                tracing::debug!(target: targets::QUERY, %key, "record removed");
                Ok(())
            }
            None => Err(QueryError::KeyNotFound(key.to_string())),
        };
        future::ready(result).boxed()
    }
}
