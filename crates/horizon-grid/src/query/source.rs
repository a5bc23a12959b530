//! The asynchronous data-source contract.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::QueryError;
use crate::settings::NewRowPosition;
use crate::value::{Record, Value};

use super::{Query, QueryResult};

/// Executes queries and record mutations for a grid.
///
/// Every call returns an owned future so the grid can hold no lock while a
/// request is in flight. Implementations decide how sort, filter and paging
/// run; the grid only relies on `count` being the number of matching records
/// before paging.
pub trait DataSource: Send + Sync {
    /// Run a query.
    fn execute_query(&self, query: Query) -> BoxFuture<'static, Result<QueryResult, QueryError>>;

    /// Insert a new record. `key_field` names the primary-key field.
    fn insert(
        &self,
        key_field: &str,
        record: Record,
        position: NewRowPosition,
    ) -> BoxFuture<'static, Result<(), QueryError>>;

    /// Merge `record` into the stored record with the same key.
    fn update(&self, key_field: &str, record: Record) -> BoxFuture<'static, Result<(), QueryError>>;

    /// Remove the record whose key equals `key`.
    fn remove(&self, key_field: &str, key: Value) -> BoxFuture<'static, Result<(), QueryError>>;
}

impl<D: DataSource + ?Sized> DataSource for Arc<D> {
    fn execute_query(&self, query: Query) -> BoxFuture<'static, Result<QueryResult, QueryError>> {
        (**self).execute_query(query)
    }

    fn insert(
        &self,
        key_field: &str,
        record: Record,
        position: NewRowPosition,
    ) -> BoxFuture<'static, Result<(), QueryError>> {
        (**self).insert(key_field, record, position)
    }

    fn update(&self, key_field: &str, record: Record) -> BoxFuture<'static, Result<(), QueryError>> {
        (**self).update(key_field, record)
    }

    fn remove(&self, key_field: &str, key: Value) -> BoxFuture<'static, Result<(), QueryError>> {
        (**self).remove(key_field, key)
    }
}
