//! Elasticsearch backend for tabular data grids
//!
//! This crate lets a data grid read and write an Elasticsearch type/table
//! endpoint. Grid queries (free text, id lists, filters, sort, paging) are
//! translated into Query DSL, and search hits come back as flat records that
//! always carry an `id`.
//!
//! # Layers
//!
//! - [`query`] / [`response`] / [`schema`] - pure translation in both directions
//! - [`client::EsTable`] - one request per operation against a type/table URL
//! - [`backend::ElasticsearchBackend`] - fetch schema, save changes, update
//!   one record, run a query
//!
//! # Filters
//!
//! Supported filter kinds:
//! - `term` / `terms`
//! - `range`
//! - `geo_distance`
//! - `type`
//! - `exists` / `missing`
//!
//! Any of them can be negated with `"not": true`.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod schema;
pub mod transport;

pub use backend::{ChangeSet, Dataset, ElasticsearchBackend};
pub use client::EsTable;
pub use config::{Config, EsOptions, ResponseFormat};
pub use error::{ErrorKind, EsGridError, GridError};
pub use query::{Filter, FilterKind, QueryDescription, QueryTranslator, SortSpec};
pub use response::{Record, ResponseMapper, SearchResult};
pub use schema::{FieldDescriptor, Schema};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, EsGridError>;
