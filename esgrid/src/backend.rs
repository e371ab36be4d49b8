//! Grid-facing Elasticsearch backend
//!
//! The four operations a data grid expects: fetch the schema, save a change
//! set, update one record, and run a query. Each call builds a fresh
//! [`EsTable`] for the dataset's URL.

use crate::client::EsTable;
use crate::config::EsOptions;
use crate::error::{EsGridError, GridError};
use crate::query::QueryDescription;
use crate::response::{record_id, Record, ResponseMapper, SearchResult};
use crate::schema::{normalize_mapping, Schema};
use crate::transport::{ReqwestTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Dataset descriptor; only the URL matters here
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dataset {
    pub url: String,
}

impl Dataset {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Pending record changes from the grid
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub creates: Vec<Record>,
    #[serde(default)]
    pub updates: Vec<Record>,
    #[serde(default)]
    pub deletes: Vec<Record>,
}

/// The single change a save call is allowed to carry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change<'a> {
    Create(&'a Record),
    Update(&'a Record),
    Delete(&'a Record),
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The one pending change, checked eagerly
    ///
    /// Creates win over updates, updates over deletes. More than one change in
    /// total is rejected.
    pub fn single_change(&self) -> Result<Option<Change<'_>>, EsGridError> {
        if self.len() > 1 {
            return Err(EsGridError::UnsupportedOperation(
                "Saving more than one item at a time not yet supported".to_string(),
            ));
        }
        Ok(self
            .creates
            .first()
            .map(Change::Create)
            .or_else(|| self.updates.first().map(Change::Update))
            .or_else(|| self.deletes.first().map(Change::Delete)))
    }
}

/// Elasticsearch backend for a data grid
#[derive(Clone)]
pub struct ElasticsearchBackend {
    options: EsOptions,
    transport: Arc<dyn Transport>,
}

impl ElasticsearchBackend {
    /// Backend over `reqwest`, honoring the timeout in `options`
    pub fn new(options: EsOptions) -> Result<Self, EsGridError> {
        let transport = ReqwestTransport::from_options(&options)?;
        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    pub fn with_transport(options: EsOptions, transport: Arc<dyn Transport>) -> Self {
        Self { options, transport }
    }

    pub fn options(&self) -> &EsOptions {
        &self.options
    }

    fn table(&self, dataset: &Dataset) -> EsTable {
        EsTable::new(&dataset.url, self.options.clone(), self.transport.clone())
    }

    /// Fetch the mapping and turn it into grid fields
    pub async fn fetch_schema(&self, dataset: &Dataset) -> Result<Schema, EsGridError> {
        let mapping = self.table(dataset).fetch_mapping().await?;
        normalize_mapping(&mapping)
    }

    /// Persist a change set holding at most one change
    ///
    /// An empty change set is a no-op and returns `null`.
    pub async fn save_changes(
        &self,
        changes: &ChangeSet,
        dataset: &Dataset,
    ) -> Result<Value, EsGridError> {
        let change = match changes.single_change() {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!("Rejected save of {} changes: {}", changes.len(), e);
                return Err(e);
            }
        };

        let es = self.table(dataset);
        match change {
            Some(Change::Create(doc)) | Some(Change::Update(doc)) => es.upsert(doc).await,
            Some(Change::Delete(doc)) => {
                let id = record_id(doc).ok_or_else(|| {
                    EsGridError::Validation("record to delete has no id".to_string())
                })?;
                es.remove(&id).await
            }
            None => Ok(Value::Null),
        }
    }

    /// Partially update one document
    pub async fn update_one(
        &self,
        document: &Record,
        id: &str,
        dataset: &Dataset,
    ) -> Result<Value, EsGridError> {
        self.table(dataset).partial_update(document, id).await
    }

    /// Run a grid query and normalize the hits into records
    pub async fn run_query(
        &self,
        query: &QueryDescription,
        dataset: &Dataset,
    ) -> Result<SearchResult, GridError> {
        let raw = self.table(dataset).search(query).await?;
        Ok(ResponseMapper::normalize_search_response(raw)?)
    }

    /// Fetch one document as a grid record
    pub async fn get_record(&self, id: &str, dataset: &Dataset) -> Result<Record, EsGridError> {
        let raw = self.table(dataset).get_document(id).await?;
        ResponseMapper::normalize_document(raw)
    }
}
