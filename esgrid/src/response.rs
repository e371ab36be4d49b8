//! Response mappers from Elasticsearch format to grid records

use crate::error::EsGridError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field every grid record carries
pub const ID_FIELD: &str = "id";

/// A flat grid record
pub type Record = Map<String, Value>;

/// ES search response, as much of it as the grid needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsSearchResponse {
    pub hits: HitsResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsResponse {
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Hit count: a bare number before ES 7, an object after
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Record>,
}

/// Normalized search result handed to the grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

/// Response mapper
pub struct ResponseMapper;

impl ResponseMapper {
    /// Convert a raw `_search` response body into a [`SearchResult`]
    pub fn normalize_search_response(raw: Value) -> Result<SearchResult, EsGridError> {
        if raw.get("hits").is_none() {
            return Err(EsGridError::Validation(
                "malformed search response: no 'hits' section".to_string(),
            ));
        }
        let response: EsSearchResponse = serde_json::from_value(raw)
            .map_err(|e| EsGridError::Validation(format!("malformed search response: {}", e)))?;

        Ok(Self::map_search_response(response))
    }

    pub fn map_search_response(response: EsSearchResponse) -> SearchResult {
        SearchResult {
            total: response.hits.total.value(),
            hits: response.hits.hits.into_iter().map(Self::map_hit).collect(),
            facets: response.facets,
            aggregations: response.aggregations,
        }
    }

    /// Flatten a hit to its source, filling in the id from `_id` if needed
    pub fn map_hit(hit: Hit) -> Record {
        let mut record = hit.source.unwrap_or_default();
        Self::ensure_id(&mut record, hit.id);
        record
    }

    /// Flatten a single-document GET response the same way as a search hit
    pub fn normalize_document(raw: Value) -> Result<Record, EsGridError> {
        let hit: Hit = serde_json::from_value(raw)
            .map_err(|e| EsGridError::Validation(format!("malformed document response: {}", e)))?;
        Ok(Self::map_hit(hit))
    }

    fn ensure_id(record: &mut Record, engine_id: Option<Value>) {
        if record.contains_key(ID_FIELD) {
            return;
        }
        match engine_id {
            Some(Value::Null) | None => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(id) => {
                record.insert(ID_FIELD.to_string(), id);
            }
        }
    }
}

/// Id carried by a record, rendered for use in a URL path
///
/// Strings and numbers count; null, empty strings and anything else do not.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
