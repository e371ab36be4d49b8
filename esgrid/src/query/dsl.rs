//! Elasticsearch Query DSL output types
//!
//! Only the clauses the translator emits are modelled here. They target the
//! classic filtered-query dialect (`filtered`, `and`, `not`, `missing`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level query clause
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DslQuery {
    /// Match all documents
    MatchAll(MatchAllQuery),

    /// Lucene query string
    QueryString(QueryStringQuery),

    /// Fetch by document id
    Ids(IdsQuery),

    /// Query narrowed by a filter
    Filtered(FilteredQuery),

    /// Unscored wrapper
    ConstantScore(ConstantScoreQuery),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatchAllQuery {}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryStringQuery {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdsQuery {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilteredQuery {
    pub filter: AndFilter,

    /// Inner query; absent means "everything the filter lets through"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Box<DslQuery>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AndFilter {
    pub and: Vec<DslFilter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConstantScoreQuery {
    pub query: Box<DslQuery>,
}

/// Filter clause
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DslFilter {
    /// `{field: value}`
    Term(Map<String, Value>),

    /// `{field: [values], execution?}`
    Terms(Map<String, Value>),

    /// `{field: point, distance, unit?}`
    GeoDistance(Map<String, Value>),

    /// `{field: bounds}`
    Range(Map<String, Value>),

    Type(TypeFilter),

    Exists(FieldFilter),

    Missing(FieldFilter),

    Not(Box<DslFilter>),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TypeFilter {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldFilter {
    pub field: String,
}

/// Bounds of a range filter; only keys that were supplied are emitted
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_lower: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_upper: Option<Value>,
}

impl DslQuery {
    pub fn match_all() -> Self {
        Self::MatchAll(MatchAllQuery {})
    }

    pub fn query_string(query: impl Into<String>) -> Self {
        Self::QueryString(QueryStringQuery {
            query: query.into(),
        })
    }

    pub fn ids(values: Vec<Value>) -> Self {
        Self::Ids(IdsQuery { values })
    }

    pub fn constant_score(inner: DslQuery) -> Self {
        Self::ConstantScore(ConstantScoreQuery {
            query: Box::new(inner),
        })
    }

    pub fn filtered(filters: Vec<DslFilter>, inner: Option<DslQuery>) -> Self {
        Self::Filtered(FilteredQuery {
            filter: AndFilter { and: filters },
            query: inner.map(Box::new),
        })
    }
}

impl DslFilter {
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}
