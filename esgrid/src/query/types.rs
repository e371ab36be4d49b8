//! Grid-side query description types
//!
//! These are the shapes a data grid hands to the adapter: a free-text term,
//! an optional id list, filters, sort specs, paging and anything else the
//! caller wants forwarded to `_search` untouched.

use crate::error::EsGridError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter kinds the translator understands
pub const FILTER_TYPES: &[&str] = &[
    "term",
    "terms",
    "geo_distance",
    "range",
    "type",
    "exists",
    "missing",
];

/// A generic query coming from the grid
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QueryDescription {
    /// Free-text term, sent as a `query_string` query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Explicit document ids to fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,

    /// Maximum number of results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Starting offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,

    /// Everything else, forwarded verbatim into the search body
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw grid query, rejecting filters of unknown kind
    pub fn from_value(value: Value) -> Result<Self, EsGridError> {
        if let Some(filters) = value.get("filters").and_then(Value::as_array) {
            for filter in filters {
                check_filter_type(filter)?;
            }
        }
        serde_json::from_value(value)
            .map_err(|e| EsGridError::Validation(format!("malformed query description: {}", e)))
    }

    pub fn with_term(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_ids<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.get_or_insert_with(Vec::new).push(sort);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// The free-text term, if it is worth sending (empty strings are not)
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}

/// A boolean predicate narrowing the result set
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Filter {
    #[serde(flatten)]
    pub kind: FilterKind,

    /// Invert the predicate
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not: bool,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self { kind, not: false }
    }

    pub fn negated(kind: FilterKind) -> Self {
        Self { kind, not: true }
    }

    /// Parse a single raw filter, failing loudly on an unknown `type`
    pub fn from_value(value: Value) -> Result<Self, EsGridError> {
        check_filter_type(&value)?;
        serde_json::from_value(value)
            .map_err(|e| EsGridError::Validation(format!("malformed filter: {}", e)))
    }

    pub fn term(field: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::new(FilterKind::Term {
            field: field.into(),
            term: term.into(),
        })
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::new(FilterKind::Exists {
            field: field.into(),
        })
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(FilterKind::Missing {
            field: field.into(),
        })
    }

    pub fn range(field: impl Into<String>, from: Option<Value>, to: Option<Value>) -> Self {
        Self::new(FilterKind::Range {
            field: field.into(),
            from,
            to,
            include_lower: None,
            include_upper: None,
        })
    }

    /// Name of the filter kind as it appears on the wire
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Filter variants, tagged by `type`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    Term {
        field: String,
        term: Value,
    },

    Terms {
        field: String,
        terms: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution: Option<Value>,
    },

    GeoDistance {
        field: String,
        point: Value,
        distance: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },

    /// Bounds and flags are kept whenever the key is present, `null` included
    Range {
        field: String,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        from: Option<Value>,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        to: Option<Value>,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        include_lower: Option<Value>,
        #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
        include_upper: Option<Value>,
    },

    Type {
        value: String,
    },

    Exists {
        field: String,
    },

    Missing {
        field: String,
    },
}

impl FilterKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Term { .. } => "term",
            Self::Terms { .. } => "terms",
            Self::GeoDistance { .. } => "geo_distance",
            Self::Range { .. } => "range",
            Self::Type { .. } => "type",
            Self::Exists { .. } => "exists",
            Self::Missing { .. } => "missing",
        }
    }

    /// Field the filter applies to; `type` filters have none
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term { field, .. }
            | Self::Terms { field, .. }
            | Self::GeoDistance { field, .. }
            | Self::Range { field, .. }
            | Self::Exists { field }
            | Self::Missing { field } => Some(field),
            Self::Type { .. } => None,
        }
    }
}

/// A sort instruction: a field plus whatever options ES should receive
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SortSpec {
    pub field: String,

    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SortSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            options: Map::new(),
        }
    }

    pub fn with_order(self, order: impl Into<String>) -> Self {
        self.with_option("order", order.into())
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// `Some` for any present key, so an explicit `null` is not lost
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn check_filter_type(filter: &Value) -> Result<(), EsGridError> {
    match filter.get("type") {
        Some(Value::String(kind)) if FILTER_TYPES.contains(&kind.as_str()) => Ok(()),
        Some(Value::String(kind)) => Err(EsGridError::Validation(format!(
            "unrecognized filter type '{}'",
            kind
        ))),
        Some(other) => Err(EsGridError::Validation(format!(
            "filter type must be a string, got {}",
            other
        ))),
        None => Err(EsGridError::Validation(
            "filter is missing its 'type'".to_string(),
        )),
    }
}
