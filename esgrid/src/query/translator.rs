//! Translation from grid query descriptions to Elasticsearch Query DSL

use crate::error::EsGridError;
use crate::query::dsl::{DslFilter, DslQuery, FieldFilter, RangeBounds, TypeFilter};
use crate::query::types::{Filter, FilterKind, QueryDescription, SortSpec};
use serde_json::{Map, Value};

/// Translates grid queries into ES search bodies
pub struct QueryTranslator;

impl QueryTranslator {
    /// Build the `query` clause for a grid query
    ///
    /// The base clause is `query_string` when a term is given, `ids` when an
    /// id list is given, `match_all` otherwise. With filters the base clause
    /// is wrapped in `filtered` + `and`, and only kept as the inner query when
    /// a term or id list was supplied. Without filters it is wrapped in
    /// `constant_score`.
    pub fn normalize_query(query: &QueryDescription) -> Result<DslQuery, EsGridError> {
        let explicit = if let Some(term) = query.term() {
            Some(DslQuery::query_string(term))
        } else {
            query.ids.as_ref().map(|ids| DslQuery::ids(ids.clone()))
        };

        if query.filters.is_empty() {
            let base = explicit.unwrap_or_else(DslQuery::match_all);
            return Ok(DslQuery::constant_score(base));
        }

        let filters = query
            .filters
            .iter()
            .map(Self::convert_filter)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DslQuery::filtered(filters, explicit))
    }

    /// Convert sort specs into ES sort entries: `{field: {options...}}`
    pub fn normalize_sort(sort: &[SortSpec]) -> Vec<Value> {
        sort.iter()
            .map(|spec| {
                let mut entry = Map::new();
                entry.insert(spec.field.clone(), Value::Object(spec.options.clone()));
                Value::Object(entry)
            })
            .collect()
    }

    /// Convert a single grid filter into an ES filter clause
    pub fn convert_filter(filter: &Filter) -> Result<DslFilter, EsGridError> {
        if let Some(field) = filter.kind.field() {
            if field.is_empty() {
                return Err(EsGridError::Validation(format!(
                    "{} filter requires a field name",
                    filter.type_name()
                )));
            }
        }

        let clause = match &filter.kind {
            FilterKind::Term { field, term } => DslFilter::Term(single(field, term.clone())),

            FilterKind::Terms {
                field,
                terms,
                execution,
            } => {
                let mut body = single(field, Value::Array(terms.clone()));
                if let Some(execution) = execution {
                    body.insert("execution".to_string(), execution.clone());
                }
                DslFilter::Terms(body)
            }

            FilterKind::GeoDistance {
                field,
                point,
                distance,
                unit,
            } => {
                let mut body = single(field, point.clone());
                body.insert("distance".to_string(), distance.clone());
                if let Some(unit) = unit {
                    body.insert("unit".to_string(), Value::String(unit.clone()));
                }
                DslFilter::GeoDistance(body)
            }

            FilterKind::Range {
                field,
                from,
                to,
                include_lower,
                include_upper,
            } => {
                let bounds = RangeBounds {
                    from: from.clone(),
                    to: to.clone(),
                    include_lower: include_lower.clone(),
                    include_upper: include_upper.clone(),
                };
                DslFilter::Range(single(field, serde_json::to_value(bounds)?))
            }

            FilterKind::Type { value } => DslFilter::Type(TypeFilter {
                value: value.clone(),
            }),

            FilterKind::Exists { field } => DslFilter::Exists(FieldFilter {
                field: field.clone(),
            }),

            FilterKind::Missing { field } => DslFilter::Missing(FieldFilter {
                field: field.clone(),
            }),
        };

        Ok(if filter.not { clause.negate() } else { clause })
    }

    /// Build the full `_search` body
    ///
    /// Pass-through fields are kept, `q` and `filters` are consumed by the
    /// query clause, sort specs are normalized, and an id list replaces the
    /// requested page size with its own length.
    pub fn build_search_request(query: &QueryDescription) -> Result<Map<String, Value>, EsGridError> {
        let mut body = query.extra.clone();

        if let Some(size) = query.size {
            body.insert("size".to_string(), Value::from(size));
        }
        if let Some(from) = query.from {
            body.insert("from".to_string(), Value::from(from));
        }

        body.insert(
            "query".to_string(),
            serde_json::to_value(Self::normalize_query(query)?)?,
        );

        match &query.sort {
            Some(sort) if !sort.is_empty() => {
                body.insert("sort".to_string(), Value::Array(Self::normalize_sort(sort)));
            }
            Some(_) => {
                body.insert("sort".to_string(), Value::Array(Vec::new()));
            }
            None => {}
        }

        if let Some(ids) = &query.ids {
            body.insert("size".to_string(), Value::from(ids.len()));
        }

        Ok(body)
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}
