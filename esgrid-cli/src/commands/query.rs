//! Query command implementation.

use anyhow::{Context, Result};
use clap::Args;
use esgrid::backend::{Dataset, ElasticsearchBackend};
use esgrid::query::{Filter, QueryDescription, SortSpec};
use serde_json::Value;

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Free-text query string
    #[arg(long)]
    pub q: Option<String>,

    /// Document ids to fetch (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,

    /// Filter as JSON, e.g. '{"type":"term","field":"user","term":"kimchy"}' (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Sort as field or field:order (repeatable)
    #[arg(long)]
    pub sort: Vec<String>,

    /// Maximum number of results
    #[arg(long)]
    pub size: Option<u64>,

    /// Starting offset
    #[arg(long)]
    pub from: Option<u64>,

    /// Base query description as JSON; flags are applied on top
    #[arg(long)]
    pub body: Option<String>,
}

/// Turn command-line arguments into a grid query
pub fn build_query(args: &QueryArgs) -> Result<QueryDescription> {
    let mut query = match &args.body {
        Some(body) => {
            let raw: Value =
                serde_json::from_str(body).with_context(|| format!("Invalid --body JSON: {}", body))?;
            QueryDescription::from_value(raw)?
        }
        None => QueryDescription::new(),
    };

    if let Some(q) = &args.q {
        query = query.with_term(q.clone());
    }
    if let Some(ids) = &args.ids {
        query = query.with_ids(ids.iter().cloned());
    }
    for raw in &args.filters {
        let value: Value =
            serde_json::from_str(raw).with_context(|| format!("Invalid --filter JSON: {}", raw))?;
        query = query.with_filter(Filter::from_value(value)?);
    }
    for raw in &args.sort {
        query = query.with_sort(parse_sort(raw));
    }
    if let Some(size) = args.size {
        query = query.with_size(size);
    }
    if let Some(from) = args.from {
        query = query.with_from(from);
    }

    Ok(query)
}

fn parse_sort(raw: &str) -> SortSpec {
    match raw.split_once(':') {
        Some((field, order)) => SortSpec::new(field).with_order(order),
        None => SortSpec::new(raw),
    }
}

/// Run the query command.
pub async fn run_query(
    backend: &ElasticsearchBackend,
    dataset: &Dataset,
    args: &QueryArgs,
) -> Result<()> {
    let query = build_query(args)?;
    let result = backend.run_query(&query, dataset).await?;
    tracing::info!("{} hits, {} returned", result.total, result.hits.len());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
