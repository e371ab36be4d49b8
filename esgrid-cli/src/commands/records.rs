//! Schema and record commands.

use super::{parse_record, print_value};
use anyhow::Result;
use esgrid::backend::{ChangeSet, Dataset, ElasticsearchBackend};
use esgrid::Record;
use serde_json::Value;

pub async fn run_schema(backend: &ElasticsearchBackend, dataset: &Dataset) -> Result<()> {
    let schema = backend.fetch_schema(dataset).await?;
    tracing::info!("{} fields", schema.fields.len());
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

pub async fn run_get(backend: &ElasticsearchBackend, dataset: &Dataset, id: &str) -> Result<()> {
    let record = backend.get_record(id, dataset).await?;
    print_value(&Value::Object(record))
}

pub async fn run_create(
    backend: &ElasticsearchBackend,
    dataset: &Dataset,
    raw: &str,
) -> Result<()> {
    let changes = ChangeSet {
        creates: vec![parse_record(raw)?],
        ..Default::default()
    };
    let response = backend.save_changes(&changes, dataset).await?;
    print_value(&response)
}

/// Build the change set from raw JSON arguments and save it.
pub async fn run_save(
    backend: &ElasticsearchBackend,
    dataset: &Dataset,
    creates: &[String],
    updates: &[String],
    deletes: &[String],
) -> Result<()> {
    let changes = ChangeSet {
        creates: parse_all(creates)?,
        updates: parse_all(updates)?,
        deletes: parse_all(deletes)?,
    };
    let response = backend.save_changes(&changes, dataset).await?;
    print_value(&response)
}

pub async fn run_update(
    backend: &ElasticsearchBackend,
    dataset: &Dataset,
    id: &str,
    raw: &str,
) -> Result<()> {
    let patch = parse_record(raw)?;
    let response = backend.update_one(&patch, id, dataset).await?;
    print_value(&response)
}

pub async fn run_delete(backend: &ElasticsearchBackend, dataset: &Dataset, id: &str) -> Result<()> {
    let mut record = Record::new();
    record.insert("id".to_string(), Value::String(id.to_string()));
    let changes = ChangeSet {
        deletes: vec![record],
        ..Default::default()
    };
    let response = backend.save_changes(&changes, dataset).await?;
    print_value(&response)
}

fn parse_all(raw: &[String]) -> Result<Vec<Record>> {
    raw.iter().map(|r| parse_record(r)).collect()
}
