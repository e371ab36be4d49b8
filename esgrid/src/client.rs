//! Client for a single Elasticsearch type/table endpoint
//!
//! For ES running on `http://localhost:9200` with index `twitter` and type
//! `tweet`, the endpoint is `http://localhost:9200/twitter/tweet`.

use crate::config::{EsOptions, ResponseFormat};
use crate::error::EsGridError;
use crate::query::{QueryDescription, QueryTranslator};
use crate::response::{record_id, Record};
use crate::transport::{HttpRequest, Transport};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

/// Wrapper around one ES type/table URL
///
/// Every operation issues exactly one request and returns the response body
/// interpreted according to [`EsOptions::response_format`].
pub struct EsTable {
    endpoint: String,
    options: EsOptions,
    transport: Arc<dyn Transport>,
}

impl EsTable {
    pub fn new(endpoint: &str, options: EsOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            options,
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &EsOptions {
        &self.options
    }

    /// GET `{endpoint}/_mapping`, always parsed as JSON
    pub async fn fetch_mapping(&self) -> Result<Value, EsGridError> {
        let url = format!("{}/_mapping", self.endpoint);
        self.execute_json(Method::GET, url, None).await
    }

    /// GET `{endpoint}/{id}`
    pub async fn get(&self, id: &str) -> Result<Value, EsGridError> {
        let url = self.document_url(id)?;
        self.execute(Method::GET, url, None).await
    }

    /// GET `{endpoint}/{id}`, always parsed as JSON
    pub async fn get_document(&self, id: &str) -> Result<Value, EsGridError> {
        let url = self.document_url(id)?;
        self.execute_json(Method::GET, url, None).await
    }

    /// Create or replace a document
    ///
    /// A document carrying an `id` is PUT to `{endpoint}/{id}`; one without is
    /// POSTed to `{endpoint}` and ES assigns the id.
    pub async fn upsert(&self, document: &Record) -> Result<Value, EsGridError> {
        let body = serde_json::to_string(document)?;
        match record_id(document) {
            Some(id) => {
                let url = self.document_url(&id)?;
                self.execute(Method::PUT, url, Some(body)).await
            }
            None => {
                self.execute(Method::POST, self.endpoint.clone(), Some(body))
                    .await
            }
        }
    }

    /// POST `{endpoint}/{id}/_update` with `{"doc": document}`
    pub async fn partial_update(&self, document: &Record, id: &str) -> Result<Value, EsGridError> {
        let url = format!("{}/_update", self.document_url(id)?);
        let body = serde_json::to_string(&json!({ "doc": document }))?;
        self.execute(Method::POST, url, Some(body)).await
    }

    /// DELETE `{endpoint}/{id}`
    pub async fn remove(&self, id: &str) -> Result<Value, EsGridError> {
        let url = self.document_url(id)?;
        self.execute(Method::DELETE, url, None).await
    }

    /// POST `{endpoint}/_search` with the translated query, always parsed as JSON
    pub async fn search(&self, query: &QueryDescription) -> Result<Value, EsGridError> {
        let body = QueryTranslator::build_search_request(query)?;
        let url = format!("{}/_search", self.endpoint);
        let body = serde_json::to_string(&body)?;
        self.execute_json(Method::POST, url, Some(body)).await
    }

    fn document_url(&self, id: &str) -> Result<String, EsGridError> {
        if id.is_empty() {
            return Err(EsGridError::Validation(
                "document id must not be empty".to_string(),
            ));
        }
        Ok(format!("{}/{}", self.endpoint, encode_segment(id)))
    }

    /// Send and interpret the body per the configured response format
    async fn execute(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
    ) -> Result<Value, EsGridError> {
        let body = self.send(method, url, body).await?;
        match self.options.response_format {
            ResponseFormat::Json => parse_body(&body),
            ResponseFormat::Text => Ok(Value::String(body)),
        }
    }

    /// Send and parse the body as JSON whatever the response format
    async fn execute_json(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
    ) -> Result<Value, EsGridError> {
        let body = self.send(method, url, body).await?;
        parse_body(&body)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
    ) -> Result<String, EsGridError> {
        tracing::debug!("{} {}", method, url);

        let mut request = HttpRequest::new(method, url);
        for (name, value) in &self.options.headers {
            request = request.header(name.clone(), value.clone());
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", self.options.content_type.clone())
                .body(body);
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::warn!(
                "Elasticsearch request to {} failed ({}): {}",
                self.endpoint,
                response.status,
                response.body
            );
            return Err(EsGridError::Transport {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}

fn parse_body(body: &str) -> Result<Value, EsGridError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Percent-encode a document id so it stays a single path segment
fn encode_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
