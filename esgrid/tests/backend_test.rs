//! Backend tests against a recording in-memory transport.
//!
//! The transport answers from a queue of canned responses and keeps every
//! request it saw, so tests can assert exactly which calls reached the wire.

use async_trait::async_trait;
use esgrid::backend::{ChangeSet, Dataset, ElasticsearchBackend};
use esgrid::error::{ErrorKind, EsGridError};
use esgrid::query::{Filter, QueryDescription};
use esgrid::transport::{HttpRequest, HttpResponse, Transport};
use esgrid::{EsOptions, Record, ResponseFormat};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const URL: &str = "http://localhost:9200/twitter/tweet";

#[derive(Default)]
struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    fn answering(responses: Vec<(u16, Value)>) -> Arc<Self> {
        let queue = responses
            .into_iter()
            .map(|(status, body)| HttpResponse::new(status, body.to_string()))
            .collect();
        Arc::new(Self {
            responses: Mutex::new(queue),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, EsGridError> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(200, "{}")))
    }
}

fn backend(transport: Arc<RecordingTransport>) -> ElasticsearchBackend {
    ElasticsearchBackend::with_transport(EsOptions::default(), transport)
}

fn dataset() -> Dataset {
    Dataset::new(URL)
}

fn record(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn body_of(req: &HttpRequest) -> Value {
    serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// fetch_schema
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_schema() {
    let transport = RecordingTransport::answering(vec![(
        200,
        json!({"tweet": {"properties": {"text": {"type": "string"}}}}),
    )]);
    let schema = backend(transport.clone())
        .fetch_schema(&dataset())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({"fields": [{"id": "text", "type": "string"}]})
    );
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{}/_mapping", URL));
}

#[tokio::test]
async fn test_fetch_schema_empty_mapping() {
    let transport = RecordingTransport::answering(vec![(200, json!({}))]);
    let err = backend(transport).fetch_schema(&dataset()).await.unwrap_err();

    assert!(matches!(err, EsGridError::MissingMapping));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Elastic Search did not return a mapping");
}

#[tokio::test]
async fn test_fetch_schema_propagates_http_failure() {
    let transport = RecordingTransport::answering(vec![(404, json!({"error": "IndexMissing"}))]);
    let err = backend(transport).fetch_schema(&dataset()).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

// ---------------------------------------------------------------------------
// save_changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_save_single_create_issues_one_upsert() {
    let transport = RecordingTransport::answering(vec![(201, json!({"ok": true, "_id": "x1"}))]);
    let changes = ChangeSet {
        creates: vec![record(json!({"title": "a"}))],
        ..Default::default()
    };

    let response = backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .unwrap();
    assert_eq!(response["_id"], "x1");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, URL);
    assert_eq!(body_of(&requests[0]), json!({"title": "a"}));
}

#[tokio::test]
async fn test_save_single_update_upserts_by_id() {
    let transport = RecordingTransport::answering(vec![(200, json!({"ok": true}))]);
    let changes = ChangeSet {
        updates: vec![record(json!({"id": "9", "title": "b"}))],
        ..Default::default()
    };

    backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(requests[0].url, format!("{}/9", URL));
}

#[tokio::test]
async fn test_save_single_delete_removes_by_id() {
    let transport = RecordingTransport::answering(vec![(200, json!({"found": true}))]);
    let changes = ChangeSet {
        deletes: vec![record(json!({"id": 12, "title": "gone"}))],
        ..Default::default()
    };

    backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[0].url, format!("{}/12", URL));
}

#[tokio::test]
async fn test_save_rejects_two_changes_without_requests() {
    let transport = RecordingTransport::answering(vec![]);
    let changes = ChangeSet {
        creates: vec![record(json!({"title": "a"}))],
        updates: vec![record(json!({"id": "1", "title": "b"}))],
        ..Default::default()
    };

    let err = backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_save_rejects_two_creates_without_requests() {
    let transport = RecordingTransport::answering(vec![]);
    let changes = ChangeSet {
        creates: vec![record(json!({"title": "a"})), record(json!({"title": "b"}))],
        ..Default::default()
    };

    assert!(backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .is_err());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_save_delete_without_id() {
    let transport = RecordingTransport::answering(vec![]);
    let changes = ChangeSet {
        deletes: vec![record(json!({"title": "no id"}))],
        ..Default::default()
    };

    let err = backend(transport.clone())
        .save_changes(&changes, &dataset())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_save_nothing() {
    let transport = RecordingTransport::answering(vec![]);
    let response = backend(transport.clone())
        .save_changes(&ChangeSet::default(), &dataset())
        .await
        .unwrap();
    assert_eq!(response, Value::Null);
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// update_one / get_record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_one() {
    let transport = RecordingTransport::answering(vec![(200, json!({"ok": true}))]);
    backend(transport.clone())
        .update_one(&record(json!({"title": "patched"})), "5", &dataset())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, format!("{}/5/_update", URL));
    assert_eq!(body_of(&requests[0]), json!({"doc": {"title": "patched"}}));
}

#[tokio::test]
async fn test_get_record() {
    let transport = RecordingTransport::answering(vec![(
        200,
        json!({"_id": "1", "found": true, "_source": {"user": "kimchy"}}),
    )]);
    let rec = backend(transport).get_record("1", &dataset()).await.unwrap();
    assert_eq!(rec, record(json!({"user": "kimchy", "id": "1"})));
}

// ---------------------------------------------------------------------------
// run_query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_run_query_normalizes_hits() {
    let transport = RecordingTransport::answering(vec![(
        200,
        json!({
            "took": 2,
            "hits": {
                "total": 2,
                "hits": [
                    {"_id": "1", "_source": {"id": "1", "text": "first"}},
                    {"_id": "2", "_source": {"text": "second"}}
                ]
            },
            "facets": {"lang": {"terms": []}}
        }),
    )]);

    let query = QueryDescription::new()
        .with_term("text:*")
        .with_filter(Filter::exists("text"));
    let result = backend(transport.clone())
        .run_query(&query, &dataset())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.hits[1]["id"], "2");
    assert_eq!(result.facets, Some(json!({"lang": {"terms": []}})));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{}/_search", URL));
    assert_eq!(
        body_of(&requests[0])["query"],
        json!({"filtered": {
            "filter": {"and": [{"exists": {"field": "text"}}]},
            "query": {"query_string": {"query": "text:*"}}
        }})
    );
}

#[tokio::test]
async fn test_run_query_failure_is_titled() {
    let transport = RecordingTransport::answering(vec![(
        500,
        json!({"error": "SearchPhaseExecutionException"}),
    )]);

    let err = backend(transport)
        .run_query(&QueryDescription::new(), &dataset())
        .await
        .unwrap_err();

    assert_eq!(err.title.as_deref(), Some("Failed: 500 code"));
    assert_eq!(err.message, r#"{"error":"SearchPhaseExecutionException"}"#);
}

#[tokio::test]
async fn test_run_query_invalid_filter_sends_nothing() {
    let transport = RecordingTransport::answering(vec![]);
    let query = QueryDescription::new().with_filter(Filter::missing(""));

    let err = backend(transport.clone())
        .run_query(&query, &dataset())
        .await
        .unwrap_err();

    assert!(err.title.is_none());
    assert!(err.message.contains("missing filter requires a field name"));
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// response format
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_text_format_still_normalizes_schema_query_and_record() {
    let transport = RecordingTransport::answering(vec![
        (200, json!({"tweet": {"properties": {"text": {"type": "string"}}}})),
        (200, json!({"hits": {"total": 1, "hits": [{"_id": "1", "_source": {"text": "hi"}}]}})),
        (200, json!({"_id": "1", "found": true, "_source": {"text": "hi"}})),
        (200, json!({"ok": true})),
    ]);
    let options = EsOptions::default().with_response_format(ResponseFormat::Text);
    let backend = ElasticsearchBackend::with_transport(options, transport.clone());

    let schema = backend.fetch_schema(&dataset()).await.unwrap();
    assert_eq!(schema.fields[0].id, "text");

    let result = backend
        .run_query(&QueryDescription::new(), &dataset())
        .await
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.hits[0], record(json!({"text": "hi", "id": "1"})));

    let rec = backend.get_record("1", &dataset()).await.unwrap();
    assert_eq!(rec, record(json!({"text": "hi", "id": "1"})));

    // Raw-body operations still hand back the text
    let response = backend
        .update_one(&record(json!({"text": "bye"})), "1", &dataset())
        .await
        .unwrap();
    assert_eq!(response, Value::String(r#"{"ok":true}"#.to_string()));
    assert_eq!(transport.requests().len(), 4);
}
