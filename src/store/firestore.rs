//! Cloud Firestore client over the v1 REST API.
//!
//! Covers the two calls the importer needs:
//! - list every document in the collection (following page tokens)
//! - commit a batch of creates in one atomic request

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{auto_id, RecordStore};
use crate::config::StoreConfig;
use crate::error::{SheetError, SheetResult};
use crate::types::{CellValue, Record, StoredRecord};

/// Largest integer Firestore round-trips exactly through a double
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Firestore collection client (async)
#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    /// `{base}/v1/projects/{project}/databases/{database}/documents`
    documents_url: String,
    /// `projects/{project}/databases/{database}/documents`
    documents_path: String,
    collection: String,
    api_key: Option<String>,
    page_size: u32,
}

/// One page of `documents.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    pub fn new(config: &StoreConfig) -> SheetResult<Self> {
        let project = config.project_id.as_deref().ok_or_else(|| {
            SheetError::Config("Firestore backend requires a project_id".to_string())
        })?;

        let mut builder =
            reqwest::Client::builder().user_agent(format!("sheetstore/{}", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| SheetError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let documents_path = format!(
            "projects/{}/databases/{}/documents",
            project, config.database
        );

        Ok(Self {
            http,
            documents_url: format!(
                "{}/v1/{}",
                config.base_url.trim_end_matches('/'),
                documents_path
            ),
            documents_path,
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    fn commit_url(&self) -> String {
        format!("{}:commit", self.documents_url)
    }

    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path, self.collection, id)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> SheetResult<ListResponse> {
        let mut request = self
            .http
            .get(self.collection_url())
            .query(&[("pageSize", self.page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let resp = check_status(self.with_key(request).send().await?).await?;
        resp.json::<ListResponse>()
            .await
            .map_err(|e| SheetError::Response(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn fetch_all(&self) -> SheetResult<Vec<StoredRecord>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            debug!(documents = page.documents.len(), "Fetched Firestore page");
            records.extend(page.documents.into_iter().map(decode_document));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(collection = %self.collection, count = records.len(), "Fetched collection");
        Ok(records)
    }

    async fn batch_create(&self, records: &[Record]) -> SheetResult<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = records.iter().map(|_| auto_id()).collect();
        let writes: Vec<Value> = records
            .iter()
            .zip(&ids)
            .map(|(record, id)| {
                json!({
                    "update": {
                        "name": self.document_name(id),
                        "fields": encode_fields(record),
                    },
                    "currentDocument": { "exists": false },
                })
            })
            .collect();

        let request = self
            .http
            .post(self.commit_url())
            .json(&json!({ "writes": writes }));
        let result = check_status(self.with_key(request).send().await?).await;
        if let Err(e) = &result {
            warn!(collection = %self.collection, count = records.len(), "Batch commit failed: {}", e);
        }
        result?;

        info!(collection = %self.collection, count = records.len(), "Committed batch");
        Ok(ids)
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

/// Turn non-2xx responses into `SheetError::Http`, keeping Firestore's message
async fn check_status(resp: reqwest::Response) -> SheetResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(body);

    Err(SheetError::Http {
        status: status.as_u16(),
        message,
    })
}

fn encode_fields(record: &Record) -> Value {
    json!({
        "name": encode_value(&record.name),
        "age": encode_value(&record.age),
    })
}

/// Encode a cell as a Firestore `Value`
pub(crate) fn encode_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Text(s) => json!({ "stringValue": s }),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
            // Int64 values travel as strings
            json!({ "integerValue": (*n as i64).to_string() })
        }
        CellValue::Number(n) => json!({ "doubleValue": n }),
        CellValue::Empty => json!({ "nullValue": null }),
    }
}

/// Decode a Firestore `Value`; missing or unsupported kinds become `Empty`
pub(crate) fn decode_value(value: Option<&Value>) -> CellValue {
    let Some(obj) = value.and_then(Value::as_object) else {
        return CellValue::Empty;
    };

    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return CellValue::Text(s.to_string());
    }
    if let Some(i) = obj.get("integerValue") {
        let parsed = match i {
            Value::String(s) => s.parse::<i64>().ok(),
            other => other.as_i64(),
        };
        if let Some(i) = parsed {
            return CellValue::Number(i as f64);
        }
    }
    if let Some(d) = obj.get("doubleValue") {
        // NaN and Infinity arrive as strings
        if let Some(n) = d.as_f64() {
            return CellValue::Number(n);
        }
    }
    if let Some(b) = obj.get("booleanValue").and_then(Value::as_bool) {
        return CellValue::Number(if b { 1.0 } else { 0.0 });
    }
    CellValue::Empty
}

fn decode_document(doc: Document) -> StoredRecord {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    StoredRecord {
        id,
        record: Record {
            name: decode_value(doc.fields.get("name")),
            age: decode_value(doc.fields.get("age")),
        },
    }
}
