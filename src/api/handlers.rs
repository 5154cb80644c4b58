//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::server::AppState;
use crate::controller::{DialogState, ImportController};
use crate::error::SheetError;
use crate::types::{CellValue, StoredRecord};

/// MIME type of generated spreadsheets
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a pipeline error
pub fn status_for(error: &SheetError) -> StatusCode {
    match error {
        SheetError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SheetError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SheetError::Network(_) | SheetError::Http { .. } | SheetError::Response(_) => {
            StatusCode::BAD_GATEWAY
        }
        SheetError::Io(_) | SheetError::Config(_) | SheetError::Export(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: SheetError) -> Response {
    let status = status_for(&error);
    (status, Json(ApiResponse::<()>::err(error.to_string()))).into_response()
}

fn ok_response<T: Serialize>(data: T) -> Response {
    Json(ApiResponse::ok(data)).into_response()
}

/// Root endpoint response
#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize, Deserialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "SheetStore API Server".to_string(),
        version: state.version.clone(),
        description: "Import spreadsheets into a document store and export them back".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("GET", "/api/v1/import", "Current import dialog state and preview"),
            endpoint("POST", "/api/v1/import/open", "Open the import dialog"),
            endpoint("POST", "/api/v1/import/file", "Upload a spreadsheet (raw body) for preview"),
            endpoint("POST", "/api/v1/import/cancel", "Close the dialog, discarding the preview"),
            endpoint("POST", "/api/v1/import/submit", "Write the previewed rows to the store"),
            endpoint("GET", "/api/v1/users", "List stored records"),
            endpoint("GET", "/api/v1/export", "Download stored records as .xlsx"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub backend: String,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        backend: state.backend.to_string(),
    }))
}

/// One preview row, numbered from 1
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PreviewRow {
    pub number: usize,
    pub cells: Vec<CellValue>,
}

/// Import dialog snapshot
#[derive(Serialize, Deserialize, Debug)]
pub struct DialogResponse {
    pub state: String,
    pub headers: Vec<String>,
    pub rows: Vec<PreviewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DialogResponse {
    fn from_controller(controller: &ImportController) -> Self {
        let state = controller.state();
        let (headers, rows) = match controller.preview() {
            Some(sheet) => (
                sheet.headers.clone(),
                sheet
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(idx, cells)| PreviewRow {
                        number: idx + 1,
                        cells: cells.clone(),
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let error = match state {
            DialogState::Failed(message) => Some(message.clone()),
            _ => None,
        };

        Self {
            state: state.name().to_string(),
            headers,
            rows,
            error,
        }
    }
}

/// GET /api/v1/import - Current dialog state
pub async fn dialog(State(state): State<Arc<AppState>>) -> Response {
    let controller = state.controller.lock().await;
    ok_response(DialogResponse::from_controller(&controller))
}

/// POST /api/v1/import/open - Open the import dialog
pub async fn open(State(state): State<Arc<AppState>>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.open() {
        Ok(()) => ok_response(DialogResponse::from_controller(&controller)),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/import/file - Parse the uploaded spreadsheet for preview
pub async fn upload(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.select_file(&body) {
        Ok(_) => ok_response(DialogResponse::from_controller(&controller)),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/import/cancel - Close the dialog
pub async fn cancel(State(state): State<Arc<AppState>>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.cancel() {
        Ok(()) => ok_response(DialogResponse::from_controller(&controller)),
        Err(e) => error_response(e),
    }
}

/// One stored record, numbered from 1
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct UserRow {
    pub number: usize,
    pub id: String,
    pub name: CellValue,
    pub age: CellValue,
}

fn user_rows(users: &[StoredRecord]) -> Vec<UserRow> {
    users
        .iter()
        .enumerate()
        .map(|(idx, doc)| UserRow {
            number: idx + 1,
            id: doc.id.clone(),
            name: doc.record.name.clone(),
            age: doc.record.age.clone(),
        })
        .collect()
}

/// Submit response
#[derive(Serialize, Deserialize, Debug)]
pub struct SubmitResponse {
    pub created: usize,
    pub users: Vec<UserRow>,
}

/// POST /api/v1/import/submit - Write the previewed rows to the store
///
/// The controller is locked only around state changes, so the dialog reads
/// as `submitting` while the batch is in flight.
pub async fn submit(State(state): State<Arc<AppState>>) -> Response {
    let (store, records) = {
        let mut controller = state.controller.lock().await;
        match controller.start_submit() {
            Ok(records) => (controller.store(), records),
            Err(e) => return error_response(e),
        }
    };

    // Runs on its own task so a dropped connection can't abandon the dialog mid-write
    let controller = Arc::clone(&state.controller);
    let task = tokio::spawn(async move {
        let outcome = store.batch_create(&records).await;
        let created = controller.lock().await.finish_submit(outcome)?;

        let users = store.fetch_all().await.map_err(|e| {
            warn!("Failed to fetch records after import: {}", e);
            e
        })?;
        let mut controller = controller.lock().await;
        Ok::<_, SheetError>(SubmitResponse {
            created,
            users: user_rows(controller.set_users(users)),
        })
    });

    match task.await {
        Ok(Ok(response)) => ok_response(response),
        Ok(Err(e)) => error_response(e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::err(format!("Submit task failed: {}", e))),
        )
            .into_response(),
    }
}

/// Users response
#[derive(Serialize, Deserialize, Debug)]
pub struct UsersResponse {
    pub count: usize,
    pub users: Vec<UserRow>,
}

/// Fetch the collection without holding the controller lock
async fn fetch_users(state: &AppState) -> Result<Vec<StoredRecord>, SheetError> {
    let store = state.controller.lock().await.store();
    store.fetch_all().await.map_err(|e| {
        warn!("Failed to fetch records: {}", e);
        e
    })
}

/// GET /api/v1/users - Refresh and list stored records
pub async fn users(State(state): State<Arc<AppState>>) -> Response {
    let users = match fetch_users(&state).await {
        Ok(users) => users,
        Err(e) => return error_response(e),
    };
    let mut controller = state.controller.lock().await;
    let users = controller.set_users(users);
    ok_response(UsersResponse {
        count: users.len(),
        users: user_rows(users),
    })
}

/// GET /api/v1/export - Download stored records as a spreadsheet
pub async fn export(State(state): State<Arc<AppState>>) -> Response {
    let users = match fetch_users(&state).await {
        Ok(users) => users,
        Err(e) => return error_response(e),
    };
    let rendered = {
        let mut controller = state.controller.lock().await;
        controller.set_users(users);
        controller.render_export()
    };
    match rendered {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ),
            ],
            file.bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok() {
        let response = ApiResponse::ok("data".to_string());
        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some("data"));
        assert!(response.error.is_none());
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_skips_data() {
        let response = ApiResponse::<()>::err("boom");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&SheetError::InvalidTransition {
                action: "submit",
                state: "closed"
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&SheetError::Decode("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&SheetError::Http {
                status: 403,
                message: "denied".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SheetError::Export("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_rows_numbered_from_one() {
        let users = vec![
            StoredRecord {
                id: "a".into(),
                record: crate::types::Record::new("Ann", 30.0),
            },
            StoredRecord {
                id: "b".into(),
                record: crate::types::Record::new("Bo", 41.0),
            },
        ];
        let rows = user_rows(&users);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].name, CellValue::from("Bo"));
    }
}
