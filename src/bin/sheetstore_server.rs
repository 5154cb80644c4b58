//! SheetStore API Server binary
//!
//! HTTP REST API behind the spreadsheet upload page.
//! Provides import dialog, record list and export endpoints.

use clap::Parser;
use royalbit_sheetstore::config::{self, ConfigOverrides, StoreBackend};
use royalbit_sheetstore::{api::run_api_server, logging};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetstore-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "SheetStore API Server - spreadsheet import/export over HTTP")]
#[command(long_about = r#"
SheetStore API Server

Import dialog:
  - GET  /api/v1/import         - Dialog state and preview rows
  - POST /api/v1/import/open    - Open the dialog
  - POST /api/v1/import/file    - Upload a spreadsheet (raw request body)
  - POST /api/v1/import/cancel  - Discard the preview
  - POST /api/v1/import/submit  - Write previewed rows in one batch

Records:
  - GET  /api/v1/users          - List stored records
  - GET  /api/v1/export         - Download records as .xlsx

Additional endpoints:
  - GET  /health                - Health check
  - GET  /version               - Server version info
  - GET  /                      - API documentation

Example usage:
  sheetstore-server --backend memory
  sheetstore-server --project-id my-app --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/import/open
  curl -X POST --data-binary @users.xlsx http://localhost:8080/api/v1/import/file
  curl -X POST http://localhost:8080/api/v1/import/submit
"#)]
struct Args {
    /// Path to sheetstore.yaml
    #[arg(short, long, env = "SHEETSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "SHEETSTORE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SHEETSTORE_PORT")]
    port: Option<u16>,

    /// Record store backend
    #[arg(long, value_enum, env = "SHEETSTORE_BACKEND")]
    backend: Option<StoreBackend>,

    /// Firestore project id
    #[arg(long, env = "SHEETSTORE_PROJECT_ID")]
    project_id: Option<String>,

    /// Firestore web API key
    #[arg(long, env = "SHEETSTORE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init("royalbit_sheetstore=info,tower_http=info");

    let config = config::resolve(
        args.config.as_deref(),
        ConfigOverrides {
            backend: args.backend,
            project_id: args.project_id,
            api_key: args.api_key,
            collection: None,
            host: args.host,
            port: args.port,
        },
    )?;

    run_api_server(&config).await
}
