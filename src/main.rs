use clap::{Parser, Subcommand};
use royalbit_sheetstore::config::{self, ConfigOverrides, StoreBackend};
use royalbit_sheetstore::{api, cli, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetstore")]
#[command(about = "Import spreadsheets into a document store and export them back.")]
#[command(long_about = "SheetStore - spreadsheet import/export for a hosted document store

COMMANDS:
  preview  - Show the rows a spreadsheet would import
  import   - Preview, confirm, and write rows to the store in one batch
  list     - List stored records
  export   - Write stored records to an .xlsx file
  serve    - Run the HTTP API server

COLUMNS:
  Column A is read as `name`, column B as `age` (change in the config file).
  Row 1 is the header row and is never imported.

EXAMPLES:
  sheetstore preview users.xlsx
  sheetstore --project-id my-app import users.xlsx
  sheetstore --project-id my-app export -o users.xlsx --with-header
  sheetstore --backend memory serve --port 3000")]
#[command(version)]
struct Cli {
    /// Path to sheetstore.yaml
    #[arg(short, long, global = true, env = "SHEETSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Record store backend
    #[arg(long, global = true, value_enum, env = "SHEETSTORE_BACKEND")]
    backend: Option<StoreBackend>,

    /// Firestore project id
    #[arg(long, global = true, env = "SHEETSTORE_PROJECT_ID")]
    project_id: Option<String>,

    /// Firestore web API key
    #[arg(long, global = true, env = "SHEETSTORE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Collection holding the records
    #[arg(long, global = true)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the rows a spreadsheet would import
    Preview {
        /// Spreadsheet file (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,
    },

    #[command(long_about = "Import a spreadsheet into the store.

Reads the first worksheet. Row 1 is the header row; every following row
becomes one record. Numeric-looking text (\"42\") is stored as a number.
All rows are written in a single atomic batch: either every record is
created or none is.

EXAMPLE:
  sheetstore --project-id my-app import users.xlsx --yes")]
    /// Preview, confirm, and write rows to the store
    Import {
        /// Spreadsheet file (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List stored records
    List,

    #[command(long_about = "Export stored records to an .xlsx file.

One row per record, name in column A and age in column B. No header row
unless --with-header is given; without it, re-importing the file treats
the first record as the header.")]
    /// Write stored records to an .xlsx file
    Export {
        /// Output file (defaults to the configured file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a Name/Age header row
        #[arg(long)]
        with_header: bool,
    },

    /// Run the HTTP API server
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, env = "SHEETSTORE_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "SHEETSTORE_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(match cli.command {
        Commands::Serve { .. } => "royalbit_sheetstore=info,tower_http=info",
        _ => "royalbit_sheetstore=warn",
    });

    let mut overrides = ConfigOverrides {
        backend: cli.backend,
        project_id: cli.project_id,
        api_key: cli.api_key,
        collection: cli.collection,
        ..ConfigOverrides::default()
    };
    if let Commands::Serve { host, port } = &cli.command {
        overrides.host = host.clone();
        overrides.port = *port;
    }

    match cli.command {
        // Preview never touches the store
        Commands::Preview { file } => Ok(cli::preview(file)?),
        Commands::Import { file, yes } => {
            let config = config::resolve(cli.config.as_deref(), overrides)?;
            Ok(cli::import(file, yes, &config).await?)
        }
        Commands::List => {
            let config = config::resolve(cli.config.as_deref(), overrides)?;
            Ok(cli::list(&config).await?)
        }
        Commands::Export {
            output,
            with_header,
        } => {
            let config = config::resolve(cli.config.as_deref(), overrides)?;
            Ok(cli::export(output, with_header, &config).await?)
        }
        Commands::Serve { .. } => {
            let config = config::resolve(cli.config.as_deref(), overrides)?;
            api::run_api_server(&config).await
        }
    }
}
