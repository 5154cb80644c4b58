//! Configuration file (`sheetstore.yaml`)
//!
//! Every key is optional. CLI flags and `SHEETSTORE_*` environment
//! variables are applied on top by the binaries.

use serde::Deserialize;
use std::path::Path;

use crate::error::{SheetError, SheetResult};
use crate::types::{ColumnMapping, MAX_COLUMN_INDEX};

/// Default download name for exported spreadsheets
pub const DEFAULT_EXPORT_FILE_NAME: &str = "teste.xlsx";

/// Which record store to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Cloud Firestore over REST
    #[default]
    Firestore,
    /// In-process collection, lost on exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub project_id: Option<String>,
    pub database: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub base_url: String,
    pub page_size: u32,
    /// No timeout unless set
    pub request_timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            project_id: None,
            database: "(default)".to_string(),
            api_key: None,
            collection: "users".to_string(),
            base_url: "https://firestore.googleapis.com".to_string(),
            page_size: 300,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    pub header_row: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            header_row: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub columns: ColumnMapping,
    pub export: ExportConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from a YAML file
    pub fn load(path: &Path) -> SheetResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SheetError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load from a file if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> SheetResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> SheetResult<Self> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Checks that don't need the network
    pub fn validate(&self) -> SheetResult<()> {
        if self.store.backend == StoreBackend::Firestore && self.store.project_id.is_none() {
            return Err(SheetError::Config(
                "store.project_id is required for the firestore backend".to_string(),
            ));
        }
        if self.store.collection.is_empty() {
            return Err(SheetError::Config("store.collection must not be empty".to_string()));
        }
        if self.store.page_size == 0 {
            return Err(SheetError::Config("store.page_size must be positive".to_string()));
        }
        for (field, index) in [("name", self.columns.name), ("age", self.columns.age)] {
            if index > MAX_COLUMN_INDEX {
                return Err(SheetError::Config(format!(
                    "columns.{} is {}, past the last worksheet column ({})",
                    field, index, MAX_COLUMN_INDEX
                )));
            }
        }
        if self.export.file_name.is_empty() {
            return Err(SheetError::Config("export.file_name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Values from flags / environment that win over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<StoreBackend>,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub collection: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            config.store.backend = backend;
        }
        if let Some(project_id) = self.project_id {
            config.store.project_id = Some(project_id);
        }
        if let Some(api_key) = self.api_key {
            config.store.api_key = Some(api_key);
        }
        if let Some(collection) = self.collection {
            config.store.collection = collection;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Load the config file (if any), apply overrides, then validate
pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> SheetResult<AppConfig> {
    let mut config = AppConfig::load_or_default(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
