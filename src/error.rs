use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Spreadsheet decode error: {0}")]
    Decode(String),

    #[error("Spreadsheet write error: {0}")]
    Export(String),

    #[error("Store request failed: {0}")]
    Network(String),

    #[error("Store returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected store response: {0}")]
    Response(String),

    #[error("Cannot {action} while dialog is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl From<serde_yaml::Error> for SheetError {
    fn from(e: serde_yaml::Error) -> Self {
        SheetError::Config(e.to_string())
    }
}

impl From<calamine::Error> for SheetError {
    fn from(e: calamine::Error) -> Self {
        SheetError::Decode(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        SheetError::Export(e.to_string())
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        SheetError::Network(e.to_string())
    }
}
