//! CLI command handlers

pub mod commands;

pub use commands::{export, format_preview, format_users, import, list, preview};
