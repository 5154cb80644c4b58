use crate::config::AppConfig;
use crate::controller::ImportController;
use crate::error::{SheetError, SheetResult};
use crate::excel::SheetParser;
use crate::store::build_store;
use crate::types::{CellValue, ParsedSheet, StoredRecord};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Shown when the collection has no documents
pub const NO_USERS_MESSAGE: &str = "No users found.";

fn build_controller(config: &AppConfig) -> SheetResult<ImportController> {
    let store = build_store(&config.store)?;
    Ok(ImportController::from_config(store, config))
}

/// Render rows as a plain-text table with a leading 1-based `#` column
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(|r| r.len())
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for (i, h) in headers.iter().enumerate() {
        widths[i] = widths[i].max(h.chars().count());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let num_width = rows.len().to_string().len().max(1);

    let format_line = |num: &str, cells: &[String]| {
        let mut line = format!("{:>width$}", num, width = num_width);
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!("  {:<width$}", cell, width = width));
        }
        line.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line("#", headers));
    out.push('\n');
    for (idx, row) in rows.iter().enumerate() {
        out.push_str(&format_line(&(idx + 1).to_string(), row));
        out.push('\n');
    }
    out
}

fn cells_to_strings(cells: &[CellValue]) -> Vec<String> {
    cells.iter().map(CellValue::to_string).collect()
}

/// Table of a parsed sheet, as shown before confirming an import
pub fn format_preview(sheet: &ParsedSheet) -> String {
    let rows: Vec<Vec<String>> = sheet.rows.iter().map(|r| cells_to_strings(r)).collect();
    render_table(&sheet.headers, &rows)
}

/// Table of stored records with `Name` / `Age` columns
pub fn format_users(users: &[StoredRecord]) -> String {
    if users.is_empty() {
        return format!("{}\n", NO_USERS_MESSAGE);
    }
    let headers = vec!["Name".to_string(), "Age".to_string()];
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| vec![u.record.name.to_string(), u.record.age.to_string()])
        .collect();
    render_table(&headers, &rows)
}

fn confirm(prompt: &str) -> SheetResult<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Execute the preview command
pub fn preview(file: PathBuf) -> SheetResult<()> {
    println!("{}", "📖 SheetStore - Preview".bold().green());
    println!("   File: {}\n", file.display());

    let sheet = SheetParser::new().parse_file(&file)?;
    print!("{}", format_preview(&sheet));
    println!(
        "\n   {} columns, {} rows",
        sheet.headers.len(),
        sheet.row_count()
    );
    Ok(())
}

/// Execute the import command
pub async fn import(file: PathBuf, yes: bool, config: &AppConfig) -> SheetResult<()> {
    println!("{}", "📥 SheetStore - Import".bold().green());
    println!("   File:       {}", file.display());
    println!("   Collection: {}\n", config.store.collection);

    let bytes = std::fs::read(&file)?;
    let mut controller = build_controller(config)?;
    controller.open()?;
    let sheet = controller.select_file(&bytes)?;
    let row_count = sheet.row_count();
    print!("{}", format_preview(sheet));
    println!();

    if !yes && !confirm(&format!("Send {} rows?", row_count))? {
        controller.cancel()?;
        println!("{}", "Import cancelled - nothing was written".yellow());
        return Ok(());
    }

    let created = controller.submit().await?;
    println!(
        "{}",
        format!("✅ Imported {} records", created).bold().green()
    );
    println!();
    print!("{}", format_users(controller.users()));
    Ok(())
}

/// Execute the list command
pub async fn list(config: &AppConfig) -> SheetResult<()> {
    let mut controller = build_controller(config)?;
    let users = controller.refresh().await?;
    print!("{}", format_users(users));
    Ok(())
}

/// Execute the export command
pub async fn export(
    output: Option<PathBuf>,
    with_header: bool,
    config: &AppConfig,
) -> SheetResult<()> {
    println!("{}", "📤 SheetStore - Export".bold().green());

    let mut config = config.clone();
    config.export.header_row |= with_header;

    let mut controller = build_controller(&config)?;
    let file = controller.export().await?;
    let path = output.unwrap_or_else(|| PathBuf::from(&file.file_name));
    std::fs::write(&path, &file.bytes).map_err(SheetError::Io)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Records: {}", file.record_count);
    println!("   File:    {}", path.display());
    if !config.export.header_row {
        println!(
            "{}",
            "   Note: no header row - re-importing treats the first record as the header".dimmed()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_preview_numbers_rows_from_one() {
        let sheet = ParsedSheet::new(
            vec!["Name".to_string(), "Age".to_string()],
            vec![
                vec![CellValue::from("Ann"), CellValue::Number(30.0)],
                vec![CellValue::from("Bo"), CellValue::Number(41.0)],
            ],
        );
        assert_eq!(
            format_preview(&sheet),
            "#  Name  Age\n1  Ann   30\n2  Bo    41\n"
        );
    }

    #[test]
    fn test_format_preview_ragged_rows() {
        let sheet = ParsedSheet::new(
            vec!["Name".to_string()],
            vec![vec![CellValue::from("Ann"), CellValue::Number(30.0)]],
        );
        assert_eq!(format_preview(&sheet), "#  Name\n1  Ann   30\n");
    }

    #[test]
    fn test_format_users_empty() {
        assert_eq!(format_users(&[]), "No users found.\n");
    }

    #[test]
    fn test_format_users() {
        let users = vec![
            StoredRecord {
                id: "a".to_string(),
                record: Record::new("Ann", 30.0),
            },
            StoredRecord {
                id: "b".to_string(),
                record: Record::new("Bo", 41.0),
            },
        ];
        assert_eq!(
            format_users(&users),
            "#  Name  Age\n1  Ann   30\n2  Bo    41\n"
        );
    }
}
