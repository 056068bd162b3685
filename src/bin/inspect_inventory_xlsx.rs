//! Inspect an inventory workbook before exporting it: sheet names, leading rows,
//! and what the tabular reader extracts from the first sheet.
//! Usage: cargo run --bin inspect_inventory_xlsx -- path/to/Book1.xlsx [rows]

use std::path::Path;

use calamine::Reader;

use chassis_ledger::source::tabular::{cell_text, load_tabular, CHASSIS_NO_COLUMN};

const DEFAULT_PREVIEW_ROWS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_inventory_xlsx <path-to.xlsx> [rows]")?;
    let preview_rows = std::env::args()
        .nth(2)
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_PREVIEW_ROWS);
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let mut wb = calamine::open_workbook_auto(path)?;
    let names = wb.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));

    let sheet_name = names.first().ok_or("No sheets")?;
    println!("\nUsing sheet: {}", sheet_name);

    let range = wb.worksheet_range(sheet_name)?;
    let (height, width) = range.get_size();
    println!("Size: {} rows x {} cols\nFirst {} rows:", height, width, preview_rows);

    for (i, row) in range.rows().take(preview_rows).enumerate() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("  {}: {}", i, cells.join(" | "));
    }

    let has_key_column = range
        .rows()
        .next()
        .map(|header| header.iter().any(|c| cell_text(c) == CHASSIS_NO_COLUMN))
        .unwrap_or(false);
    if !has_key_column {
        println!("\nHeader row has no '{}' column", CHASSIS_NO_COLUMN);
        return Ok(());
    }

    let extract = load_tabular(path)?;
    println!(
        "\nExtracted {} records ({} unique chassis numbers, {} rows skipped, {} duplicated)",
        extract.records.len(),
        extract.keys.len(),
        extract.skipped_rows,
        extract.duplicate_keys.len()
    );
    Ok(())
}
