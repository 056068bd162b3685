//! Tabular inventory reader: `Book1.csv` exports and the workbooks they come from.
//! Columns are located by header name; rows with an empty `Chassis No` are skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::Reader;
use log::{debug, info, warn};

use crate::error::{LedgerError, Result};
use crate::record::{duplicate_keys, Record, RecordSet, DEFAULT_STATUS};

pub const CHASSIS_NO_COLUMN: &str = "Chassis No";
pub const REG_NO_COLUMN: &str = "Reg No";
pub const VEHICLE_MODEL_COLUMN: &str = "Vehicle Model";
pub const RECEIVED_DATE_COLUMN: &str = "Received Date";
pub const CITY_COLUMN: &str = "City";
pub const BATCH_COLUMN: &str = "Batch";

/// Date cells of a workbook are written the way the CSV export shows them.
pub const RECEIVED_DATE_FORMAT: &str = "%d-%b-%y";

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Result of reading one tabular source.
#[derive(Debug, Clone, Default)]
pub struct TabularExtract {
    /// Every row with a non-empty key, in file order (duplicates included).
    pub records: Vec<Record>,
    pub keys: RecordSet,
    /// Rows dropped for an empty or missing key, or because they failed to parse.
    pub skipped_rows: usize,
    pub duplicate_keys: Vec<String>,
}

/// Column indices derived from the header row by name.
struct Columns {
    chassis_no: Option<usize>,
    reg_no: Option<usize>,
    vehicle_model: Option<usize>,
    received_date: Option<usize>,
    city: Option<usize>,
    batch: Option<usize>,
}

fn find_columns(header: &[String]) -> Columns {
    fn find(header: &[String], name: &str) -> Option<usize> {
        header.iter().position(|h| h == name)
    }
    Columns {
        chassis_no: find(header, CHASSIS_NO_COLUMN),
        reg_no: find(header, REG_NO_COLUMN),
        vehicle_model: find(header, VEHICLE_MODEL_COLUMN),
        received_date: find(header, RECEIVED_DATE_COLUMN),
        city: find(header, CITY_COLUMN),
        batch: find(header, BATCH_COLUMN),
    }
}

/// Excel prepends a byte-order mark to UTF-8 CSV exports.
fn clean_header(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}').trim().to_string()
}

fn cell(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

struct ExtractBuilder {
    columns: Columns,
    records: Vec<Record>,
    skipped_rows: usize,
}

impl ExtractBuilder {
    fn new(header: &[String]) -> Self {
        let columns = find_columns(header);
        if columns.chassis_no.is_none() && !header.is_empty() {
            warn!("header has no '{CHASSIS_NO_COLUMN}' column; every row will be skipped");
        }
        Self {
            columns,
            records: Vec::new(),
            skipped_rows: 0,
        }
    }

    fn push_row(&mut self, line: usize, row: &[String]) {
        let chassis_no = cell(row, self.columns.chassis_no);
        if chassis_no.is_empty() {
            debug!("row {line}: empty chassis number, skipped");
            self.skipped_rows += 1;
            return;
        }
        self.records.push(Record {
            chassis_no: chassis_no.to_string(),
            reg_no: cell(row, self.columns.reg_no).to_string(),
            vehicle_model: cell(row, self.columns.vehicle_model).to_string(),
            received_date: cell(row, self.columns.received_date).to_string(),
            city: cell(row, self.columns.city).to_string(),
            batch: cell(row, self.columns.batch).to_string(),
            status: DEFAULT_STATUS.to_string(),
        });
    }

    fn skip(&mut self) {
        self.skipped_rows += 1;
    }

    fn finish(self) -> TabularExtract {
        let keys: RecordSet = self.records.iter().map(|r| r.chassis_no.clone()).collect();
        let duplicates = duplicate_keys(&self.records);
        if !duplicates.is_empty() {
            warn!(
                "{} chassis number(s) appear on more than one row; counted once",
                duplicates.len()
            );
        }
        TabularExtract {
            records: self.records,
            keys,
            skipped_rows: self.skipped_rows,
            duplicate_keys: duplicates,
        }
    }
}

/// Read delimited text with a header row. Cells are trimmed; short rows are
/// padded with empty values and rows that fail to decode are skipped.
pub fn read_tabular<R: Read>(reader: R) -> Result<TabularExtract> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let header: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
    let mut builder = ExtractBuilder::new(&header);

    for (index, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        match result {
            Ok(record) => {
                let row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
                builder.push_row(line, &row);
            }
            Err(err) => {
                debug!("row {line}: {err}, skipped");
                builder.skip();
            }
        }
    }

    Ok(builder.finish())
}

/// Open a tabular source by path. Workbooks are read from their first sheet.
pub fn load_tabular(path: impl AsRef<Path>) -> Result<TabularExtract> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LedgerError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let extract = if is_workbook(path) {
        load_workbook(path)?
    } else {
        let file = File::open(path).map_err(|source| LedgerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        read_tabular(BufReader::new(file))?
    };

    info!(
        "read {} record(s) from {} ({} skipped)",
        extract.records.len(),
        path.display(),
        extract.skipped_rows
    );
    Ok(extract)
}

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Render a workbook cell the way it would appear in a CSV export.
pub fn cell_text(d: &calamine::Data) -> String {
    match d {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.trim().to_string(),
        calamine::Data::Float(f) => format!("{}", f),
        calamine::Data::Int(i) => format!("{}", i),
        calamine::Data::Bool(b) => format!("{}", b),
        calamine::Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.format(RECEIVED_DATE_FORMAT).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => s.clone(),
        calamine::Data::Error(e) => e.to_string(),
    }
}

fn load_workbook(path: &Path) -> Result<TabularExtract> {
    let workbook_error = |message: String| LedgerError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut wb = calamine::open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_name = wb
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?;
    let range = wb
        .worksheet_range(&sheet_name)
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| clean_header(&cell_text(c))).collect())
        .unwrap_or_default();
    let mut builder = ExtractBuilder::new(&header);
    for (index, row) in rows.enumerate() {
        let row: Vec<String> = row.iter().map(cell_text).collect();
        builder.push_row(index + 2, &row);
    }

    debug!("read workbook sheet '{sheet_name}' from {}", path.display());
    Ok(builder.finish())
}
