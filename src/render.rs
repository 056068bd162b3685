//! Renders records as the `bike-data.js` literal block and writes it in place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::info;

use crate::error::{LedgerError, Result};
use crate::record::Record;

pub const DEFAULT_ARRAY_NAME: &str = "bikeDataArray";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name of the array constant and of the `window` property it is exported as.
    pub array_name: String,
    /// Shown in the header comment, usually the tabular file name.
    pub source_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            array_name: DEFAULT_ARRAY_NAME.to_string(),
            source_label: "Book1.csv".to_string(),
        }
    }
}

/// Escape a value for a single-quoted literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_object(record: &Record) -> String {
    let fields: Vec<String> = record
        .literal_fields()
        .iter()
        .map(|(name, value)| format!("{name}: '{}'", escape_literal(value)))
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

/// One record per line, trailing comma on all but the last, followed by the
/// `window` export.
pub fn render_literal(records: &[Record], options: &RenderOptions) -> String {
    let name = &options.array_name;
    let mut out = format!(
        "// Bike Data from {} - Complete inventory of {} bikes\nconst {name} = [\n",
        options.source_label,
        records.len()
    );
    for (index, record) in records.iter().enumerate() {
        out.push_str("    ");
        out.push_str(&render_object(record));
        if index + 1 < records.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "];\n\n// Export the data\nwindow.{name} = {name};\n"
    ));
    out
}

/// Replace `path` with `contents`. The text goes to a sibling temp file first
/// and is renamed over the target, so the target is never left half-written.
pub fn write_literal_file(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source| LedgerError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    let staged = PathBuf::from(staged);

    if let Err(err) = fs::write(&staged, contents) {
        let _ = fs::remove_file(&staged);
        return Err(write_error(err));
    }
    if let Err(err) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(write_error(err));
    }

    info!("wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// `<original>.backup_<YYYYMMDD_HHMMSS>`
pub fn backup_path(original: &Path, timestamp: &NaiveDateTime) -> PathBuf {
    let mut name = original.as_os_str().to_owned();
    name.push(format!(".backup_{}", timestamp.format(BACKUP_TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

/// Copy `original` to a timestamped backup next to it.
pub fn create_backup(original: impl AsRef<Path>) -> Result<PathBuf> {
    let original = original.as_ref();
    let target = backup_path(original, &Local::now().naive_local());
    fs::copy(original, &target).map_err(|source| LedgerError::Backup {
        path: original.to_path_buf(),
        source,
    })?;
    info!("backup created: {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::record::DEFAULT_STATUS;
    use crate::source::literal::parse_literal_records;

    fn record(chassis_no: &str, city: &str) -> Record {
        Record {
            chassis_no: chassis_no.to_string(),
            reg_no: "KA01AQ6937".to_string(),
            vehicle_model: "Quantum".to_string(),
            received_date: "22-Nov-24".to_string(),
            city: city.to_string(),
            batch: "BLR_Batch 2_200".to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    #[test]
    fn renders_one_object_per_line_with_export() {
        let records = vec![record("MD9HAPXF4GR710037", "BLR"), record("MD9HAPXF4GR710059", "BLR")];
        let text = render_literal(&records, &RenderOptions::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "// Bike Data from Book1.csv - Complete inventory of 2 bikes");
        assert_eq!(lines[1], "const bikeDataArray = [");
        assert_eq!(
            lines[2],
            "    { chassisNo: 'MD9HAPXF4GR710037', regNo: 'KA01AQ6937', vehicleModel: 'Quantum', receivedDate: '22-Nov-24', city: 'BLR', batch: 'BLR_Batch 2_200', status: 'Received' },"
        );
        assert!(lines[3].ends_with("status: 'Received' }"));
        assert_eq!(lines[4], "];");
        assert!(text.ends_with("// Export the data\nwindow.bikeDataArray = bikeDataArray;\n"));
    }

    #[test]
    fn empty_input_renders_empty_array() {
        let text = render_literal(&[], &RenderOptions::default());
        assert!(text.contains("const bikeDataArray = [\n];"));
        assert!(text.contains("inventory of 0 bikes"));
    }

    #[test]
    fn escaped_values_survive_reparse() {
        let records = vec![record("MD9HAPXF4GR710037", "O'Hare \\ Depot")];
        let text = render_literal(&records, &RenderOptions::default());
        let parsed = parse_literal_records(&text);
        assert_eq!(parsed, records);
    }

    #[test]
    fn backup_path_appends_timestamp() {
        let stamp = NaiveDate::from_ymd_opt(2024, 11, 22)
            .and_then(|d| d.and_hms_opt(9, 5, 7))
            .expect("valid timestamp");
        assert_eq!(
            backup_path(Path::new("site/bike-data.js"), &stamp),
            PathBuf::from("site/bike-data.js.backup_20241122_090507")
        );
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("chassis-ledger-write-{stamp}"));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        let target = dir.join("bike-data.js");
        fs::write(&target, "const bikeDataArray = [];\n").expect("target written");
        // A directory in the staging slot makes the staged write fail.
        fs::create_dir(dir.join("bike-data.js.tmp")).expect("staging dir created");

        let err = write_literal_file(&target, "replacement").unwrap_err();
        assert!(matches!(err, LedgerError::Write { .. }));
        assert_eq!(
            fs::read_to_string(&target).expect("target readable"),
            "const bikeDataArray = [];\n"
        );

        let _ = fs::remove_dir_all(dir);
    }
}
