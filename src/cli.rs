use std::path::{Path, PathBuf};

use log::warn;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::reconcile::{common_prefixes, group_by_prefix, Comparison};
use crate::record::{InventorySummary, Record, RecordSet};
use crate::render::{create_backup, render_literal, write_literal_file, RenderOptions};
use crate::report::{self, Labels, LiteralStats, SourceAnalysis};
use crate::source::{load_embedded, load_tabular, EmbeddedExtract, Source, TabularExtract};

const USAGE: &str = "usage: chassis-ledger <compare|analyze|convert|update> [csv-path] [js-path] [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compare,
    Analyze,
    Convert,
    Update,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("compare") => Some(Command::Compare),
        Some("analyze") => Some(Command::Analyze),
        Some("convert") => Some(Command::Convert),
        Some("update") => Some(Command::Update),
        _ => None,
    }
}

/// Positional arguments after the command name; flags are skipped.
fn positionals(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };
    let paths = positionals(args);
    let config = config.with_paths(paths.first().copied(), paths.get(1).copied());

    match command {
        Command::Compare => {
            let as_json = args.iter().any(|arg| arg == "--json");
            handle_compare(&config, as_json)
        }
        Command::Analyze => handle_analyze(&config),
        Command::Convert => handle_convert(&config),
        Command::Update => handle_update(&config),
    }
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A source that cannot be read is reported and treated as empty.
fn keys_or_empty(source: Source, path: &Path, config: &LedgerConfig) -> RecordSet {
    source
        .load_keys(path, &config.generated_template)
        .unwrap_or_else(|err| {
            eprintln!("Error reading {source} source: {err}");
            warn!("continuing with an empty set for {}", path.display());
            RecordSet::new()
        })
}

fn handle_compare(config: &LedgerConfig, as_json: bool) -> i32 {
    let csv_keys = keys_or_empty(Source::Tabular, &config.csv_path, config);
    let js_keys = keys_or_empty(Source::EmbeddedLiteral, &config.literal_path, config);
    let comparison = Comparison::between(&csv_keys, &js_keys);

    if as_json {
        let payload = serde_json::json!({
            "csv_path": config.csv_path.display().to_string(),
            "js_path": config.literal_path.display().to_string(),
            "match_percentage": comparison.match_percentage(),
            "verdict": comparison.verdict(),
            "comparison": &comparison,
        });
        return match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                println!("{text}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize comparison: {err}");
                1
            }
        };
    }

    let csv_label = label(&config.csv_path);
    let js_label = label(&config.literal_path);
    let labels = Labels {
        tabular: &csv_label,
        literal: &js_label,
    };
    print!(
        "{}",
        report::comparison_report(&comparison, labels, config.sample_limit)
    );
    0
}

fn tabular_or_empty(path: &Path) -> TabularExtract {
    load_tabular(path).unwrap_or_else(|err| {
        eprintln!("Error reading CSV file: {err}");
        TabularExtract::default()
    })
}

fn embedded_or_empty(path: &Path, config: &LedgerConfig) -> EmbeddedExtract {
    load_embedded(path, &config.generated_template).unwrap_or_else(|err| {
        eprintln!("Error reading JS file: {err}");
        EmbeddedExtract::default()
    })
}

fn handle_analyze(config: &LedgerConfig) -> i32 {
    let csv_label = label(&config.csv_path);
    let js_label = label(&config.literal_path);
    let labels = Labels {
        tabular: &csv_label,
        literal: &js_label,
    };

    println!("=== Detailed Bike Number Analysis ===\n");

    let tabular = tabular_or_empty(&config.csv_path);
    print!(
        "{}",
        report::source_analysis(&SourceAnalysis {
            label: csv_label.clone(),
            total_records: tabular.records.len(),
            unique_keys: tabular.keys.len(),
            literal: None,
            nonstandard_keys: tabular.keys.nonstandard_count(),
            summary: InventorySummary::from_records(&tabular.records),
        })
    );
    println!();

    let embedded = embedded_or_empty(&config.literal_path, config);
    print!(
        "{}",
        report::source_analysis(&SourceAnalysis {
            label: js_label.clone(),
            total_records: embedded.records.len(),
            unique_keys: embedded.record_keys().len(),
            literal: Some(LiteralStats {
                generated_matches: embedded.generated_matches,
                merged_keys: embedded.keys.len(),
                array_name: embedded.array_name.clone(),
                exported: embedded.exported,
            }),
            nonstandard_keys: embedded.keys.nonstandard_count(),
            summary: InventorySummary::from_records(&embedded.records),
        })
    );
    println!();

    let comparison = Comparison::between(&tabular.keys, &embedded.keys);
    print!(
        "{}",
        report::comparison_summary(&comparison, labels, config.sample_limit)
    );

    let csv_prefixes = group_by_prefix(&tabular.keys, config.prefix_length);
    let js_prefixes = group_by_prefix(&embedded.keys, config.prefix_length);
    let common = common_prefixes(&csv_prefixes, &js_prefixes);
    print!(
        "{}",
        report::prefix_analysis(labels, &csv_prefixes, &js_prefixes, &common, config.prefix_limit)
    );

    println!("\n=== Recommendations ===");
    for line in report::recommendation_lines(comparison.recommendation(), labels) {
        println!("{line}");
    }
    0
}

/// Read the inventory, render it and replace the literal file.
fn convert(config: &LedgerConfig) -> Result<Vec<Record>> {
    let extract = load_tabular(&config.csv_path)?;
    if !extract.duplicate_keys.is_empty() {
        warn!(
            "writing {} duplicated chassis number(s) as separate entries",
            extract.duplicate_keys.len()
        );
    }
    let options = RenderOptions {
        array_name: config.array_name.clone(),
        source_label: label(&config.csv_path),
    };
    let text = render_literal(&extract.records, &options);
    write_literal_file(&config.literal_path, &text)?;
    println!(
        "Wrote {} bikes to {} ({} characters)",
        extract.records.len(),
        config.literal_path.display(),
        text.chars().count()
    );
    Ok(extract.records)
}

fn handle_convert(config: &LedgerConfig) -> i32 {
    match convert(config) {
        Ok(_) => {
            println!("Conversion completed! Check {}", config.literal_path.display());
            0
        }
        Err(err) => {
            eprintln!("conversion failed: {err}");
            1
        }
    }
}

/// What `update` did: the backup it made, if any, and the rows written.
#[derive(Debug)]
struct UpdateOutcome {
    backup: Option<PathBuf>,
    records: Vec<Record>,
}

/// Back up the target, then convert. A failed backup is reported and the
/// conversion still runs.
fn update(
    config: &LedgerConfig,
    backup: impl FnOnce(&Path) -> Result<PathBuf>,
) -> Result<UpdateOutcome> {
    for path in [&config.csv_path, &config.literal_path] {
        if !path.exists() {
            return Err(LedgerError::SourceNotFound { path: path.clone() });
        }
    }

    println!("Source: {}", config.csv_path.display());
    println!("Target: {}", config.literal_path.display());
    println!();

    println!("Creating backup of original file...");
    let backup = match backup(&config.literal_path) {
        Ok(backup) => {
            println!("Backup created: {}", backup.display());
            Some(backup)
        }
        Err(err) => {
            warn!("{err}");
            println!("Proceeding without backup...");
            None
        }
    };
    println!();

    let records = convert(config)?;
    Ok(UpdateOutcome { backup, records })
}

fn handle_update(config: &LedgerConfig) -> i32 {
    println!("=== Bike Data Update Tool ===\n");

    match update(config, |p: &Path| create_backup(p)) {
        Ok(outcome) => {
            println!("\n=== Summary ===");
            print!(
                "{}",
                report::inventory_summary(&InventorySummary::from_records(&outcome.records))
            );
            println!("\nUpdate completed successfully!");
            0
        }
        Err(err) => {
            eprintln!("update failed: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("chassis-ledger-{name}-{stamp}"));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    #[test]
    fn parse_command_maps_known_names() {
        let args: Vec<String> = ["chassis-ledger", "update"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_command(&args), Some(Command::Update));
        assert_eq!(parse_command(&args[..1]), None);
    }

    #[test]
    fn update_proceeds_when_backup_fails() {
        let dir = unique_temp_dir("update-no-backup");
        let csv = dir.join("Book1.csv");
        let js = dir.join("bike-data.js");
        fs::write(
            &csv,
            "Chassis No,Reg No,Vehicle Model,Received Date,City,Batch\nMD9HAPXF4GR710037,KA01AQ6937,Quantum,22-Nov-24,BLR,B1\n",
        )
        .expect("csv written");
        fs::write(&js, "const bikeDataArray = [];\n").expect("target written");

        let config = LedgerConfig::default().with_paths(
            Some(csv.to_string_lossy().as_ref()),
            Some(js.to_string_lossy().as_ref()),
        );
        let outcome = update(&config, |path| {
            Err(LedgerError::Backup {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            })
        })
        .expect("update should still convert");

        assert!(outcome.backup.is_none());
        assert_eq!(outcome.records.len(), 1);
        let written = fs::read_to_string(&js).expect("target readable");
        assert!(written.contains("{ chassisNo: 'MD9HAPXF4GR710037'"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn update_reports_missing_target_before_backup() {
        let dir = unique_temp_dir("update-no-target");
        let csv = dir.join("Book1.csv");
        fs::write(&csv, "Chassis No\nMD9HAPXF4GR710037\n").expect("csv written");
        let config = LedgerConfig::default().with_paths(
            Some(csv.to_string_lossy().as_ref()),
            Some(dir.join("bike-data.js").to_string_lossy().as_ref()),
        );

        let mut backed_up = false;
        let err = update(&config, |path| {
            backed_up = true;
            Ok(path.to_path_buf())
        })
        .unwrap_err();
        assert!(matches!(err, LedgerError::SourceNotFound { .. }));
        assert!(!backed_up);

        let _ = fs::remove_dir_all(dir);
    }
}
