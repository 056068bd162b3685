//! Console report builders. Each returns the finished text; the command
//! handlers decide where it goes.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use crate::reconcile::{CommonPrefix, Comparison, PrefixCount, Recommendation, Verdict};
use crate::record::{InventorySummary, RecordSet};

/// Display names of the two compared sources.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    pub tabular: &'a str,
    pub literal: &'a str,
}

/// Per-source figures for the detailed analysis.
#[derive(Debug, Clone, Default)]
pub struct SourceAnalysis {
    pub label: String,
    pub total_records: usize,
    pub unique_keys: usize,
    /// Only reported for the literal source.
    pub literal: Option<LiteralStats>,
    pub nonstandard_keys: usize,
    pub summary: InventorySummary,
}

/// Extra figures for the generated literal file.
#[derive(Debug, Clone, Default)]
pub struct LiteralStats {
    pub generated_matches: usize,
    /// Record keys plus generated-template matches.
    pub merged_keys: usize,
    pub array_name: Option<String>,
    pub exported: bool,
}

fn render(build: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = build(&mut out);
    out
}

fn write_counts(out: &mut String, title: &str, counts: &BTreeMap<String, usize>) -> fmt::Result {
    writeln!(out, "{title}:")?;
    for (key, count) in counts {
        writeln!(out, "  {key}: {count}")?;
    }
    Ok(())
}

fn write_summary(out: &mut String, summary: &InventorySummary) -> fmt::Result {
    write_counts(out, "Vehicle Models", &summary.models)?;
    writeln!(out)?;
    write_counts(out, "Cities", &summary.cities)?;
    writeln!(out)?;
    write_counts(out, "Batches", &summary.batches)
}

fn write_sample(out: &mut String, title: &str, keys: &RecordSet, limit: usize) -> fmt::Result {
    if keys.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title} (first {limit}):")?;
    for key in keys.sample(limit) {
        writeln!(out, "  {key}")?;
    }
    if keys.len() > limit {
        writeln!(out, "  ... and {} more", keys.len() - limit)?;
    }
    writeln!(out)
}

/// Grouped counts per model, city and batch.
pub fn inventory_summary(summary: &InventorySummary) -> String {
    render(|out| write_summary(out, summary))
}

pub fn verdict_lines(verdict: Verdict, labels: Labels<'_>) -> Vec<String> {
    let Labels { tabular, literal } = labels;
    match verdict {
        Verdict::PerfectMatch => vec![
            format!("[ok] All bike numbers from {tabular} are present in {literal}"),
            format!("[ok] No extra bike numbers in {literal}"),
            "[ok] Perfect match!".to_string(),
        ],
        Verdict::CoveredWithExtras => vec![
            format!("[ok] All bike numbers from {tabular} are present in {literal}"),
            format!("[warn] {literal} contains additional bike numbers not in {tabular}"),
        ],
        Verdict::Partial => {
            vec!["[warn] Partial match - some bike numbers are missing or extra".to_string()]
        }
        Verdict::NoMatch => {
            vec!["[fail] No matching bike numbers found between the files".to_string()]
        }
    }
}

pub fn recommendation_lines(recommendation: Recommendation, labels: Labels<'_>) -> Vec<String> {
    let Labels { tabular, literal } = labels;
    match recommendation {
        Recommendation::RegenerateLiteral => vec![
            format!("[fail] Most bike numbers from {tabular} are missing from {literal}"),
            format!("   {literal} appears to contain only a small sample of the actual data"),
            format!("   Consider updating {literal} to include all bikes from {tabular}"),
        ],
        Recommendation::PartiallyMissing => vec![
            format!("[warn] Some bike numbers from {tabular} are missing from {literal}"),
            format!("   Run `chassis-ledger update` to regenerate {literal}"),
        ],
        Recommendation::ReviewExtras => vec![
            format!("[warn] {literal} contains bike numbers not in {tabular}"),
            "   These may be test data or outdated entries".to_string(),
        ],
        Recommendation::InSync => vec!["[ok] All bike numbers match between the files".to_string()],
    }
}

/// Report of the `compare` command.
pub fn comparison_report(comparison: &Comparison, labels: Labels<'_>, sample_limit: usize) -> String {
    render(|out| {
        let Labels { tabular, literal } = labels;
        writeln!(out, "=== Bike Number Comparison Report ===\n")?;
        writeln!(out, "Total chassis numbers in {tabular}: {}", comparison.left_total)?;
        writeln!(out, "Total chassis numbers in {literal}: {}", comparison.right_total)?;
        writeln!(out)?;
        writeln!(out, "Number of matching chassis numbers: {}", comparison.matching.len())?;
        writeln!(out, "Chassis numbers only in {tabular}: {}", comparison.only_left.len())?;
        writeln!(out, "Chassis numbers only in {literal}: {}", comparison.only_right.len())?;
        writeln!(out)?;
        if let Some(pct) = comparison.match_percentage() {
            writeln!(out, "Match percentage: {pct:.2}%")?;
        }
        writeln!(out)?;

        write_sample(
            out,
            &format!("Sample chassis numbers only in {tabular}"),
            &comparison.only_left,
            sample_limit,
        )?;
        write_sample(
            out,
            &format!("Sample chassis numbers only in {literal}"),
            &comparison.only_right,
            sample_limit,
        )?;

        writeln!(out, "=== Summary ===")?;
        for line in verdict_lines(comparison.verdict(), labels) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    })
}

/// One source block of the `analyze` report.
pub fn source_analysis(analysis: &SourceAnalysis) -> String {
    render(|out| {
        let label = &analysis.label;
        writeln!(out, "=== {label} Analysis ===")?;
        if let Some(literal) = &analysis.literal {
            writeln!(out, "Generated bikes found: {}", literal.generated_matches)?;
        }
        writeln!(out, "Total bikes in {label}: {}", analysis.total_records)?;
        writeln!(out, "Unique chassis numbers: {}", analysis.unique_keys)?;
        if let Some(literal) = &analysis.literal {
            writeln!(
                out,
                "Unique chassis numbers incl. generated IDs: {}",
                literal.merged_keys
            )?;
            match (&literal.array_name, literal.exported) {
                (Some(name), true) => writeln!(out, "Declared array: {name} (exported on window)")?,
                (Some(name), false) => writeln!(out, "Declared array: {name} (not exported)")?,
                (None, _) => writeln!(out, "Declared array: none found")?,
            }
        }
        if analysis.nonstandard_keys > 0 {
            writeln!(
                out,
                "Chassis numbers not in the 17-character format: {}",
                analysis.nonstandard_keys
            )?;
        }
        writeln!(out)?;
        write_summary(out, &analysis.summary)?;
        writeln!(out)
    })
}

/// Comparison block of the `analyze` report, with a sample of matching keys.
pub fn comparison_summary(comparison: &Comparison, labels: Labels<'_>, sample_limit: usize) -> String {
    render(|out| {
        writeln!(out, "=== Comparison Summary ===")?;
        writeln!(out, "Matching chassis numbers: {}", comparison.matching.len())?;
        writeln!(out, "Only in {}: {}", labels.tabular, comparison.only_left.len())?;
        writeln!(out, "Only in {}: {}", labels.literal, comparison.only_right.len())?;
        writeln!(out)?;
        write_sample(
            out,
            "Sample matching chassis numbers",
            &comparison.matching,
            sample_limit,
        )
    })
}

/// Top prefixes of both sources, then the prefixes they share.
pub fn prefix_analysis(
    labels: Labels<'_>,
    tabular: &[PrefixCount],
    literal: &[PrefixCount],
    common: &[CommonPrefix],
    limit: usize,
) -> String {
    render(|out| {
        writeln!(out, "=== Chassis Number Pattern Analysis ===")?;
        for (label, groups) in [(labels.tabular, tabular), (labels.literal, literal)] {
            writeln!(out, "Top chassis prefixes in {label}:")?;
            for group in groups.iter().take(limit) {
                writeln!(out, "  {}: {}", group.prefix, group.count)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "Common chassis prefixes: {}", common.len())?;
        for shared in common {
            writeln!(
                out,
                "  {}: CSV={}, JS={}",
                shared.prefix, shared.left, shared.right
            )?;
        }
        Ok(())
    })
}
