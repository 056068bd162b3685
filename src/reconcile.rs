//! Set algebra over chassis numbers. All functions borrow their inputs and
//! return fresh values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::RecordSet;

/// Keys present in both sets.
pub fn intersect(a: &RecordSet, b: &RecordSet) -> RecordSet {
    a.iter().filter(|key| b.contains(key)).collect()
}

/// Keys in `a` that are absent from `b`.
pub fn difference(a: &RecordSet, b: &RecordSet) -> RecordSet {
    a.iter().filter(|key| !b.contains(key)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixCount {
    pub prefix: String,
    pub count: usize,
}

/// Count keys per leading `prefix_length` characters, ordered by descending
/// count then prefix. Keys shorter than the prefix form their own group.
pub fn group_by_prefix(set: &RecordSet, prefix_length: usize) -> Vec<PrefixCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in set.iter() {
        let prefix: String = key.chars().take(prefix_length).collect();
        *counts.entry(prefix).or_default() += 1;
    }

    let mut grouped: Vec<PrefixCount> = counts
        .into_iter()
        .map(|(prefix, count)| PrefixCount { prefix, count })
        .collect();
    grouped.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.prefix.cmp(&b.prefix)));
    grouped
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonPrefix {
    pub prefix: String,
    pub left: usize,
    pub right: usize,
}

/// Prefixes present in both groupings, sorted by prefix.
pub fn common_prefixes(left: &[PrefixCount], right: &[PrefixCount]) -> Vec<CommonPrefix> {
    let right: BTreeMap<&str, usize> = right
        .iter()
        .map(|group| (group.prefix.as_str(), group.count))
        .collect();
    let mut common: Vec<CommonPrefix> = left
        .iter()
        .filter_map(|group| {
            right.get(group.prefix.as_str()).map(|&count| CommonPrefix {
                prefix: group.prefix.clone(),
                left: group.count,
                right: count,
            })
        })
        .collect();
    common.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    common
}

/// Outcome of comparing the tabular set (left) with the literal set (right).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub left_total: usize,
    pub right_total: usize,
    pub matching: RecordSet,
    pub only_left: RecordSet,
    pub only_right: RecordSet,
}

/// Closing line of the comparison report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every left key is on the right and the right has nothing extra.
    PerfectMatch,
    /// Every left key is on the right, which also has extra keys.
    CoveredWithExtras,
    Partial,
    NoMatch,
}

/// Closing advice of the detailed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// More left keys are missing from the right than are matched.
    RegenerateLiteral,
    /// Some left keys are missing, but fewer than are matched.
    PartiallyMissing,
    /// The right holds keys that are not in the left.
    ReviewExtras,
    InSync,
}

impl Comparison {
    pub fn between(left: &RecordSet, right: &RecordSet) -> Self {
        Self {
            left_total: left.len(),
            right_total: right.len(),
            matching: intersect(left, right),
            only_left: difference(left, right),
            only_right: difference(right, left),
        }
    }

    /// Matching keys as a percentage of the left set. None when the left set is empty.
    pub fn match_percentage(&self) -> Option<f64> {
        if self.left_total == 0 {
            return None;
        }
        Some(self.matching.len() as f64 / self.left_total as f64 * 100.0)
    }

    pub fn verdict(&self) -> Verdict {
        let all_left_matched = self.matching.len() == self.left_total;
        if all_left_matched && self.only_right.is_empty() {
            Verdict::PerfectMatch
        } else if all_left_matched {
            Verdict::CoveredWithExtras
        } else if !self.matching.is_empty() {
            Verdict::Partial
        } else {
            Verdict::NoMatch
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        if self.only_left.len() > self.matching.len() {
            Recommendation::RegenerateLiteral
        } else if !self.only_right.is_empty() {
            Recommendation::ReviewExtras
        } else if !self.only_left.is_empty() {
            Recommendation::PartiallyMissing
        } else {
            Recommendation::InSync
        }
    }
}
