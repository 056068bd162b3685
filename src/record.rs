//! Vehicle records and chassis-number sets shared by both sources.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Status stamped on every record converted from the tabular inventory.
pub const DEFAULT_STATUS: &str = "Received";

/// Length of a conforming chassis number.
pub const CHASSIS_NO_LEN: usize = 17;

/// Object-literal field names, in the order the renderer emits them.
pub const LITERAL_FIELDS: [&str; 7] = [
    "chassisNo",
    "regNo",
    "vehicleModel",
    "receivedDate",
    "city",
    "batch",
    "status",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub chassis_no: String,
    pub reg_no: String,
    pub vehicle_model: String,
    pub received_date: String,
    pub city: String,
    pub batch: String,
    pub status: String,
}

impl Record {
    /// Field values paired with their literal names, in [`LITERAL_FIELDS`] order.
    pub fn literal_fields(&self) -> [(&'static str, &str); 7] {
        [
            (LITERAL_FIELDS[0], self.chassis_no.as_str()),
            (LITERAL_FIELDS[1], self.reg_no.as_str()),
            (LITERAL_FIELDS[2], self.vehicle_model.as_str()),
            (LITERAL_FIELDS[3], self.received_date.as_str()),
            (LITERAL_FIELDS[4], self.city.as_str()),
            (LITERAL_FIELDS[5], self.batch.as_str()),
            (LITERAL_FIELDS[6], self.status.as_str()),
        ]
    }

    /// Build a record from parsed `name: value` pairs. Returns None when the
    /// pairs carry no non-empty `chassisNo`; unknown names are ignored.
    pub fn from_literal_pairs<'a, I>(pairs: I) -> Option<Record>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Record::default();
        let mut has_key = false;
        for (name, value) in pairs {
            let slot = match name {
                "chassisNo" => {
                    has_key = !value.trim().is_empty();
                    &mut record.chassis_no
                }
                "regNo" => &mut record.reg_no,
                "vehicleModel" => &mut record.vehicle_model,
                "receivedDate" => &mut record.received_date,
                "city" => &mut record.city,
                "batch" => &mut record.batch,
                "status" => &mut record.status,
                _ => continue,
            };
            *slot = value.trim().to_string();
        }
        has_key.then_some(record)
    }
}

/// True for keys following the observed chassis-number convention:
/// exactly 17 uppercase ASCII letters or digits.
pub fn is_standard_key(key: &str) -> bool {
    key.len() == CHASSIS_NO_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Ordered set of chassis numbers. Ordering keeps reports and samples stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordSet(BTreeSet<String>);

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// First `limit` keys in order, for report listings.
    pub fn sample(&self, limit: usize) -> Vec<&str> {
        self.iter().take(limit).collect()
    }

    /// Number of keys that break the 17-character convention.
    pub fn nonstandard_count(&self) -> usize {
        self.iter().filter(|key| !is_standard_key(key)).count()
    }
}

impl<S: Into<String>> FromIterator<S> for RecordSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for RecordSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Record counts grouped per model, city and batch, keyed alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub models: BTreeMap<String, usize>,
    pub cities: BTreeMap<String, usize>,
    pub batches: BTreeMap<String, usize>,
}

impl InventorySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut summary = Self::default();
        for record in records {
            *summary
                .models
                .entry(record.vehicle_model.clone())
                .or_default() += 1;
            *summary.cities.entry(record.city.clone()).or_default() += 1;
            *summary.batches.entry(record.batch.clone()).or_default() += 1;
        }
        summary
    }
}

/// Keys seen more than once, in first-repeat order, each listed once.
pub fn duplicate_keys<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut duplicates = Vec::new();
    for record in records {
        let key = record.chassis_no.as_str();
        if !seen.insert(key) && reported.insert(key) {
            duplicates.push(key.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chassis_no: &str, model: &str, city: &str, batch: &str) -> Record {
        Record {
            chassis_no: chassis_no.to_string(),
            vehicle_model: model.to_string(),
            city: city.to_string(),
            batch: batch.to_string(),
            ..Record::default()
        }
    }

    #[test]
    fn standard_key_requires_seventeen_uppercase_alphanumerics() {
        assert!(is_standard_key("MD9HAPXF4GR710037"));
        assert!(!is_standard_key("md9hapxf4gr710037"));
        assert!(!is_standard_key("AAA1111111111111"));
        assert!(!is_standard_key("MD9HAPXF4GR71003-"));
    }

    #[test]
    fn literal_pairs_require_chassis_no() {
        let built = Record::from_literal_pairs([("regNo", "KA01"), ("city", "BLR")]);
        assert!(built.is_none());

        let built = Record::from_literal_pairs([
            ("chassisNo", " MZTL1P30624001196 "),
            ("city", "BLR"),
            ("colour", "red"),
        ])
        .expect("chassisNo present");
        assert_eq!(built.chassis_no, "MZTL1P30624001196");
        assert_eq!(built.city, "BLR");
        assert!(built.status.is_empty());
    }

    #[test]
    fn summary_counts_each_dimension() {
        let records = vec![
            record("A", "Quantum", "BLR", "BLR_Batch 2_200"),
            record("B", "Quantum", "HYD", "Hyd_Batch 1_180"),
            record("C", "Lectrix", "BLR", "BLR_Batch 1_120"),
        ];
        let summary = InventorySummary::from_records(&records);
        assert_eq!(summary.models.get("Quantum"), Some(&2));
        assert_eq!(summary.models.get("Lectrix"), Some(&1));
        assert_eq!(summary.cities.get("BLR"), Some(&2));
        assert_eq!(summary.batches.len(), 3);
        let keys: Vec<_> = summary.models.keys().cloned().collect();
        assert_eq!(keys, vec!["Lectrix".to_string(), "Quantum".to_string()]);
    }

    #[test]
    fn duplicates_are_listed_once() {
        let records = vec![
            record("A", "", "", ""),
            record("B", "", "", ""),
            record("A", "", "", ""),
            record("A", "", "", ""),
        ];
        assert_eq!(duplicate_keys(&records), vec!["A".to_string()]);
        let set: RecordSet = records.iter().map(|r| r.chassis_no.clone()).collect();
        assert_eq!(set.len(), 2);
    }
}
