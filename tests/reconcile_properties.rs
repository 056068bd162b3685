//! Set-algebra and round-trip properties over deterministic generated inputs.

use chassis_ledger::reconcile::{difference, group_by_prefix, intersect, Comparison};
use chassis_ledger::record::{is_standard_key, RecordSet};
use chassis_ledger::render::{render_literal, RenderOptions};
use chassis_ledger::source::{extract_embedded, read_tabular, GeneratedIdTemplate};

const HEADER: &str = "Chassis No,Reg No,Vehicle Model,Received Date,City,Batch\n";
const PREFIXES: [&str; 4] = ["MD9HAPXF4GR71", "MZTL1P3062400", "P6EBE1FCK2400", "MD9HAPXF4FR71"];

/// Keys drawn from a fixed set of prefixes; `step` and `offset` vary membership.
fn keys(count: usize, step: usize, offset: usize) -> RecordSet {
    (0..count)
        .map(|i| {
            let n = i * step + offset;
            format!("{}{:04}", PREFIXES[n % PREFIXES.len()], n)
        })
        .collect()
}

fn csv_for(keys: &RecordSet) -> String {
    let mut csv = String::from(HEADER);
    for (i, key) in keys.iter().enumerate() {
        csv.push_str(&format!(
            "{key},KA01AQ{i:04},Quantum,22-Nov-24,BLR,BLR_Batch {}_200\n",
            i % 3
        ));
    }
    csv
}

fn sample_pairs() -> Vec<(RecordSet, RecordSet)> {
    vec![
        (keys(40, 1, 0), keys(40, 2, 0)),
        (keys(25, 3, 7), keys(10, 1, 0)),
        (keys(0, 1, 0), keys(12, 1, 0)),
        (keys(30, 1, 0), keys(30, 1, 0)),
        (keys(17, 5, 1), RecordSet::new()),
    ]
}

#[test]
fn intersect_is_symmetric() {
    for (a, b) in sample_pairs() {
        assert_eq!(intersect(&a, &b), intersect(&b, &a));
    }
}

#[test]
fn differences_partition_the_non_shared_keys() {
    for (a, b) in sample_pairs() {
        let shared = intersect(&a, &b);
        let left = difference(&a, &b);
        let right = difference(&b, &a);

        for key in left.iter() {
            assert!(!right.contains(key), "{key} on both sides");
            assert!(!shared.contains(key));
        }

        let union: RecordSet = a.iter().chain(b.iter()).collect();
        let rebuilt: RecordSet = left.iter().chain(right.iter()).chain(shared.iter()).collect();
        assert_eq!(rebuilt, union);
        assert_eq!(left.len() + right.len() + shared.len(), union.len());
    }
}

#[test]
fn identical_sets_are_a_full_match() {
    let a = keys(30, 1, 0);
    let comparison = Comparison::between(&a, &a);
    assert_eq!(comparison.matching, a);
    assert!(comparison.only_left.is_empty());
    assert!(comparison.only_right.is_empty());
    assert_eq!(comparison.match_percentage(), Some(100.0));
}

#[test]
fn prefix_counts_sum_to_set_size() {
    for (a, _) in sample_pairs() {
        for prefix_length in [0, 4, 8, 13, 40] {
            let groups = group_by_prefix(&a, prefix_length);
            let total: usize = groups.iter().map(|g| g.count).sum();
            assert_eq!(total, a.len());
            assert!(groups.iter().all(|g| g.count <= a.len()));
            for pair in groups.windows(2) {
                assert!(
                    pair[0].count > pair[1].count
                        || (pair[0].count == pair[1].count && pair[0].prefix < pair[1].prefix),
                    "groups out of order: {:?}",
                    pair
                );
            }
        }
    }
}

#[test]
fn tabular_set_size_matches_non_empty_key_rows() {
    let a = keys(20, 1, 0);
    let mut csv = csv_for(&a);
    csv.push_str(",KA01XX0001,Quantum,22-Nov-24,BLR,Batch\n");
    csv.push_str("  ,KA01XX0002,Quantum,22-Nov-24,BLR,Batch\n");

    let extract = read_tabular(csv.as_bytes()).expect("read");
    assert_eq!(extract.keys.len(), 20);
    assert_eq!(extract.skipped_rows, 2);
}

#[test]
fn rendered_literal_reextracts_to_the_tabular_set() {
    let a = keys(40, 3, 2);
    assert!(a.iter().all(is_standard_key));
    let direct = read_tabular(csv_for(&a).as_bytes()).expect("read");

    let text = render_literal(&direct.records, &RenderOptions::default());
    let reparsed = extract_embedded(&text, &GeneratedIdTemplate::default()).expect("extract");

    assert_eq!(reparsed.keys, direct.keys);
    assert_eq!(reparsed.records, direct.records);
}
