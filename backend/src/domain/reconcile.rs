//! Multi-source record reconciliation.
//!
//! Merges ledger fetches into one newest-first sequence. The sort is stable,
//! so records with equal (or missing) timestamps keep their input order; no
//! secondary key is defined and none is guaranteed.

use std::cmp::Reverse;

use crate::domain::transaction::TransactionRecord;

/// Merge record lists from any number of sources into one sequence ordered
/// by normalised timestamp, newest first.
///
/// Pure and restartable: inputs are never mutated, the output is a fresh
/// vector, and reconciling the same inputs twice yields identical order. A
/// record with a missing or unparseable timestamp sorts last rather than
/// failing the batch.
///
/// # Examples
/// ```
/// use amanah_backend::domain::{reconcile, TransactionRecord};
/// use serde_json::json;
///
/// let a: TransactionRecord =
///     serde_json::from_value(json!({ "id": "a", "timestamp": 100 })).unwrap();
/// let b: TransactionRecord =
///     serde_json::from_value(json!({ "id": "b", "timestamp": { "seconds": 1 } })).unwrap();
///
/// let merged = reconcile(&[vec![b], vec![a]]);
/// assert_eq!(merged[0].id, "a");
/// ```
#[must_use]
pub fn reconcile(sources: &[Vec<TransactionRecord>]) -> Vec<TransactionRecord> {
    let mut merged: Vec<TransactionRecord> = sources.iter().flatten().cloned().collect();
    merged.sort_by_key(|record| Reverse(record.sort_key()));
    merged
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::{json, Value};

    fn record(wire: Value) -> TransactionRecord {
        serde_json::from_value(wire).expect("record decodes")
    }

    fn ids(records: &[TransactionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn orders_mixed_timestamp_shapes_newest_first() {
        let sources = vec![
            vec![record(json!({ "id": "numeric", "timestamp": 100 }))],
            vec![
                record(json!({ "id": "provider", "timestamp": { "seconds": 1 } })),
                record(json!({ "id": "text", "timestamp": "1970-01-01T00:00:02Z" })),
            ],
        ];

        let merged = reconcile(&sources);
        assert_eq!(ids(&merged), vec!["numeric", "text", "provider"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let sources = vec![
            vec![
                record(json!({ "id": "a", "timestamp": { "seconds": 5 } })),
                record(json!({ "id": "b", "timestamp": { "seconds": 5 } })),
            ],
            vec![record(json!({ "id": "c", "timestamp": "2024-06-01T10:00:00Z" }))],
        ];

        let first = reconcile(&sources);
        let second = reconcile(&sources);
        assert_eq!(first, second);
    }

    #[test]
    fn every_record_appears_exactly_once_with_fields_unchanged() {
        let donation = record(json!({
            "id": "d1",
            "senderId": "u1",
            "amount": 50.0,
            "type": "donation",
            "timestamp": "2024-03-01T00:00:00Z",
            "campaign": "flood-relief"
        }));
        let zakat = record(json!({
            "id": "z1",
            "senderId": "u1",
            "amount": 120.0,
            "type": "zakat",
            "timestamp": { "seconds": 1_709_000_000 }
        }));
        let sources = vec![vec![donation.clone()], vec![zakat.clone()]];

        let merged = reconcile(&sources);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&donation));
        assert!(merged.contains(&zakat));
        // Inputs are untouched.
        assert_eq!(sources[0][0], donation);
    }

    #[test]
    fn missing_timestamps_sort_last_and_keep_input_order() {
        let sources = vec![vec![
            record(json!({ "id": "undated-1" })),
            record(json!({ "id": "dated", "timestamp": { "seconds": 10 } })),
            record(json!({ "id": "undated-2", "timestamp": "garbage" })),
        ]];

        let merged = reconcile(&sources);
        assert_eq!(ids(&merged), vec!["dated", "undated-1", "undated-2"]);
    }

    #[test]
    fn source_order_does_not_affect_output() {
        let newest = record(json!({ "id": "new", "timestamp": { "seconds": 100 } }));
        let oldest = record(json!({ "id": "old", "timestamp": { "seconds": 1 } }));

        let forward = reconcile(&[vec![oldest.clone()], vec![newest.clone()]]);
        let backward = reconcile(&[vec![newest], vec![oldest]]);
        assert_eq!(ids(&forward), ids(&backward));
    }

    #[test]
    fn empty_sources_reconcile_to_empty_output() {
        assert!(reconcile(&[]).is_empty());
        assert!(reconcile(&[vec![], vec![]]).is_empty());
    }
}
