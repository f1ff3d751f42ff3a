//! Directory lookup and search functionality
//!
//! This module provides the query surface over the built index: exact
//! pincode lookups, office-name substring search, district/state exact
//! lookups, pincode/office validation, and aggregate statistics. All
//! methods are pure reads against immutable state.

use super::DirectoryIndex;
use super::metadata::DirectoryStats;
use crate::app::models::PostalRecord;
use serde::Serialize;
use std::collections::BTreeSet;

impl DirectoryIndex {
    /// Get all offices for an exact pincode
    ///
    /// Returns an empty list (not an error) when the code is unknown.
    /// Malformed codes should be rejected by the caller with
    /// [`crate::app::models::is_valid_pincode`] before this lookup.
    pub fn by_pincode(&self, pincode: &str) -> Vec<&PostalRecord> {
        self.resolve(self.by_pincode.get(pincode))
    }

    /// Search offices by case-insensitive substring containment
    ///
    /// The term is matched against office-name keys and, redundantly,
    /// against district and state keys; the union is deduplicated by
    /// record identity, kept in source-file order and truncated to
    /// `limit`. District and state lookups by contrast are exact-match
    /// (see [`Self::by_district`]); the asymmetry is intentional.
    pub fn search_offices(&self, query: &str, limit: usize) -> Vec<&PostalRecord> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        // BTreeSet dedups across the three mappings and restores source order
        let mut hits: BTreeSet<u32> = BTreeSet::new();
        for mapping in [&self.by_office, &self.by_district, &self.by_state] {
            for (key, ids) in mapping.iter() {
                if key.contains(&term) {
                    hits.extend(ids.iter().copied());
                }
            }
        }

        hits.into_iter()
            .take(limit)
            .map(|idx| &self.records[idx as usize])
            .collect()
    }

    /// Get offices in a district by case-insensitive exact match
    pub fn by_district(&self, district: &str, limit: usize) -> Vec<&PostalRecord> {
        let key = district.trim().to_lowercase();
        self.resolve_limited(self.by_district.get(&key), limit)
    }

    /// Get offices in a state by case-insensitive exact match
    pub fn by_state(&self, state: &str, limit: usize) -> Vec<&PostalRecord> {
        let key = state.trim().to_lowercase();
        self.resolve_limited(self.by_state.get(&key), limit)
    }

    /// Validate that a pincode/office-name combination exists
    ///
    /// An unknown pincode reports "PIN code not found"; a known pincode
    /// with no office matching the name (case-insensitive exact equality)
    /// reports the full list of valid office names so the caller can
    /// present alternatives.
    pub fn validate_pin_office(&self, pincode: &str, office_name: &str) -> ValidationOutcome {
        let offices = self.by_pincode(pincode);
        if offices.is_empty() {
            return ValidationOutcome::pincode_not_found();
        }

        let wanted = office_name.trim().to_lowercase();
        match offices
            .iter()
            .find(|o| o.office_name.to_lowercase() == wanted)
        {
            Some(matched) => ValidationOutcome::matched((*matched).clone()),
            None => ValidationOutcome::office_mismatch(
                offices.iter().map(|o| o.office_name.clone()).collect(),
            ),
        }
    }

    /// Aggregate statistics for the built index
    pub fn stats(&self) -> DirectoryStats {
        DirectoryStats {
            total_records: self.records.len(),
            unique_pincodes: self.by_pincode.len(),
            unique_offices: self.by_office.len(),
            unique_districts: self.by_district.len(),
            unique_states: self.by_state.len(),
            ready: true,
        }
    }

    fn resolve(&self, ids: Option<&Vec<u32>>) -> Vec<&PostalRecord> {
        ids.map(|ids| {
            ids.iter()
                .map(|idx| &self.records[*idx as usize])
                .collect()
        })
        .unwrap_or_default()
    }

    fn resolve_limited(&self, ids: Option<&Vec<u32>>, limit: usize) -> Vec<&PostalRecord> {
        ids.map(|ids| {
            ids.iter()
                .take(limit)
                .map(|idx| &self.records[*idx as usize])
                .collect()
        })
        .unwrap_or_default()
    }
}

/// Result of a pincode/office validation query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    /// Whether the combination exists in the directory
    pub valid: bool,

    /// The matched record when the combination is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<PostalRecord>,

    /// Human-readable reason when the combination is invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Valid office names for the pincode, offered on a name mismatch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_offices: Option<Vec<String>>,
}

impl ValidationOutcome {
    fn matched(office: PostalRecord) -> Self {
        Self {
            valid: true,
            office: Some(office),
            message: None,
            available_offices: None,
        }
    }

    fn pincode_not_found() -> Self {
        Self {
            valid: false,
            office: None,
            message: Some("PIN code not found".to_string()),
            available_offices: None,
        }
    }

    fn office_mismatch(available_offices: Vec<String>) -> Self {
        Self {
            valid: false,
            office: None,
            message: Some("Office name does not match PIN code".to_string()),
            available_offices: Some(available_offices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{DeliveryStatus, PostalRecord};
    use std::path::PathBuf;

    fn record(office: &str, pincode: &str, district: &str, state: &str) -> PostalRecord {
        PostalRecord {
            circle: "Telangana Circle".to_string(),
            region: "Hyderabad Region".to_string(),
            division: "Adilabad Division".to_string(),
            office_name: office.to_string(),
            pincode: pincode.to_string(),
            office_type: "BO".to_string(),
            delivery: DeliveryStatus::Delivery,
            district: district.to_string(),
            state: state.to_string(),
            latitude: 19.17,
            longitude: 79.28,
        }
    }

    fn test_index() -> DirectoryIndex {
        let mut index = DirectoryIndex::new(PathBuf::from("/test"));
        index.insert(record(
            "Kothimir B.O",
            "504273",
            "Kumuram Bheem Asifabad",
            "TELANGANA",
        ));
        index.insert(record(
            "Asifabad S.O",
            "504293",
            "Kumuram Bheem Asifabad",
            "TELANGANA",
        ));
        index.insert(record("Mumbai G.P.O", "400001", "Mumbai", "MAHARASHTRA"));
        index.insert(record("Asifabad B.O", "504293", "Asifabad", "TELANGANA"));
        index
    }

    #[test]
    fn test_by_pincode_exact_only() {
        let index = test_index();

        let offices = index.by_pincode("504273");
        assert_eq!(offices.len(), 1);
        assert_eq!(offices[0].office_name, "Kothimir B.O");

        assert!(index.by_pincode("000000").is_empty());
        // Prefix of a known code is not a match
        assert!(index.by_pincode("5042").is_empty());
    }

    #[test]
    fn test_search_offices_substring_case_insensitive() {
        let index = test_index();

        let results = index.search_offices("kothimir", 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].office_name, "Kothimir B.O");

        // Same set regardless of query case
        let upper = index.search_offices("KOTHIMIR", 50);
        assert_eq!(results, upper);
    }

    #[test]
    fn test_search_offices_unions_district_and_state_keys() {
        let index = test_index();

        // "asifabad" appears in two office names, two district keys and
        // no state key; the union dedups to three distinct records
        let results = index.search_offices("asifabad", 50);
        assert_eq!(results.len(), 3);
        // Source-file order preserved
        assert_eq!(results[0].office_name, "Kothimir B.O");
        assert_eq!(results[1].office_name, "Asifabad S.O");
        assert_eq!(results[2].office_name, "Asifabad B.O");

        // State containment pulls in every Telangana record
        let results = index.search_offices("telangana", 50);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_search_offices_limit_and_blank_query() {
        let index = test_index();

        let results = index.search_offices("asifabad", 2);
        assert_eq!(results.len(), 2);

        assert!(index.search_offices("   ", 50).is_empty());
        assert!(index.search_offices("zzz-no-such-office", 50).is_empty());
    }

    #[test]
    fn test_district_search_is_exact_not_substring() {
        let index = test_index();

        // "Asifabad" alone must not match "Kumuram Bheem Asifabad"
        let results = index.by_district("Asifabad", 100);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].office_name, "Asifabad B.O");

        let results = index.by_district("kumuram bheem asifabad", 100);
        assert_eq!(results.len(), 2);

        let results = index.by_district("KUMURAM BHEEM ASIFABAD", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_state_search_is_exact_case_insensitive() {
        let index = test_index();

        assert_eq!(index.by_state("telangana", 100).len(), 3);
        assert_eq!(index.by_state("TELANGANA", 100).len(), 3);
        assert_eq!(index.by_state("maharashtra", 100).len(), 1);
        assert!(index.by_state("telan", 100).is_empty());
    }

    #[test]
    fn test_validate_pin_office() {
        let index = test_index();

        let outcome = index.validate_pin_office("504273", "kothimir b.o");
        assert!(outcome.valid);
        assert_eq!(outcome.office.unwrap().office_name, "Kothimir B.O");
        assert!(outcome.available_offices.is_none());

        let outcome = index.validate_pin_office("999999", "Kothimir B.O");
        assert!(!outcome.valid);
        assert_eq!(outcome.message.as_deref(), Some("PIN code not found"));
        assert!(outcome.available_offices.is_none());

        let outcome = index.validate_pin_office("504293", "Kothimir B.O");
        assert!(!outcome.valid);
        assert_eq!(
            outcome.available_offices.unwrap(),
            vec!["Asifabad S.O".to_string(), "Asifabad B.O".to_string()]
        );
    }

    #[test]
    fn test_stats() {
        let index = test_index();
        let stats = index.stats();

        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.unique_pincodes, 3);
        assert_eq!(stats.unique_offices, 4);
        assert_eq!(stats.unique_districts, 3);
        assert_eq!(stats.unique_states, 2);
        assert!(stats.ready);
    }
}
