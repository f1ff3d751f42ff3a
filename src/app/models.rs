//! Data models for the postal directory
//!
//! This module contains the core data structures for representing post-office
//! records from the All-India pincode directory dataset, together with the
//! row-level normalization rules applied before a record is admitted into
//! the index.

use crate::constants::{self, PINCODE_LENGTH};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

// =============================================================================
// Delivery Status
// =============================================================================

/// Delivery capability of a post office
///
/// Only offices flagged for direct delivery are served by the directory;
/// non-delivery administrative offices are filtered out at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Delivery,
    #[serde(rename = "Non-Delivery")]
    NonDelivery,
}

impl DeliveryStatus {
    /// Parse the delivery flag column of the dataset
    ///
    /// The dataset writes "Delivery" for delivery offices and a handful of
    /// spellings ("Non-Delivery", "Non Delivery") for the rest; anything
    /// that is not the delivery flag is treated as non-delivery.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case(constants::DELIVERY_FLAG) {
            Self::Delivery
        } else {
            Self::NonDelivery
        }
    }

    /// Whether this office performs direct delivery
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery)
    }
}

// =============================================================================
// Raw CSV Row
// =============================================================================

/// A postal directory row exactly as parsed from the source CSV
///
/// All fields are text; missing columns default to the empty string rather
/// than failing the row. Coordinates stay as literals here because the
/// dataset uses a sentinel for offices that were never geocoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub circlename: String,
    pub regionname: String,
    pub divisionname: String,
    pub officename: String,
    pub pincode: String,
    pub officetype: String,
    pub delivery: String,
    pub district: String,
    pub statename: String,
    pub latitude: String,
    pub longitude: String,
}

impl RawRecord {
    /// Apply the admission rules and produce an indexable record
    ///
    /// A row is admitted only when its delivery flag marks a delivery
    /// office and both coordinates parse to finite floats. Rows failing
    /// either rule return `None` and are skipped by the loader.
    pub fn admit(&self) -> Option<PostalRecord> {
        let delivery = DeliveryStatus::from_flag(&self.delivery);
        if !delivery.is_delivery() {
            return None;
        }

        let latitude = parse_coordinate(&self.latitude)?;
        let longitude = parse_coordinate(&self.longitude)?;

        Some(PostalRecord {
            circle: self.circlename.trim().to_string(),
            region: self.regionname.trim().to_string(),
            division: self.divisionname.trim().to_string(),
            office_name: self.officename.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            office_type: self.officetype.trim().to_string(),
            delivery,
            district: self.district.trim().to_string(),
            state: self.statename.trim().to_string(),
            latitude,
            longitude,
        })
    }
}

/// Coerce a coordinate literal to a finite float
///
/// Empty strings and the `NA` sentinel mean "not available"; unparseable
/// or non-finite literals are treated the same way.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    if constants::is_missing_value(raw) {
        return None;
    }
    f64::from_str(raw.trim()).ok().filter(|v| v.is_finite())
}

// =============================================================================
// Postal Record
// =============================================================================

/// An admitted post-office record, immutable once constructed
///
/// Every record in the index is a delivery office with known coordinates,
/// so latitude and longitude are carried as plain floats. The pincode is
/// kept as a string to preserve its leading structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalRecord {
    /// Postal circle (e.g. "Telangana Circle")
    pub circle: String,

    /// Postal region within the circle
    pub region: String,

    /// Postal division within the region
    pub division: String,

    /// Office name (e.g. "Kothimir B.O")
    pub office_name: String,

    /// 6-digit PIN code
    pub pincode: String,

    /// Office type (e.g. "BO", "SO", "HO")
    pub office_type: String,

    /// Delivery capability (always `Delivery` for indexed records)
    pub delivery: DeliveryStatus,

    /// District the office serves
    pub district: String,

    /// State the office belongs to
    pub state: String,

    /// Latitude in WGS84 decimal degrees
    pub latitude: f64,

    /// Longitude in WGS84 decimal degrees
    pub longitude: f64,
}

impl PostalRecord {
    /// Get the office location as (latitude, longitude)
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Check whether a string is a well-formed PIN code (exactly 6 digits)
///
/// Callers validate codes with this before hitting the index; the index
/// itself only ever sees exact string keys.
pub fn is_valid_pincode(code: &str) -> bool {
    static PINCODE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PINCODE_RE.get_or_init(|| {
        Regex::new(&format!("^[0-9]{{{}}}$", PINCODE_LENGTH)).expect("static pincode pattern")
    });
    re.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(delivery: &str, lat: &str, lon: &str) -> RawRecord {
        RawRecord {
            circlename: "Telangana Circle".to_string(),
            regionname: "Hyderabad City Region".to_string(),
            divisionname: "Adilabad Division".to_string(),
            officename: " Kothimir B.O ".to_string(),
            pincode: " 504273 ".to_string(),
            officetype: "BO".to_string(),
            delivery: delivery.to_string(),
            district: "Kumuram Bheem Asifabad".to_string(),
            statename: "TELANGANA".to_string(),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
        }
    }

    #[test]
    fn test_delivery_status_parsing() {
        assert_eq!(DeliveryStatus::from_flag("Delivery"), DeliveryStatus::Delivery);
        assert_eq!(DeliveryStatus::from_flag(" delivery "), DeliveryStatus::Delivery);
        assert_eq!(
            DeliveryStatus::from_flag("Non-Delivery"),
            DeliveryStatus::NonDelivery
        );
        assert_eq!(
            DeliveryStatus::from_flag("Non Delivery"),
            DeliveryStatus::NonDelivery
        );
        assert_eq!(DeliveryStatus::from_flag(""), DeliveryStatus::NonDelivery);
    }

    #[test]
    fn test_coordinate_parsing() {
        assert_eq!(parse_coordinate("19.1741"), Some(19.1741));
        assert_eq!(parse_coordinate(" 79.2861 "), Some(79.2861));
        assert_eq!(parse_coordinate("NA"), None);
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("not-a-number"), None);
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("inf"), None);
        // Zero is a parseable coordinate, not a sentinel
        assert_eq!(parse_coordinate("0"), Some(0.0));
    }

    #[test]
    fn test_admission_requires_delivery_and_coordinates() {
        let record = raw("Delivery", "19.1741", "79.2861").admit().unwrap();
        assert_eq!(record.office_name, "Kothimir B.O");
        assert_eq!(record.pincode, "504273");
        assert_eq!(record.location(), (19.1741, 79.2861));
        assert!(record.delivery.is_delivery());

        assert!(raw("Non-Delivery", "19.1741", "79.2861").admit().is_none());
        assert!(raw("Delivery", "NA", "79.2861").admit().is_none());
        assert!(raw("Delivery", "19.1741", "NA").admit().is_none());
        assert!(raw("Delivery", "", "").admit().is_none());
    }

    #[test]
    fn test_admitted_fields_are_trimmed() {
        let record = raw("Delivery", "19.1741", "79.2861").admit().unwrap();
        assert_eq!(record.pincode, "504273");
        assert_eq!(record.office_name, "Kothimir B.O");
    }

    #[test]
    fn test_pincode_format() {
        assert!(is_valid_pincode("504273"));
        assert!(is_valid_pincode("000000"));
        assert!(!is_valid_pincode("50427"));
        assert!(!is_valid_pincode("5042733"));
        assert!(!is_valid_pincode("50427a"));
        assert!(!is_valid_pincode(" 504273"));
        assert!(!is_valid_pincode(""));
    }
}
