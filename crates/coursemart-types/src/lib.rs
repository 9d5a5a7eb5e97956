//! # coursemart-types
//!
//! Shared domain types used across the Coursemart workspace.
//!
//! - [`order`]: read-only inputs supplied by the order and catalog modules
//! - [`report`]: revenue report output shapes
//! - [`ranking`]: ranking views and pagination envelopes
//!
//! All money values are [`rust_decimal::Decimal`]. Timestamps are Unix epoch
//! seconds (UTC).
//!
//! ## Money on the wire
//!
//! `Decimal` fields serialize as JSON numbers, which serde_json carries as
//! `f64`. Whole amounts up to 2^53 (9,007,199,254,740,992) and amounts with a
//! few decimals well below that survive exactly; larger values lose precision
//! at the JSON boundary only. Arithmetic inside the engine stays exact.

pub mod order;
pub mod ranking;
pub mod report;

pub type UserId = String;
pub type CourseId = String;
pub type OrderId = String;

/// Error returned when a stored enum value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_json_precision_range() {
        let exact = [dec!(0), dec!(310000), dec!(12345.67), dec!(9007199254740992)];
        for value in exact {
            let json = serde_json::to_value(value).expect("serialize");
            assert!(json.is_number());
            let back: Decimal = serde_json::from_value(json).expect("deserialize");
            assert_eq!(back, value);
        }

        // Past 2^53 the f64 carrier rounds.
        let json = serde_json::to_value(dec!(9007199254740993)).expect("serialize");
        let back: Decimal = serde_json::from_value(json).expect("deserialize");
        assert_ne!(back, dec!(9007199254740993));
    }
    #[test]
    #[ignore] // Run manually to generate bindings
    fn export_ts_bindings() {
        use ts_rs::TS;
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bindings");
        std::fs::create_dir_all(&dir).expect("create bindings dir");
        crate::report::RevenueReport::export_all_to(&dir).expect("export report");
        crate::ranking::HotCourse::export_all_to(&dir).expect("export hot course");
        crate::ranking::TopStudent::export_all_to(&dir).expect("export top student");
        crate::ranking::TopInstructor::export_all_to(&dir).expect("export top instructor");
        crate::ranking::TopRevenueCourse::export_all_to(&dir).expect("export top course");
    }
}
