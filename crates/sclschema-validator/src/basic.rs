//! Value validation for the built-in basic types.
//!
//! Each type's rule is fixed by the standard, not data-driven. Types the
//! engine has no content rule for accept every value but surface a
//! `not-implemented` warning so the gap stays visible.

use sclschema_core::{BasicType, LeafValue, SourceLocation};

use crate::{count_errors, Diagnostic, Severity};

/// Active ISO 4217 alphabetic currency codes, sorted for binary search.
const CURRENCY_CODES: &[&str] = &[
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
    "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BOV", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD",
    "CAD", "CDF", "CHE", "CHF", "CHW", "CLF", "CLP", "CNY", "COP", "COU", "CRC", "CUC", "CUP",
    "CVE", "CZK", "DJF", "DKK", "DOP", "DZD", "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP",
    "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ", "GYD", "HKD", "HNL", "HRK", "HTG", "HUF", "IDR",
    "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD", "JPY", "KES", "KGS", "KHR", "KMF", "KPW",
    "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR", "LRD", "LSL", "LYD", "MAD", "MDL", "MGA",
    "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR", "MWK", "MXN", "MXV", "MYR", "MZN", "NAD",
    "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN", "PGK", "PHP", "PKR", "PLN", "PYG",
    "QAR", "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR", "SDG", "SEK", "SGD", "SHP", "SLE",
    "SLL", "SOS", "SRD", "SSP", "STN", "SVC", "SYP", "SZL", "THB", "TJS", "TMT", "TND", "TOP",
    "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "USN", "UYI", "UYU", "UYW", "UZS", "VED",
    "VES", "VND", "VUV", "WST", "XAF", "XAG", "XAU", "XBA", "XBB", "XBC", "XBD", "XCD", "XDR",
    "XOF", "XPD", "XPF", "XPT", "XSU", "XTS", "XUA", "XXX", "YER", "ZAR", "ZMW", "ZWL",
];

/// Validator for raw string values against the built-in basic types.
pub struct BasicTypeValidator;

impl BasicTypeValidator {
    /// Create a new basic type validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a leaf occurrence against the basic type its slot declares.
    ///
    /// A declared-type mismatch (the leaf's `btype` tag differs from the
    /// expected type name) is reported separately from value-content
    /// errors; the values are still checked against the expected type.
    pub fn validate_leaf(
        &self,
        expected: BasicType,
        leaf: &LeafValue,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        let errors_before = count_errors(issues);

        if leaf.btype != expected.name() {
            issues.push(Diagnostic {
                severity: Severity::Error,
                code: "type-mismatch".to_string(),
                message: format!(
                    "attribute '{}' declares type '{}', but the schema requires basic type '{}'",
                    element, leaf.btype, expected
                ),
                element: element.to_string(),
                location: Some(location),
            });
        }

        for raw in &leaf.values {
            self.validate_value(expected, raw, element, location, issues);
        }

        count_errors(issues) == errors_before
    }

    /// Validate one raw string value against a basic type.
    pub fn validate_value(
        &self,
        expected: BasicType,
        raw: &str,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        let errors_before = count_errors(issues);
        let value = raw.trim();

        match expected {
            BasicType::Boolean => {
                if !matches!(value, "0" | "1" | "false" | "true") {
                    self.value_error(
                        expected,
                        raw,
                        "must be one of 0, 1, false, true",
                        element,
                        location,
                        issues,
                    );
                }
            }
            BasicType::Int8 => self.check_signed::<i8>(expected, value, element, location, issues),
            BasicType::Int16 => {
                self.check_signed::<i16>(expected, value, element, location, issues)
            }
            BasicType::Int32 => {
                self.check_signed::<i32>(expected, value, element, location, issues)
            }
            BasicType::Int64 => {
                self.check_signed::<i64>(expected, value, element, location, issues)
            }
            BasicType::Int8U => self.check_unsigned(expected, value, 255, element, location, issues),
            BasicType::Int16U => {
                self.check_unsigned(expected, value, 65_535, element, location, issues)
            }
            BasicType::Int32U => {
                self.check_unsigned(expected, value, 4_294_967_295, element, location, issues)
            }
            BasicType::Float32 => {
                if value.parse::<f32>().is_err() {
                    self.value_error(
                        expected,
                        raw,
                        "is not a valid IEEE-754 single-precision number",
                        element,
                        location,
                        issues,
                    );
                }
            }
            BasicType::Octet64 => self.check_length(expected, raw, 64, element, location, issues),
            BasicType::VisString64 => {
                self.check_length(expected, raw, 64, element, location, issues)
            }
            BasicType::VisString129 => {
                self.check_length(expected, raw, 129, element, location, issues)
            }
            BasicType::VisString255 => {
                self.check_length(expected, raw, 255, element, location, issues)
            }
            BasicType::Unicode255 => {
                self.check_length(expected, raw, 255, element, location, issues)
            }
            BasicType::Currency => {
                if CURRENCY_CODES.binary_search(&value).is_err() {
                    self.value_error(
                        expected,
                        raw,
                        "is not an ISO 4217 currency code",
                        element,
                        location,
                        issues,
                    );
                }
            }
            BasicType::PhyComAddr
            | BasicType::ObjRef
            | BasicType::EntryId
            | BasicType::Timestamp
            | BasicType::Quality
            | BasicType::EntryTime
            | BasicType::TrgOps
            | BasicType::OptFlds
            | BasicType::SvOptFlds
            | BasicType::Check
            | BasicType::Tcmd
            | BasicType::Dbpos => {
                issues.push(Diagnostic {
                    severity: Severity::Warning,
                    code: "not-implemented".to_string(),
                    message: format!(
                        "value validation for basic type '{}' is not implemented; value '{}' accepted",
                        expected, raw
                    ),
                    element: element.to_string(),
                    location: Some(location),
                });
            }
        }

        count_errors(issues) == errors_before
    }

    fn check_signed<T: std::str::FromStr>(
        &self,
        expected: BasicType,
        value: &str,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) {
        if value.parse::<T>().is_err() {
            self.value_error(
                expected,
                value,
                "is not a valid signed integer of this width",
                element,
                location,
                issues,
            );
        }
    }

    fn check_unsigned(
        &self,
        expected: BasicType,
        value: &str,
        max: u64,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) {
        match value.parse::<i64>() {
            Err(_) => self.value_error(
                expected,
                value,
                "is not a valid integer",
                element,
                location,
                issues,
            ),
            Ok(parsed) => {
                if parsed < 0 || parsed as u64 > max {
                    issues.push(Diagnostic {
                        severity: Severity::Error,
                        code: "value-range".to_string(),
                        message: format!(
                            "value '{}' of attribute '{}' is outside the range 0..={} of basic type '{}'",
                            value, element, max, expected
                        ),
                        element: element.to_string(),
                        location: Some(location),
                    });
                }
            }
        }
    }

    fn check_length(
        &self,
        expected: BasicType,
        raw: &str,
        max_bytes: usize,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) {
        if raw.len() > max_bytes {
            issues.push(Diagnostic {
                severity: Severity::Error,
                code: "value-length".to_string(),
                message: format!(
                    "value of attribute '{}' is {} bytes long, exceeding the {}-byte bound of basic type '{}'",
                    element,
                    raw.len(),
                    max_bytes,
                    expected
                ),
                element: element.to_string(),
                location: Some(location),
            });
        }
    }

    fn value_error(
        &self,
        expected: BasicType,
        raw: &str,
        reason: &str,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) {
        issues.push(Diagnostic {
            severity: Severity::Error,
            code: "value-parse".to_string(),
            message: format!(
                "value '{}' of attribute '{}' {} (basic type '{}')",
                raw, element, reason, expected
            ),
            element: element.to_string(),
            location: Some(location),
        });
    }
}

impl Default for BasicTypeValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(expected: BasicType, raw: &str) -> Vec<Diagnostic> {
        let validator = BasicTypeValidator::new();
        let mut issues = Vec::new();
        validator.validate_value(expected, raw, "SPS.q", SourceLocation::new(1, 1), &mut issues);
        issues
    }

    #[test]
    fn test_currency_codes_sorted() {
        let mut sorted = CURRENCY_CODES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, CURRENCY_CODES);
    }

    #[test]
    fn test_boolean() {
        for ok in ["0", "1", "false", "true"] {
            assert!(validate(BasicType::Boolean, ok).is_empty());
        }
        let issues = validate(BasicType::Boolean, "TRUE");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "value-parse");
    }

    #[test]
    fn test_int8u_range() {
        assert!(validate(BasicType::Int8U, "255").is_empty());
        assert!(validate(BasicType::Int8U, "0").is_empty());

        let issues = validate(BasicType::Int8U, "256");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "value-range");

        let issues = validate(BasicType::Int8U, "-1");
        assert_eq!(issues[0].code, "value-range");

        let issues = validate(BasicType::Int8U, "abc");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "value-parse");
    }

    #[test]
    fn test_int32u_range() {
        assert!(validate(BasicType::Int32U, "4294967295").is_empty());
        let issues = validate(BasicType::Int32U, "4294967296");
        assert_eq!(issues[0].code, "value-range");
    }

    #[test]
    fn test_signed_widths() {
        assert!(validate(BasicType::Int8, "-128").is_empty());
        assert!(!validate(BasicType::Int8, "128").is_empty());
        assert!(validate(BasicType::Int16, "-32768").is_empty());
        assert!(!validate(BasicType::Int16, "40000").is_empty());
        assert!(validate(BasicType::Int64, "-9223372036854775808").is_empty());
        assert!(!validate(BasicType::Int64, "not-a-number").is_empty());
    }

    #[test]
    fn test_float32() {
        assert!(validate(BasicType::Float32, "3.14").is_empty());
        assert!(validate(BasicType::Float32, "-1e9").is_empty());
        let issues = validate(BasicType::Float32, "1.2.3");
        assert_eq!(issues[0].code, "value-parse");
    }

    #[test]
    fn test_string_lengths() {
        assert!(validate(BasicType::VisString64, &"x".repeat(64)).is_empty());
        let issues = validate(BasicType::VisString64, &"x".repeat(65));
        assert_eq!(issues[0].code, "value-length");

        assert!(validate(BasicType::VisString255, &"y".repeat(255)).is_empty());
        assert!(!validate(BasicType::VisString129, &"y".repeat(130)).is_empty());

        // byte length, not character count
        let issues = validate(BasicType::Octet64, &"é".repeat(33));
        assert_eq!(issues[0].code, "value-length");
    }

    #[test]
    fn test_currency() {
        assert!(validate(BasicType::Currency, "EUR").is_empty());
        assert!(validate(BasicType::Currency, "USD").is_empty());
        let issues = validate(BasicType::Currency, "EURO");
        assert_eq!(issues[0].code, "value-parse");
    }

    #[test]
    fn test_not_implemented_types_warn() {
        let issues = validate(BasicType::Quality, "anything");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].code, "not-implemented");

        let issues = validate(BasicType::Timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(issues[0].code, "not-implemented");
    }

    #[test]
    fn test_leaf_type_mismatch_reported_separately() {
        let validator = BasicTypeValidator::new();
        let mut issues = Vec::new();
        let leaf = LeafValue::basic("INT16", vec!["300".to_string()]);
        let ok = validator.validate_leaf(
            BasicType::Int8U,
            &leaf,
            "GGIO.intIn",
            SourceLocation::new(3, 1),
            &mut issues,
        );
        assert!(!ok);
        // one mismatch for the declared type, one range error for the value
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, "type-mismatch");
        assert_eq!(issues[1].code, "value-range");
    }

    #[test]
    fn test_leaf_matching_declaration() {
        let validator = BasicTypeValidator::new();
        let mut issues = Vec::new();
        let leaf = LeafValue::basic("BOOLEAN", vec!["true".to_string()]);
        let ok = validator.validate_leaf(
            BasicType::Boolean,
            &leaf,
            "SPS.stVal",
            SourceLocation::new(2, 1),
            &mut issues,
        );
        assert!(ok, "unexpected issues: {issues:?}");
    }
}
