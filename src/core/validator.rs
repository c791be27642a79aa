//! Schema checks for a single input record.
//!
//! The checks run in field order `name`, `age`, `city` and the first failure
//! decides the reason. Validation has no side effects.

use crate::domain::model::{Record, Verdict};
use serde_json::Value;

pub const NAME_REASON: &str = "'name' must be non-empty string";
pub const AGE_REASON: &str = "'age' must be convertible to integer";
pub const CITY_REASON: &str = "'city' must be non-empty string";

pub fn validate(record: &Record) -> Verdict {
    if !is_non_blank(record.get("name")) {
        return Verdict::Invalid(NAME_REASON.to_string());
    }

    if parse_age(record.get("age")).is_none() {
        return Verdict::Invalid(AGE_REASON.to_string());
    }

    if !is_non_blank(record.get("city")) {
        return Verdict::Invalid(CITY_REASON.to_string());
    }

    Verdict::Valid
}

/// Plain integer conversion shared by the validator and the persister.
///
/// Accepts integers, integral floats and strings holding an integer literal
/// (surrounding whitespace and a leading sign allowed). `"30.5"`, `"abc"`,
/// booleans and missing values are rejected. Ages are stored as `i64`, so
/// literals outside the `i64` range are rejected as well.
pub fn parse_age(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn is_non_blank(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: Value, age: Value, city: Value) -> Record {
        Record::new().with("name", name).with("age", age).with("city", city)
    }

    #[test]
    fn test_valid_record() {
        let r = record(json!("Alice"), json!("30"), json!("Reno"));
        assert_eq!(validate(&r), Verdict::Valid);
    }

    #[test]
    fn test_blank_name_rejected() {
        for name in [json!(""), json!("   "), json!("\t\n"), Value::Null] {
            let r = record(name, json!("30"), json!("Reno"));
            match validate(&r) {
                Verdict::Invalid(reason) => assert!(reason.contains("name")),
                Verdict::Valid => panic!("blank name accepted"),
            }
        }
    }

    #[test]
    fn test_missing_name_rejected() {
        let r = Record::new().with("age", "30").with("city", "Reno");
        assert_eq!(validate(&r), Verdict::Invalid(NAME_REASON.to_string()));
    }

    #[test]
    fn test_age_rules() {
        assert_eq!(parse_age(Some(&json!("30"))), Some(30));
        assert_eq!(parse_age(Some(&json!(30))), Some(30));
        assert_eq!(parse_age(Some(&json!(" 42 "))), Some(42));
        assert_eq!(parse_age(Some(&json!("-3"))), Some(-3));
        assert_eq!(parse_age(Some(&json!(30.0))), Some(30));
        assert_eq!(parse_age(Some(&json!("30.5"))), None);
        assert_eq!(parse_age(Some(&json!("abc"))), None);
        assert_eq!(parse_age(Some(&json!(""))), None);
        assert_eq!(parse_age(Some(&json!(true))), None);
        assert_eq!(parse_age(Some(&Value::Null)), None);
        assert_eq!(parse_age(None), None);
    }

    #[test]
    fn test_age_outside_i64_range_rejected() {
        assert_eq!(
            parse_age(Some(&json!("9223372036854775807"))),
            Some(i64::MAX)
        );
        assert_eq!(parse_age(Some(&json!("99999999999999999999"))), None);

        let r = record(json!("Dana"), json!("99999999999999999999"), json!("Reno"));
        assert_eq!(validate(&r), Verdict::Invalid(AGE_REASON.to_string()));
    }

    #[test]
    fn test_bad_age_mentions_age() {
        let missing = Record::new().with("name", "Bob").with("city", "Reno");
        let garbage = record(json!("Bob"), json!("abc"), json!("Reno"));
        let fractional = record(json!("Bob"), json!("30.5"), json!("Reno"));

        for r in [missing, garbage, fractional] {
            match validate(&r) {
                Verdict::Invalid(reason) => assert!(reason.contains("age")),
                Verdict::Valid => panic!("bad age accepted: {:?}", r),
            }
        }
    }

    #[test]
    fn test_numeric_age_accepted() {
        let r = record(json!("Bob"), json!(30), json!("Reno"));
        assert!(validate(&r).is_valid());
    }

    #[test]
    fn test_blank_city_rejected() {
        let r = record(json!("Bob"), json!("30"), json!(" "));
        assert_eq!(validate(&r), Verdict::Invalid(CITY_REASON.to_string()));
    }

    #[test]
    fn test_first_failure_wins() {
        let r = record(json!(""), json!("abc"), json!(""));
        assert_eq!(validate(&r), Verdict::Invalid(NAME_REASON.to_string()));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let r = record(json!("Carol"), json!("x1"), json!("Austin"));
        assert_eq!(validate(&r), validate(&r));
    }
}
