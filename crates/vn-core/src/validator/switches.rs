use serde_yaml::Value;

use crate::decode::{as_int, read_int};
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// `switches` must be present and hold a non-negative integer
pub(crate) fn check_switches(config: &Value) -> Checked<()> {
    let mut out = Checked::new(());
    let root = EntityPath::root();

    match config.get("switches") {
        None => out.fail(Violation::missing(&root, "switches")),
        Some(value) => match read_int(&root.child("switches"), value, "an integer") {
            Err(violation) => out.fail(violation),
            Ok(count) if count < 0 => out.fail(Violation::new(
                &root.child("switches"),
                ViolationKind::OutOfRange,
                format!("switch count {} is negative", count),
            )),
            Ok(_) => {}
        },
    }

    out
}

/// The declared switch count, if it is usable for bounds checks
pub(crate) fn switch_count(config: &Value) -> Option<i64> {
    config
        .get("switches")
        .and_then(as_int)
        .filter(|count| *count >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::yaml;

    #[test]
    fn test_valid_switch_count() {
        assert!(check_switches(&yaml("switches: 2")).is_clean());
        assert!(check_switches(&yaml("switches: 0")).is_clean());
        assert_eq!(switch_count(&yaml("switches: 2")), Some(2));
    }

    #[test]
    fn test_missing_switches() {
        let checked = check_switches(&yaml("machines: {}"));
        assert_eq!(checked.violations[0].kind, ViolationKind::Missing);
        assert_eq!(checked.violations[0].path.to_string(), "switches");
        assert_eq!(switch_count(&yaml("machines: {}")), None);
    }

    #[test]
    fn test_non_integer_switches() {
        for doc in ["switches: two", "switches: 2.5", "switches: '2'", "switches: [2]"] {
            let checked = check_switches(&yaml(doc));
            assert_eq!(checked.violations.len(), 1, "{}", doc);
            assert_eq!(checked.violations[0].kind, ViolationKind::WrongType);
        }
    }

    #[test]
    fn test_oversized_switch_count() {
        let checked = check_switches(&yaml("switches: 18446744073709551615"));
        assert_eq!(checked.violations.len(), 1);
        assert_eq!(checked.violations[0].kind, ViolationKind::OutOfRange);
        assert!(checked.violations[0].message.contains("too large"));
        assert_eq!(switch_count(&yaml("switches: 18446744073709551615")), None);
    }

    #[test]
    fn test_negative_switches() {
        let checked = check_switches(&yaml("switches: -1"));
        assert_eq!(checked.violations[0].kind, ViolationKind::OutOfRange);
        assert_eq!(switch_count(&yaml("switches: -1")), None);
    }
}
