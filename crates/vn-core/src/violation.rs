use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

use crate::decode::type_name;

/// Location of an entity inside the topology description, e.g.
/// `machines.r1.interfaces.eth0.mac`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntityPath(Vec<String>);

impl EntityPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl fmt::Display) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required key is absent
    Missing,
    /// A key is present but holds the wrong shape of value
    WrongType,
    /// A literal failed domain parsing (IP, MAC, integer coercion)
    InvalidValue,
    /// Machine type outside the supported set
    UnsupportedType,
    /// Switch index outside `[0, switches)`
    OutOfRange,
    /// A name that should refer to a sibling interface does not
    DanglingReference,
    /// Host file path exists neither relative to the config dir nor absolutely
    Unresolvable,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Missing => "missing",
            ViolationKind::WrongType => "wrong-type",
            ViolationKind::InvalidValue => "invalid-value",
            ViolationKind::UnsupportedType => "unsupported-type",
            ViolationKind::OutOfRange => "out-of-range",
            ViolationKind::DanglingReference => "dangling-reference",
            ViolationKind::Unresolvable => "unresolvable",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in the topology description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: EntityPath,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(path: &EntityPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            kind,
            message: message.into(),
        }
    }

    /// `key` is required on the entity at `parent` but absent
    pub fn missing(parent: &EntityPath, key: &str) -> Self {
        Self::new(
            &parent.child(key),
            ViolationKind::Missing,
            format!("required key '{}' is missing", key),
        )
    }

    pub fn wrong_type(path: &EntityPath, expected: &str, found: &Value) -> Self {
        Self::new(
            path,
            ViolationKind::WrongType,
            format!("expected {}, found {}", expected, type_name(found)),
        )
    }

    pub fn display(&self) {
        println!("❌ {} [{}]", self.path, self.kind);
        println!("   {}", self.message);
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// A (possibly revised) entity together with the violations found while checking it
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub value: T,
    pub violations: Vec<Violation>,
}

impl<T> Checked<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            violations: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Record a violation and report it to the diagnostic sink
    pub fn fail(&mut self, violation: Violation) {
        tracing::error!(
            path = %violation.path,
            kind = %violation.kind,
            "{}",
            violation.message
        );
        self.violations.push(violation);
    }

    /// Take over the violations of a nested check and hand back its value
    pub fn absorb<U>(&mut self, other: Checked<U>) -> U {
        self.violations.extend(other.violations);
        other.value
    }

    pub fn into_parts(self) -> (T, Vec<Violation>) {
        (self.value, self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_path_renders_dotted() {
        let path = EntityPath::root()
            .child("machines")
            .child("r1")
            .child("interfaces")
            .child("eth0");
        assert_eq!(path.to_string(), "machines.r1.interfaces.eth0");
        assert_eq!(EntityPath::root().to_string(), "<root>");
    }

    #[test]
    fn missing_points_at_the_absent_key() {
        let violation = Violation::missing(&EntityPath::root().child("machines"), "type");
        assert_eq!(violation.path.to_string(), "machines.type");
        assert_eq!(violation.kind, ViolationKind::Missing);
    }

    #[test]
    fn absorb_moves_violations_up() {
        let mut outer = Checked::new(());
        let mut inner = Checked::new(7);
        inner.fail(Violation::wrong_type(
            &EntityPath::root().child("switches"),
            "an integer",
            &Value::from("two"),
        ));

        let value = outer.absorb(inner);
        assert_eq!(value, 7);
        assert!(!outer.is_clean());
        assert_eq!(outer.violations[0].message, "expected an integer, found string");
    }
}
