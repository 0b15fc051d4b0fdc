use serde::Serialize;
use serde_yaml::Value;

use crate::topology::Topology;
use crate::violation::Violation;

/// Outcome of a validation run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub normalized: Value,
    pub violations: Vec<Violation>,
    pub validators_ran: usize,
}

impl ValidationReport {
    pub fn is_successful(&self) -> bool {
        self.violations.is_empty()
    }

    /// Typed view of the normalized description. Only available when the run
    /// found no violations; a partially corrected tree is not a topology.
    pub fn topology(&self) -> anyhow::Result<Topology> {
        if !self.is_successful() {
            anyhow::bail!(
                "Topology has {} violation(s), refusing to decode it",
                self.violations.len()
            );
        }
        Topology::from_value(&self.normalized)
    }

    pub fn display(&self) {
        if self.violations.is_empty() {
            println!("✅ Topology validation passed");
            return;
        }

        println!(
            "⚠️  Found {} problem(s) in the topology:\n",
            self.violations.len()
        );
        for violation in &self.violations {
            violation.display();
        }
    }
}
