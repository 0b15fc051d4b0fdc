//! Validation and normalization of topology descriptions.
//!
//! [`Validator`] walks a raw description, records every structural and
//! semantic violation it finds, and builds a normalized copy with generated
//! MAC addresses, coerced VLAN ids, rewritten `default` routes and absolute
//! host file paths. Validation never fails with an error: the outcome is the
//! list of violations, and the run is successful when that list is empty.

mod bridge;
mod files;
mod interface;
mod machine;
mod route;
mod switches;
mod veth;
mod vlan;

#[cfg(test)]
mod tests;

pub use route::{DEFAULT_ROUTE, DEFAULT_ROUTE_ALIAS};

use serde_yaml::Value;
use std::fmt;
use std::path::Path;

use crate::mac::{MacGenerator, RandomMac};
use crate::probe::{LocalFs, PathProbe};
use crate::report::ValidationReport;
use crate::settings::Settings;
use crate::violation::{Checked, Violation};

/// What every checker may consult besides the entity it checks
pub(crate) struct Context<'a> {
    pub settings: &'a Settings,
    /// Declared switch count, when it is a non-negative integer
    pub switches: Option<i64>,
    pub config_dir: Option<&'a Path>,
    pub probe: &'a dyn PathProbe,
}

impl<'a> Context<'a> {
    pub fn new(
        settings: &'a Settings,
        switches: Option<i64>,
        config_dir: Option<&'a Path>,
        probe: &'a dyn PathProbe,
    ) -> Self {
        Self {
            settings,
            switches,
            config_dir,
            probe,
        }
    }
}

pub struct Validator {
    config: Value,
    normalized: Value,
    violations: Vec<Violation>,
    validators_ran: usize,
    settings: Settings,
    macs: Box<dyn MacGenerator>,
    probe: Box<dyn PathProbe>,
}

impl Validator {
    /// Keep a private copy of `config`; it is never modified
    pub fn new(config: &Value) -> Self {
        Self {
            config: config.clone(),
            normalized: config.clone(),
            violations: Vec::new(),
            validators_ran: 0,
            settings: Settings::default(),
            macs: Box::new(RandomMac),
            probe: Box::new(LocalFs),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_mac_generator(mut self, generator: impl MacGenerator + 'static) -> Self {
        self.macs = Box::new(generator);
        self
    }

    pub fn with_path_probe(mut self, probe: impl PathProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Run all checkers against the stored description.
    ///
    /// Violations and the normalized copy start over from the original
    /// description on every call; the validator counter keeps accumulating.
    pub fn run(&mut self) {
        self.violations.clear();
        self.normalized = self.config.clone();

        self.validate_switches();
        self.validate_machines();
        if self.config.get("veths").is_some() {
            self.validate_veths();
        }

        if self.is_successful() {
            tracing::info!("Topology validation passed ({} checkers run)", self.validators_ran);
        } else {
            tracing::warn!(
                "Topology validation found {} violation(s)",
                self.violations.len()
            );
        }
    }

    pub fn validate_switches(&mut self) {
        self.validators_ran += 1;
        let checked = switches::check_switches(&self.config);
        self.record(checked);
    }

    pub fn validate_machines(&mut self) {
        self.validators_ran += 1;

        let config_dir = self.config.get("config_dir").and_then(Value::as_str);
        if config_dir.is_none() {
            tracing::warn!("No config_dir set, relative host file paths will not be resolved");
        }

        let ctx = Context::new(
            &self.settings,
            switches::switch_count(&self.config),
            config_dir.map(Path::new),
            self.probe.as_ref(),
        );
        let run_clean = self.violations.is_empty();
        let checked = machine::check_machines(
            self.config.get("machines"),
            &ctx,
            self.macs.as_mut(),
            run_clean,
        );

        if let Some(machines) = self.record(checked) {
            if let Value::Mapping(root) = &mut self.normalized {
                root.insert(Value::from("machines"), Value::Mapping(machines));
            }
        }
    }

    /// Check the `veths` section. [`Validator::run`] only calls this when the
    /// section exists; a direct call without one only logs a warning.
    pub fn validate_veths(&mut self) {
        self.validators_ran += 1;

        let Some(veths) = self.config.get("veths") else {
            tracing::warn!("Tried to validate veth config, but no veth config present, skipping");
            return;
        };
        let checked = veth::check_veths(veths);
        self.record(checked);
    }

    fn record<T>(&mut self, checked: Checked<T>) -> T {
        let (value, violations) = checked.into_parts();
        self.violations.extend(violations);
        value
    }

    pub fn is_successful(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn normalized(&self) -> &Value {
        &self.normalized
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn validators_ran(&self) -> usize {
        self.validators_ran
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            normalized: self.normalized.clone(),
            violations: self.violations.clone(),
            validators_ran: self.validators_ran,
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VNet config validator, current_state: {}, amount of validators run: {}",
            if self.is_successful() { "OK" } else { "NOT OK" },
            self.validators_ran
        )
    }
}

/// Validate `config` with the default settings and capabilities
pub fn validate(config: &Value) -> ValidationReport {
    let mut validator = Validator::new(config);
    validator.run();
    validator.report()
}
