pub mod addr;
pub mod decode;
pub mod error;
pub mod loader;
pub mod mac;
pub mod probe;
pub mod report;
pub mod settings;
pub mod topology;
pub mod validator;
pub mod violation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ConfigError;
pub use loader::load_config;
pub use mac::{MacAddr, MacGenerator, RandomMac};
pub use probe::{LocalFs, PathProbe};
pub use report::ValidationReport;
pub use settings::{LinkCheckScope, Settings};
pub use topology::*;
pub use validator::{Validator, validate};
pub use violation::{EntityPath, Violation, ViolationKind};
