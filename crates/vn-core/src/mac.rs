use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Six hex octets separated by `:` or `-`
static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})$").expect("MAC pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid MAC address")]
pub struct MacParseError(pub String);

/// A 6-octet hardware address, rendered as lowercase colon-separated hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Whether `literal` matches the canonical hex-pair pattern
    pub fn is_canonical(literal: &str) -> bool {
        MAC_PATTERN.is_match(literal)
    }

    /// Random unicast, locally administered address
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut octets: [u8; 6] = rng.r#gen();
        octets[0] = (octets[0] | 0x02) & 0xfe;
        Self(octets)
    }
}

impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        if !Self::is_canonical(literal) {
            return Err(MacParseError(literal.to_string()));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(literal.split([':', '-'])) {
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| MacParseError(literal.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of MAC addresses for interfaces that do not declare one
pub trait MacGenerator {
    fn generate(&mut self) -> MacAddr;
}

/// Draws addresses from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMac;

impl MacGenerator for RandomMac {
    fn generate(&mut self) -> MacAddr {
        MacAddr::random(&mut rand::thread_rng())
    }
}
