//! IP literal parsing primitives
//!
//! Interface literals are an address with an optional prefix (`10.0.0.1/24`,
//! `fd00::1/64`). A missing prefix means a host prefix. IPv4 interfaces also
//! accept a dotted netmask or hostmask after the slash. Network literals are
//! interface literals with the host bits cleared.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrParseError {
    #[error("'{0}' is not a valid IPv4 address")]
    InvalidIpv4(String),

    #[error("'{0}' is not a valid IPv6 address")]
    InvalidIpv6(String),

    #[error("'{0}' is not a valid IPv4 or IPv6 address")]
    InvalidAddress(String),

    #[error("'{prefix}' is not a valid prefix for '{literal}'")]
    InvalidPrefix { literal: String, prefix: String },

    #[error("'{0}' has host bits set")]
    HostBitsSet(String),
}

fn split_prefix(literal: &str) -> (&str, Option<&str>) {
    match literal.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (literal, None),
    }
}

fn decimal_prefix(prefix: &str, max: u8) -> Option<u8> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse::<u8>().ok().filter(|len| *len <= max)
}

/// Prefix length of a contiguous dotted netmask (255.255.255.0) or hostmask (0.0.0.255)
fn mask_prefix(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    if bits.leading_ones() + bits.trailing_zeros() == 32 {
        return Some(bits.leading_ones() as u8);
    }
    let inverted = !bits;
    if inverted.leading_ones() + inverted.trailing_zeros() == 32 {
        return Some(inverted.leading_ones() as u8);
    }
    None
}

pub fn parse_ipv4_interface(literal: &str) -> Result<Ipv4Net, AddrParseError> {
    let (addr, prefix) = split_prefix(literal);
    let ip: Ipv4Addr = addr
        .parse()
        .map_err(|_| AddrParseError::InvalidIpv4(literal.to_string()))?;

    let Some(prefix) = prefix else {
        return Ok(Ipv4Net::from(ip));
    };

    let len = decimal_prefix(prefix, 32)
        .or_else(|| prefix.parse::<Ipv4Addr>().ok().and_then(mask_prefix))
        .ok_or_else(|| AddrParseError::InvalidPrefix {
            literal: literal.to_string(),
            prefix: prefix.to_string(),
        })?;

    Ipv4Net::new(ip, len).map_err(|_| AddrParseError::InvalidPrefix {
        literal: literal.to_string(),
        prefix: prefix.to_string(),
    })
}

pub fn parse_ipv6_interface(literal: &str) -> Result<Ipv6Net, AddrParseError> {
    let (addr, prefix) = split_prefix(literal);
    let ip: Ipv6Addr = addr
        .parse()
        .map_err(|_| AddrParseError::InvalidIpv6(literal.to_string()))?;

    let Some(prefix) = prefix else {
        return Ok(Ipv6Net::from(ip));
    };

    let len = decimal_prefix(prefix, 128).ok_or_else(|| AddrParseError::InvalidPrefix {
        literal: literal.to_string(),
        prefix: prefix.to_string(),
    })?;

    Ipv6Net::new(ip, len).map_err(|_| AddrParseError::InvalidPrefix {
        literal: literal.to_string(),
        prefix: prefix.to_string(),
    })
}

/// Interface literal of either family
pub fn parse_ip_interface(literal: &str) -> Result<IpNet, AddrParseError> {
    if let Ok(net) = parse_ipv4_interface(literal) {
        return Ok(IpNet::V4(net));
    }
    if let Ok(net) = parse_ipv6_interface(literal) {
        return Ok(IpNet::V6(net));
    }
    Err(AddrParseError::InvalidAddress(literal.to_string()))
}

/// Network literal of either family; host bits must be zero
pub fn parse_ip_network(literal: &str) -> Result<IpNet, AddrParseError> {
    let net = parse_ip_interface(literal)?;
    if net.addr() != net.network() {
        return Err(AddrParseError::HostBitsSet(literal.to_string()));
    }
    Ok(net)
}

/// Bare address of either family, no prefix allowed
pub fn parse_ip_address(literal: &str) -> Result<IpAddr, AddrParseError> {
    literal
        .parse()
        .map_err(|_| AddrParseError::InvalidAddress(literal.to_string()))
}
