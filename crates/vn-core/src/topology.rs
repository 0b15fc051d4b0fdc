use anyhow::Context;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::addr;
use crate::mac::MacAddr;
use crate::settings::Settings;

/// Typed view of a normalized topology description, consumed by the
/// provisioning stage once validation has succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub switches: usize,
    pub machines: BTreeMap<String, MachineSpec>,
    #[serde(default)]
    pub veths: BTreeMap<String, VethSpec>,
    #[serde(default)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    #[serde(rename = "type")]
    pub kind: String,
    /// Host path -> per-file config, passed through untouched
    #[serde(default)]
    pub files: BTreeMap<PathBuf, Value>,
    pub interfaces: BTreeMap<String, InterfaceSpec>,
    #[serde(default)]
    pub vlans: BTreeMap<String, VlanSpec>,
    #[serde(default)]
    pub bridges: BTreeMap<String, BridgeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    #[serde(default, deserialize_with = "ipv4_interface")]
    pub ipv4: Option<Ipv4Net>,
    #[serde(default, deserialize_with = "ipv6_interface")]
    pub ipv6: Option<Ipv6Net>,
    pub mac: MacAddr,
    /// Index of the switch this interface attaches to
    pub bridge: usize,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    #[serde(deserialize_with = "ip_network")]
    pub to: IpNet,
    pub via: IpAddr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlanSpec {
    pub id: i64,
    pub link: String,
    #[serde(default, deserialize_with = "ip_interfaces")]
    pub addresses: Vec<IpNet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSpec {
    #[serde(default, deserialize_with = "ipv4_interface")]
    pub ipv4: Option<Ipv4Net>,
    #[serde(default, deserialize_with = "ipv6_interface")]
    pub ipv6: Option<Ipv6Net>,
    pub slaves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VethSpec {
    pub bridge: String,
    #[serde(default)]
    pub peer: Option<String>,
    #[serde(default)]
    pub stp: Option<bool>,
}

fn ipv4_interface<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Ipv4Net>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|s| addr::parse_ipv4_interface(&s).map_err(serde::de::Error::custom))
        .transpose()
}

fn ipv6_interface<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Ipv6Net>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|s| addr::parse_ipv6_interface(&s).map_err(serde::de::Error::custom))
        .transpose()
}

fn ip_interfaces<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<IpNet>, D::Error> {
    Vec::<String>::deserialize(d)?
        .iter()
        .map(|s| addr::parse_ip_interface(s).map_err(serde::de::Error::custom))
        .collect()
}

fn ip_network<'de, D: Deserializer<'de>>(d: D) -> Result<IpNet, D::Error> {
    let literal = String::deserialize(d)?;
    addr::parse_ip_network(&literal).map_err(serde::de::Error::custom)
}

impl Topology {
    pub fn from_value(value: &Value) -> anyhow::Result<Self> {
        serde_yaml::from_value(value.clone())
            .context("Normalized topology does not match the expected schema")
    }

    /// Host bridge names backing each switch, in switch index order
    pub fn switch_names(&self, settings: &Settings) -> Vec<String> {
        (0..self.switches)
            .map(|index| format!("{}{}", settings.switch_bridge_prefix, index))
            .collect()
    }

    /// Machines with at least one interface attached to the switch `index`
    pub fn machines_on_switch(&self, index: usize) -> Vec<&str> {
        self.machines
            .iter()
            .filter(|(_, machine)| machine.interfaces.values().any(|i| i.bridge == index))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Like [`Topology::machines_on_switch`], addressed by host bridge name
    pub fn machines_on_switch_named(&self, name: &str, settings: &Settings) -> Vec<&str> {
        name.strip_prefix(settings.switch_bridge_prefix.as_str())
            .and_then(|index| index.parse::<usize>().ok())
            .filter(|index| *index < self.switches)
            .map(|index| self.machines_on_switch(index))
            .unwrap_or_default()
    }
}
