use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{Context, route};
use crate::addr;
use crate::decode::{key_name, parse_literal, read_int};
use crate::mac::{MacAddr, MacGenerator};
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// Check every interface of a machine, filling in a generated MAC address
/// where none is declared
pub(crate) fn check_interfaces(
    path: &EntityPath,
    interfaces: &Mapping,
    ctx: &Context<'_>,
    macs: &mut dyn MacGenerator,
) -> Checked<Mapping> {
    let mut out = Checked::new(Mapping::new());

    for (name, raw) in interfaces {
        let iface_path = path.child(key_name(name));

        if !name.is_string() {
            out.fail(Violation::wrong_type(&iface_path, "a string interface name", name));
            out.value.insert(name.clone(), raw.clone());
            continue;
        }

        let revised = match raw.as_mapping() {
            Some(spec) => {
                let checked = check_interface(&iface_path, spec, ctx, macs);
                Value::Mapping(out.absorb(checked))
            }
            None => {
                out.fail(Violation::wrong_type(&iface_path, "an interface mapping", raw));
                raw.clone()
            }
        };
        out.value.insert(name.clone(), revised);
    }

    out
}

fn check_interface(
    path: &EntityPath,
    spec: &Mapping,
    ctx: &Context<'_>,
    macs: &mut dyn MacGenerator,
) -> Checked<Mapping> {
    let mut out = Checked::new(spec.clone());

    match spec.get("ipv4") {
        None => debug!(%path, "No IPv4 address given, no IPv4 will be configured"),
        Some(value) => {
            if let Err(violation) =
                parse_literal(&path.child("ipv4"), value, addr::parse_ipv4_interface)
            {
                out.fail(violation);
            }
        }
    }

    match spec.get("ipv6") {
        None => debug!(%path, "No IPv6 address given, no IPv6 will be configured"),
        Some(value) => {
            if let Err(violation) =
                parse_literal(&path.child("ipv6"), value, addr::parse_ipv6_interface)
            {
                out.fail(violation);
            }
        }
    }

    match spec.get("mac") {
        None => {
            let mac = macs.generate();
            debug!(%path, %mac, "No MAC address given, generated one");
            out.value
                .insert(Value::from("mac"), Value::from(mac.to_string()));
        }
        Some(value) => {
            if let Err(violation) = parse_literal(&path.child("mac"), value, str::parse::<MacAddr>)
            {
                out.fail(violation);
            }
        }
    }

    match spec.get("bridge") {
        None => out.fail(Violation::missing(path, "bridge")),
        Some(value) => {
            if let Err(violation) = check_switch_index(&path.child("bridge"), value, ctx.switches)
            {
                out.fail(violation);
            }
        }
    }

    if let Some(value) = spec.get("routes") {
        match value.as_sequence() {
            Some(routes) => {
                let checked = route::check_routes(&path.child("routes"), routes);
                let routes = out.absorb(checked);
                out.value
                    .insert(Value::from("routes"), Value::Sequence(routes));
            }
            None => out.fail(Violation::wrong_type(
                &path.child("routes"),
                "a list of routes",
                value,
            )),
        }
    }

    out
}

/// An interface attaches to switch `index`, valid indices are `0..switches`.
/// Without a usable switch count only the lower bound is checked.
fn check_switch_index(
    path: &EntityPath,
    value: &Value,
    switches: Option<i64>,
) -> Result<i64, Violation> {
    let index = read_int(path, value, "a switch index")?;

    if index < 0 {
        return Err(Violation::new(
            path,
            ViolationKind::OutOfRange,
            format!("switch index {} is negative, switches are numbered from 0", index),
        ));
    }

    match switches {
        Some(count) if index > count - 1 => Err(Violation::new(
            path,
            ViolationKind::OutOfRange,
            format!(
                "switch index {} does not exist, {} switch(es) are defined (numbered from 0)",
                index, count
            ),
        )),
        Some(_) => Ok(index),
        None => {
            debug!(%path, "Switch count unknown, skipping upper bound check");
            Ok(index)
        }
    }
}
