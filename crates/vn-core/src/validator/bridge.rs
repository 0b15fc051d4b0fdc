use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::addr;
use crate::decode::{key_name, parse_literal};
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// Check the local bridges of one machine. Slave references are only
/// resolved when the machine's interfaces are known.
pub(crate) fn check_bridges(
    path: &EntityPath,
    bridges: &Mapping,
    interfaces: Option<&Mapping>,
) -> Checked<()> {
    let mut out = Checked::new(());

    for (name, raw) in bridges {
        let bridge_path = path.child(key_name(name));

        if !name.is_string() {
            out.fail(Violation::wrong_type(&bridge_path, "a string bridge name", name));
            continue;
        }

        let Some(spec) = raw.as_mapping() else {
            out.fail(Violation::wrong_type(&bridge_path, "a bridge mapping", raw));
            continue;
        };

        match spec.get("ipv4") {
            None => debug!(path = %bridge_path, "Bridge has no IPv4 address, that's okay"),
            Some(value) => {
                if let Err(violation) =
                    parse_literal(&bridge_path.child("ipv4"), value, addr::parse_ipv4_interface)
                {
                    out.fail(violation);
                }
            }
        }

        match spec.get("ipv6") {
            None => debug!(path = %bridge_path, "Bridge has no IPv6 address, that's okay"),
            Some(value) => {
                if let Err(violation) =
                    parse_literal(&bridge_path.child("ipv6"), value, addr::parse_ipv6_interface)
                {
                    out.fail(violation);
                }
            }
        }

        match spec.get("slaves") {
            None => out.fail(Violation::missing(&bridge_path, "slaves")),
            Some(Value::Sequence(slaves)) => {
                let Some(interfaces) = interfaces else {
                    debug!(
                        path = %bridge_path,
                        "Machine has no usable interfaces, skipping slave resolution"
                    );
                    continue;
                };
                for slave in slaves {
                    if !interfaces.keys().any(|k| k == slave) {
                        out.fail(Violation::new(
                            &bridge_path.child("slaves"),
                            ViolationKind::DanglingReference,
                            format!("undefined slave interface {}", key_name(slave)),
                        ));
                    }
                }
            }
            Some(other) => out.fail(Violation::wrong_type(
                &bridge_path.child("slaves"),
                "a list of interface names",
                other,
            )),
        }
    }

    out
}
