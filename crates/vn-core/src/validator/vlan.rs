use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::addr;
use crate::decode::{coerce_int, key_name, parse_literal};
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// Check the VLAN sub-interfaces of one machine.
///
/// `clean_before` tells whether the run was free of violations (in the scope
/// picked by the settings) when this machine's VLANs came up. The link
/// existence check only runs while that still holds, counting violations
/// found in earlier VLANs of this mapping as well.
pub(crate) fn check_vlans(
    path: &EntityPath,
    vlans: &Mapping,
    interfaces: Option<&Mapping>,
    clean_before: bool,
) -> Checked<Mapping> {
    let mut out = Checked::new(Mapping::new());

    for (name, raw) in vlans {
        let vlan_path = path.child(key_name(name));

        if !name.is_string() {
            out.fail(Violation::wrong_type(&vlan_path, "a string VLAN name", name));
            out.value.insert(name.clone(), raw.clone());
            continue;
        }

        let Some(spec) = raw.as_mapping() else {
            out.fail(Violation::wrong_type(&vlan_path, "a VLAN mapping", raw));
            out.value.insert(name.clone(), raw.clone());
            continue;
        };
        let mut revised = spec.clone();

        match spec.get("id") {
            None => out.fail(Violation::missing(&vlan_path, "id")),
            Some(value) => match coerce_int(value) {
                Some(id) => {
                    revised.insert(Value::from("id"), Value::from(id));
                }
                None => out.fail(Violation::new(
                    &vlan_path.child("id"),
                    ViolationKind::InvalidValue,
                    format!("VLAN id {} cannot be converted to an integer", key_name(value)),
                )),
            },
        }

        match spec.get("link") {
            None => out.fail(Violation::missing(&vlan_path, "link")),
            Some(Value::String(link)) => {
                if clean_before && out.is_clean() {
                    let known = interfaces
                        .map(|ifaces| ifaces.keys().any(|k| k.as_str() == Some(link.as_str())));
                    if known == Some(false) {
                        out.fail(Violation::new(
                            &vlan_path.child("link"),
                            ViolationKind::DanglingReference,
                            format!(
                                "link {} does not correspond to any interface on the same machine",
                                link
                            ),
                        ));
                    }
                } else {
                    debug!(
                        path = %vlan_path,
                        "Skipping link existence check, earlier violations were found"
                    );
                }
            }
            Some(other) => out.fail(Violation::wrong_type(
                &vlan_path.child("link"),
                "an interface name",
                other,
            )),
        }

        match spec.get("addresses") {
            None => debug!(path = %vlan_path, "VLAN has no addresses, that's okay"),
            Some(Value::Sequence(addresses)) => {
                let addresses_path = vlan_path.child("addresses");
                for (idx, address) in addresses.iter().enumerate() {
                    if let Err(violation) = parse_literal(
                        &addresses_path.child(format!("#{}", idx + 1)),
                        address,
                        addr::parse_ip_interface,
                    ) {
                        out.fail(violation);
                    }
                }
            }
            Some(other) => out.fail(Violation::wrong_type(
                &vlan_path.child("addresses"),
                "a list of addresses",
                other,
            )),
        }

        out.value.insert(name.clone(), Value::Mapping(revised));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::yaml;

    fn vlans_path() -> EntityPath {
        EntityPath::root().child("machines").child("r1").child("vlans")
    }

    fn check(doc: &str, clean_before: bool) -> Checked<Mapping> {
        let interfaces = yaml("eth0: {bridge: 0}\neth1: {bridge: 1}");
        let vlans = yaml(doc);
        check_vlans(
            &vlans_path(),
            vlans.as_mapping().unwrap(),
            interfaces.as_mapping(),
            clean_before,
        )
    }

    #[test]
    fn test_id_is_coerced() {
        let checked = check(
            "vlan.10: {id: '10', link: eth0, addresses: [10.0.0.1/24, 'fd00::1/64']}",
            true,
        );
        assert!(checked.is_clean());
        assert_eq!(checked.value["vlan.10"]["id"], Value::from(10));
        assert_eq!(checked.value["vlan.10"]["link"].as_str(), Some("eth0"));
    }

    #[test]
    fn test_uncoercible_id() {
        let checked = check("vlan.x: {id: ten, link: eth0}", true);
        assert_eq!(checked.violations.len(), 1);
        assert_eq!(checked.violations[0].path.to_string(), "machines.r1.vlans.vlan.x.id");
        assert_eq!(checked.value["vlan.x"]["id"].as_str(), Some("ten"));
    }

    #[test]
    fn test_missing_keys() {
        let checked = check("vlan.10: {addresses: []}", true);
        let kinds: Vec<_> = checked.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Missing, ViolationKind::Missing]);
    }

    #[test]
    fn test_dangling_link() {
        let checked = check("vlan.10: {id: 10, link: eth9}", true);
        assert_eq!(checked.violations.len(), 1);
        assert_eq!(checked.violations[0].kind, ViolationKind::DanglingReference);
    }

    #[test]
    fn test_dangling_link_is_not_reported_after_earlier_violations() {
        let checked = check("vlan.10: {id: 10, link: eth9}", false);
        assert!(checked.is_clean());

        // an earlier VLAN of the same machine is enough to suppress the check
        let checked = check(
            "vlan.10: {id: ten, link: eth0}\nvlan.20: {id: 20, link: eth9}",
            true,
        );
        assert_eq!(checked.violations.len(), 1);
        assert_eq!(checked.violations[0].kind, ViolationKind::InvalidValue);
    }

    #[test]
    fn test_vlan_name_must_be_a_string() {
        let checked = check("100: {id: 100, link: eth0}", true);
        assert_eq!(checked.violations.len(), 1);
        assert_eq!(checked.violations[0].path.to_string(), "machines.r1.vlans.100");
        assert_eq!(checked.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn test_link_must_be_a_string() {
        let checked = check("vlan.10: {id: 10, link: [eth0]}", true);
        assert_eq!(checked.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn test_addresses() {
        let checked = check(
            "vlan.10: {id: 10, link: eth0, addresses: [10.0.0.1/24, bogus, 10.0.0.2/33]}",
            true,
        );
        let paths: Vec<_> = checked.violations.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "machines.r1.vlans.vlan.10.addresses.#2",
                "machines.r1.vlans.vlan.10.addresses.#3"
            ]
        );

        let checked = check("vlan.10: {id: 10, link: eth0, addresses: 10.0.0.1/24}", true);
        assert_eq!(checked.violations[0].kind, ViolationKind::WrongType);
    }
}
