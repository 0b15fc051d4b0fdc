use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{Context, bridge, files, interface, vlan};
use crate::decode::key_name;
use crate::mac::MacGenerator;
use crate::settings::LinkCheckScope;
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// Check the `machines` section.
///
/// Returns the revised machines mapping, or `None` when the section is
/// absent or not a mapping and there is nothing to revise. `run_clean` tells
/// whether the run had no violations before this section was checked.
pub(crate) fn check_machines(
    machines: Option<&Value>,
    ctx: &Context<'_>,
    macs: &mut dyn MacGenerator,
    run_clean: bool,
) -> Checked<Option<Mapping>> {
    let mut out = Checked::new(None);
    let path = EntityPath::root().child("machines");

    let Some(machines) = machines else {
        out.fail(Violation::missing(&EntityPath::root(), "machines"));
        return out;
    };
    let Some(machines) = machines.as_mapping() else {
        out.fail(Violation::wrong_type(&path, "a mapping of machine names", machines));
        return out;
    };

    let mut revised = Mapping::new();
    for (name, raw) in machines {
        let machine_path = path.child(key_name(name));

        if !name.is_string() {
            out.fail(Violation::wrong_type(&machine_path, "a string machine name", name));
            revised.insert(name.clone(), raw.clone());
            continue;
        }

        let value = match raw.as_mapping() {
            Some(spec) => {
                let clean_so_far = run_clean && out.is_clean();
                let checked = check_machine(&machine_path, spec, ctx, macs, clean_so_far);
                Value::Mapping(out.absorb(checked))
            }
            None => {
                out.fail(Violation::wrong_type(&machine_path, "a machine mapping", raw));
                raw.clone()
            }
        };
        revised.insert(name.clone(), value);
    }

    out.value = Some(revised);
    out
}

fn check_machine(
    path: &EntityPath,
    spec: &Mapping,
    ctx: &Context<'_>,
    macs: &mut dyn MacGenerator,
    clean_so_far: bool,
) -> Checked<Mapping> {
    let mut out = Checked::new(spec.clone());

    match spec.get("type") {
        None => out.fail(Violation::missing(path, "type")),
        Some(kind) => {
            let supported = kind
                .as_str()
                .is_some_and(|kind| ctx.settings.supports_machine_type(kind));
            if !supported {
                out.fail(Violation::new(
                    &path.child("type"),
                    ViolationKind::UnsupportedType,
                    format!(
                        "machine type {} is unsupported, supported types are: {}",
                        key_name(kind),
                        ctx.settings.supported_machine_types.join(", ")
                    ),
                ));
            }
        }
    }

    match spec.get("files") {
        None => {}
        Some(Value::Mapping(host_files)) => {
            let checked = files::check_files(&path.child("files"), host_files, ctx);
            let host_files = out.absorb(checked);
            out.value
                .insert(Value::from("files"), Value::Mapping(host_files));
        }
        Some(other) => out.fail(Violation::wrong_type(
            &path.child("files"),
            "a mapping of host paths",
            other,
        )),
    }

    let interfaces = match spec.get("interfaces") {
        None => {
            out.fail(Violation::new(
                &path.child("interfaces"),
                ViolationKind::Missing,
                "machine does not have any interfaces",
            ));
            None
        }
        Some(Value::Mapping(ifaces)) => {
            let checked =
                interface::check_interfaces(&path.child("interfaces"), ifaces, ctx, macs);
            let revised = out.absorb(checked);
            out.value
                .insert(Value::from("interfaces"), Value::Mapping(revised));
            Some(ifaces)
        }
        Some(other) => {
            out.fail(Violation::wrong_type(
                &path.child("interfaces"),
                "a mapping of interface names",
                other,
            ));
            None
        }
    };

    match spec.get("vlans") {
        None => debug!(%path, "Machine has no VLAN interfaces, that's okay"),
        Some(Value::Mapping(vlans)) => {
            let clean_before = match ctx.settings.vlan_link_check {
                LinkCheckScope::Global => clean_so_far && out.is_clean(),
                LinkCheckScope::Machine => out.is_clean(),
            };
            let checked = vlan::check_vlans(&path.child("vlans"), vlans, interfaces, clean_before);
            let revised = out.absorb(checked);
            out.value.insert(Value::from("vlans"), Value::Mapping(revised));
        }
        Some(other) => out.fail(Violation::wrong_type(
            &path.child("vlans"),
            "a mapping of VLAN names",
            other,
        )),
    }

    match spec.get("bridges") {
        None => debug!(%path, "Machine has no bridge interfaces, that's okay"),
        Some(Value::Mapping(bridges)) => {
            let checked = bridge::check_bridges(&path.child("bridges"), bridges, interfaces);
            out.absorb(checked);
        }
        Some(other) => out.fail(Violation::wrong_type(
            &path.child("bridges"),
            "a mapping of bridge names",
            other,
        )),
    }

    out
}
