use serde_yaml::Value;
use tracing::debug;

use crate::decode::key_name;
use crate::violation::{Checked, EntityPath, Violation};

/// Check the top-level `veths` section: endpoint name -> bridge, optional
/// peer and optional spanning tree flag
pub(crate) fn check_veths(veths: &Value) -> Checked<()> {
    let mut out = Checked::new(());
    let path = EntityPath::root().child("veths");

    let Some(entries) = veths.as_mapping() else {
        out.fail(Violation::wrong_type(&path, "a mapping of veth names", veths));
        return out;
    };

    for (name, raw) in entries {
        let Some(name) = name.as_str() else {
            out.fail(Violation::wrong_type(
                &path.child(key_name(name)),
                "a string veth name",
                name,
            ));
            continue;
        };
        let veth_path = path.child(name);

        let Some(spec) = raw.as_mapping() else {
            out.fail(Violation::wrong_type(&veth_path, "a veth mapping", raw));
            continue;
        };

        match spec.get("bridge") {
            None => out.fail(Violation::missing(&veth_path, "bridge")),
            Some(Value::String(_)) => {}
            Some(other) => out.fail(Violation::wrong_type(
                &veth_path.child("bridge"),
                "a bridge name",
                other,
            )),
        }

        match spec.get("peer") {
            None => debug!(
                path = %veth_path,
                "veth has no peer, assuming its peer is defined elsewhere"
            ),
            Some(Value::String(_)) => {}
            Some(other) => out.fail(Violation::wrong_type(
                &veth_path.child("peer"),
                "a peer name",
                other,
            )),
        }

        match spec.get("stp") {
            None => debug!(path = %veth_path, "veth has no STP setting, that's okay"),
            Some(Value::Bool(_)) => {}
            Some(other) => out.fail(Violation::wrong_type(
                &veth_path.child("stp"),
                "a boolean",
                other,
            )),
        }
    }

    out
}
