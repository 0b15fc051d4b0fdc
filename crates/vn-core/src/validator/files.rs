use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

use super::Context;
use crate::decode::key_name;
use crate::violation::{Checked, EntityPath, Violation, ViolationKind};

/// Resolve the host paths a machine copies files from.
///
/// A path that exists relative to the config dir is rewritten to the joined
/// absolute path. A path that only exists as given is kept as is. Anything
/// else is unresolvable. Per-file values are carried over untouched.
pub(crate) fn check_files(path: &EntityPath, files: &Mapping, ctx: &Context<'_>) -> Checked<Mapping> {
    let mut out = Checked::new(Mapping::new());

    for (key, value) in files {
        let file_path = path.child(key_name(key));

        let Some(host_file) = key.as_str() else {
            out.fail(Violation::wrong_type(&file_path, "a host path string", key));
            out.value.insert(key.clone(), value.clone());
            continue;
        };

        let relative = ctx
            .config_dir
            .map(|dir| dir.join(host_file))
            .filter(|joined| ctx.probe.exists(joined));

        if let Some(resolved) = relative {
            debug!(
                path = %file_path,
                "Updating relative host file path {} to {}",
                host_file,
                resolved.display()
            );
            out.value.insert(
                Value::from(resolved.to_string_lossy().into_owned()),
                value.clone(),
            );
        } else if ctx.probe.exists(Path::new(host_file)) {
            out.value.insert(key.clone(), value.clone());
        } else {
            out.fail(Violation::new(
                &file_path,
                ViolationKind::Unresolvable,
                format!("host file {} is neither a file nor a directory", host_file),
            ));
            out.value.insert(key.clone(), value.clone());
        }
    }

    out
}
