use serde_yaml::Value;
use tracing::debug;

use crate::addr;
use crate::decode::parse_literal;
use crate::violation::{Checked, EntityPath, Violation};

/// Legacy spelling of the IPv4 default destination
pub const DEFAULT_ROUTE_ALIAS: &str = "default";
pub const DEFAULT_ROUTE: &str = "0.0.0.0/0";

enum Destination {
    Network,
    DefaultAlias,
}

fn check_destination(path: &EntityPath, value: &Value) -> Result<Destination, Violation> {
    if value.as_str() == Some(DEFAULT_ROUTE_ALIAS) {
        return Ok(Destination::DefaultAlias);
    }
    parse_literal(path, value, addr::parse_ip_network).map(|_| Destination::Network)
}

/// Check the routes of one interface. Routes are numbered from 1 in entity
/// paths, the `default` destination alias is rewritten to `0.0.0.0/0`.
pub(crate) fn check_routes(path: &EntityPath, routes: &[Value]) -> Checked<Vec<Value>> {
    let mut out = Checked::new(routes.to_vec());

    for (idx, route) in routes.iter().enumerate() {
        let route_path = path.child(format!("#{}", idx + 1));

        let Some(spec) = route.as_mapping() else {
            out.fail(Violation::wrong_type(&route_path, "a route mapping", route));
            continue;
        };

        match spec.get("to") {
            None => out.fail(Violation::missing(&route_path, "to")),
            Some(value) => match check_destination(&route_path.child("to"), value) {
                Ok(Destination::Network) => {}
                Ok(Destination::DefaultAlias) => {
                    debug!(
                        path = %route_path,
                        "Updating 'default' destination to {} for backwards compatibility",
                        DEFAULT_ROUTE
                    );
                    if let Some(Value::Mapping(revised)) = out.value.get_mut(idx) {
                        revised.insert(Value::from("to"), Value::from(DEFAULT_ROUTE));
                    }
                }
                Err(violation) => out.fail(violation),
            },
        }

        match spec.get("via") {
            None => out.fail(Violation::missing(&route_path, "via")),
            Some(value) => {
                if let Err(violation) =
                    parse_literal(&route_path.child("via"), value, addr::parse_ip_address)
                {
                    out.fail(violation);
                }
            }
        }
    }

    out
}
