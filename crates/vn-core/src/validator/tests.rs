use serde_yaml::Value;

use super::*;
use crate::mac::MacAddr;
use crate::settings::LinkCheckScope;
use crate::testing::{FakeFs, SequenceMac, yaml};
use crate::violation::ViolationKind;

fn validator(doc: &str) -> Validator {
    Validator::new(&yaml(doc))
        .with_mac_generator(SequenceMac::default())
        .with_path_probe(FakeFs::default())
}

fn run(doc: &str) -> Validator {
    let mut validator = validator(doc);
    validator.run();
    validator
}

const FULL: &str = r#"
switches: 3
config_dir: /srv/vnet
machines:
  router100:
    type: router
    files:
      router100: /etc/frr/
    interfaces:
      eth12:
        ipv4: 192.168.0.2/24
        ipv6: fd00:12::2/64
        mac: "00:00:00:00:01:11"
        bridge: 0
        routes:
          - to: default
            via: 192.168.0.1
      eth23:
        ipv4: 10.0.0.1/24
        bridge: 1
    vlans:
      vlan.100:
        id: "100"
        link: eth23
        addresses:
          - 10.0.100.1/24
  host102:
    type: host
    interfaces:
      eth0:
        bridge: 2
    bridges:
      br0:
        ipv4: 10.2.0.1/24
        slaves: [eth0]
veths:
  vnet-veth0:
    bridge: vnet-br0
    peer: vnet-veth1
    stp: true
  vnet-veth1:
    bridge: vnet-br1
"#;

#[test]
fn test_two_switch_router_gets_generated_macs_and_nothing_else() {
    let doc = "{switches: 2, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}, eth1: {bridge: 1}}}}}";
    let mut validator = Validator::new(&yaml(doc)).with_path_probe(FakeFs::default());
    validator.run();

    assert!(validator.is_successful());

    let normalized = validator.normalized();
    let eth0 = normalized["machines"]["r1"]["interfaces"]["eth0"]["mac"].as_str().unwrap();
    let eth1 = normalized["machines"]["r1"]["interfaces"]["eth1"]["mac"].as_str().unwrap();
    assert!(MacAddr::is_canonical(eth0));
    assert!(MacAddr::is_canonical(eth1));

    // removing the generated MACs gives back the input
    let mut stripped = normalized.clone();
    for iface in ["eth0", "eth1"] {
        if let Value::Mapping(spec) = &mut stripped["machines"]["r1"]["interfaces"][iface] {
            spec.remove("mac");
        }
    }
    assert_eq!(stripped, yaml(doc));
}

#[test]
fn test_full_topology_is_normalized() {
    let mut validator = validator(FULL).with_path_probe(FakeFs::with(["/srv/vnet/router100"]));
    validator.run();

    assert!(validator.is_successful(), "{:?}", validator.violations());
    assert_eq!(validator.validators_ran(), 3);

    let router = &validator.normalized()["machines"]["router100"];
    assert_eq!(router["interfaces"]["eth12"]["mac"].as_str(), Some("00:00:00:00:01:11"));
    assert_eq!(router["interfaces"]["eth23"]["mac"].as_str(), Some("02:00:00:00:00:01"));
    assert_eq!(
        router["interfaces"]["eth12"]["routes"][0]["to"].as_str(),
        Some(DEFAULT_ROUTE)
    );
    assert_eq!(router["vlans"]["vlan.100"]["id"], Value::from(100));
    assert_eq!(router["files"]["/srv/vnet/router100"].as_str(), Some("/etc/frr/"));

    let host = &validator.normalized()["machines"]["host102"];
    assert_eq!(host["interfaces"]["eth0"]["mac"].as_str(), Some("02:00:00:00:00:02"));

    let topology = validator.report().topology().unwrap();
    assert_eq!(topology.switches, 3);
    assert_eq!(topology.machines["router100"].vlans["vlan.100"].id, 100);
}

#[test]
fn test_input_description_is_never_modified() {
    let original = yaml(FULL);
    let mut validator = Validator::new(&original)
        .with_mac_generator(SequenceMac::default())
        .with_path_probe(FakeFs::with(["/srv/vnet/router100"]));
    validator.run();

    assert_ne!(validator.normalized(), &original);
    assert_eq!(original, yaml(FULL));
}

#[test]
fn test_missing_or_non_integer_switches_fail() {
    for doc in [
        "machines: {}",
        "{switches: two, machines: {}}",
        "{switches: 1.5, machines: {}}",
    ] {
        let validator = run(doc);
        assert!(!validator.is_successful(), "{}", doc);
        assert_eq!(validator.violations()[0].path.to_string(), "switches");
    }
}

#[test]
fn test_non_string_names_fail_instead_of_breaking_the_typed_view() {
    let validator = run("{switches: 1, machines: {1: {type: host, interfaces: {0: {bridge: 0}}}}}");
    assert!(!validator.is_successful());
    assert_eq!(validator.violations()[0].path.to_string(), "machines.1");
    assert_eq!(validator.violations()[0].kind, ViolationKind::WrongType);

    let validator = run("{switches: 1, machines: {h1: {type: host, interfaces: {0: {bridge: 0}}}}}");
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].path.to_string(), "machines.h1.interfaces.0");

    let validator = run("{switches: 1, machines: {h1: {type: host, interfaces: {eth0: {bridge: 0}}}}}");
    assert!(validator.is_successful());
    assert!(validator.report().topology().is_ok());
}

#[test]
fn test_oversized_switch_count_is_out_of_range() {
    let validator = run("{switches: 18446744073709551615, machines: {}}");
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].kind, ViolationKind::OutOfRange);
}

#[test]
fn test_default_route_rewrite_does_not_affect_success() {
    let validator = run(
        "{switches: 1, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0, routes: [{to: default, via: 10.0.0.1}]}}}}}",
    );
    assert!(validator.is_successful());
    assert_eq!(
        validator.normalized()["machines"]["r1"]["interfaces"]["eth0"]["routes"][0]["to"].as_str(),
        Some("0.0.0.0/0")
    );
}

#[test]
fn test_switch_index_one_past_the_end_fails() {
    let base = "{switches: 2, machines: {r1: {type: router, interfaces: {eth0: {bridge: IDX}}}}}";

    assert!(run(&base.replace("IDX", "0")).is_successful());
    assert!(run(&base.replace("IDX", "1")).is_successful());
    assert!(!run(&base.replace("IDX", "2")).is_successful());
    assert!(!run(&base.replace("IDX", "-1")).is_successful());
}

#[test]
fn test_vlan_id_is_coerced_end_to_end() {
    let validator = run(
        "{switches: 1, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}}, vlans: {v10: {id: '10', link: eth0, addresses: [10.0.0.1/24]}}}}}",
    );
    assert!(validator.is_successful());
    let id = &validator.normalized()["machines"]["r1"]["vlans"]["v10"]["id"];
    assert_eq!(id.as_i64(), Some(10));
}

#[test]
fn test_undeclared_bridge_slave_fails() {
    let validator = run(
        "{switches: 1, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}}, bridges: {br0: {slaves: [eth0, ethX]}}}}}",
    );
    assert!(!validator.is_successful());
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].kind, ViolationKind::DanglingReference);
}

#[test]
fn test_relative_file_paths_resolve_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("router100")).unwrap();

    let doc = format!(
        "{{switches: 1, config_dir: '{}', machines: {{r1: {{type: router, files: {{router100: /etc/, missing: /etc/x}}, interfaces: {{eth0: {{bridge: 0}}}}}}}}}}",
        dir.path().display()
    );
    let mut validator = Validator::new(&yaml(&doc));
    validator.run();

    assert!(!validator.is_successful());
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].kind, ViolationKind::Unresolvable);

    let joined = dir.path().join("router100");
    let files = &validator.normalized()["machines"]["r1"]["files"];
    assert_eq!(files[joined.to_str().unwrap()].as_str(), Some("/etc/"));
}

#[test]
fn test_rerun_starts_over_and_counter_accumulates() {
    let mut validator = validator(
        "{switches: 1, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}}}}}",
    );

    validator.run();
    assert_eq!(validator.validators_ran(), 2);
    let first = validator.normalized()["machines"]["r1"]["interfaces"]["eth0"]["mac"].clone();

    validator.run();
    assert!(validator.is_successful());
    assert_eq!(validator.validators_ran(), 4);
    let second = validator.normalized()["machines"]["r1"]["interfaces"]["eth0"]["mac"].clone();

    // generated again from the input, not carried over
    assert_eq!(first.as_str(), Some("02:00:00:00:00:01"));
    assert_eq!(second.as_str(), Some("02:00:00:00:00:02"));
}

#[test]
fn test_random_macs_are_valid_on_every_run() {
    let doc = yaml("{switches: 1, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}}}}}");
    let mut validator = Validator::new(&doc);
    for _ in 0..3 {
        validator.run();
        let mac = validator.normalized()["machines"]["r1"]["interfaces"]["eth0"]["mac"]
            .as_str()
            .map(str::to_string);
        assert!(mac.is_some_and(|mac| MacAddr::is_canonical(&mac)));
    }
}

#[test]
fn test_every_checker_runs_after_earlier_failures() {
    let validator = run(
        "{switches: x, machines: {r1: {type: toaster, interfaces: {eth0: {bridge: 0}}}}, veths: {v0: {stp: 1}}}",
    );

    let paths: Vec<_> = validator
        .violations()
        .iter()
        .map(|v| v.path.to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["switches", "machines.r1.type", "veths.v0.bridge", "veths.v0.stp"]
    );
    assert_eq!(validator.validators_ran(), 3);
    // MACs are still generated next to unresolved violations
    assert!(
        validator.normalized()["machines"]["r1"]["interfaces"]["eth0"]["mac"]
            .as_str()
            .is_some()
    );
}

#[test]
fn test_vlan_link_check_scope() {
    let doc = "{switches: x, machines: {r1: {type: router, interfaces: {eth0: {bridge: 0}}, vlans: {v10: {id: 10, link: eth9}}}}}";

    let validator = run(doc);
    assert_eq!(validator.violations().len(), 1);

    let mut validator = validator_with_scope(doc, LinkCheckScope::Machine);
    validator.run();
    assert_eq!(validator.violations().len(), 2);
    assert_eq!(validator.violations()[1].kind, ViolationKind::DanglingReference);
}

fn validator_with_scope(doc: &str, scope: LinkCheckScope) -> Validator {
    validator(doc).with_settings(Settings {
        vlan_link_check: scope,
        ..Settings::default()
    })
}

#[test]
fn test_veths_guard_when_called_directly() {
    let mut validator = validator("{switches: 1, machines: {}}");
    validator.validate_veths();
    assert!(validator.is_successful());
    assert_eq!(validator.validators_ran(), 1);
}

#[test]
fn test_malformed_veths_section() {
    let validator = run("{switches: 1, machines: {}, veths: [a, b]}");
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].path.to_string(), "veths");
}

#[test]
fn test_display() {
    let validator = run("{switches: 1, machines: {}}");
    assert_eq!(
        validator.to_string(),
        "VNet config validator, current_state: OK, amount of validators run: 2"
    );

    let validator = run("machines: {}");
    assert_eq!(
        validator.to_string(),
        "VNet config validator, current_state: NOT OK, amount of validators run: 2"
    );
}

#[test]
fn test_report_refuses_typed_view_after_failures() {
    let validator = run("machines: {}");
    let report = validator.report();
    assert!(!report.is_successful());
    assert!(report.topology().is_err());
}

#[test]
fn test_validate_helper() {
    let report = crate::validate(&yaml("{switches: 0, machines: {}}"));
    assert!(report.is_successful());
    assert_eq!(report.validators_ran, 2);
}
