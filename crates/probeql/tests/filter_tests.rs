//! End-to-end tests over the public compile/evaluate surface

use chrono::{FixedOffset, TimeZone};
use pretty_assertions::assert_eq;
use probeql::{compile, evaluate, Event, EventCategory, ProcessInfo, Value};
use rstest::rstest;
use std::sync::Arc;

fn send_event() -> Event {
    let tz = FixedOffset::east_opt(3600).unwrap();
    Event {
        seq: 1,
        pid: 1204,
        tid: 3201,
        cpu: 0,
        name: "Send".into(),
        category: EventCategory::Net,
        description: "transmits data over the wire".into(),
        host: "archrabbit".into(),
        timestamp: tz.with_ymd_and_hms(2024, 5, 14, 22, 13, 49).unwrap(),
        params: [
            ("dip".to_string(), Value::Ip("172.17.12.4".parse().unwrap())),
            ("dport".to_string(), Value::Port(443)),
        ]
        .into_iter()
        .collect(),
        ps: Some(Arc::new(ProcessInfo {
            pid: 1204,
            ppid: 620,
            name: "firefox".into(),
            exe: "/usr/lib/firefox/firefox".into(),
            parent: Some(Arc::new(ProcessInfo {
                pid: 620,
                name: "systemd".into(),
                ..Default::default()
            })),
            ..Default::default()
        })),
    }
}

#[rstest]
#[case("kevt.name = 'Send'", true)]
#[case("kevt.name = 'Recv'", false)]
#[case("net.dport = 443 and ps.name = 'firefox'", true)]
#[case("net.dip = '172.17.0.0/16'", true)]
#[case("cidr_contains(net.dip, '172.17.12.4/24')", true)]
#[case("cidr_contains(net.dip, '192.168.0.0/16')", false)]
#[case("ps.parent.name = 'systemd'", true)]
#[case("kevt.time.h = 22 and kevt.date.week = 20", true)]
#[case("upper(ps.name) in ('FIREFOX', 'CHROMIUM')", true)]
#[case("ps.name in ('firefox')", true)]
#[case("kevt.name in ('Recv')", false)]
fn test_compile_and_evaluate(#[case] source: &str, #[case] expected: bool) {
    let expr = compile(source).unwrap_or_else(|e| panic!("{source}: {e}"));
    assert_eq!(evaluate(&expr, &send_event()), expected, "{source}");
}

#[test]
fn test_arity_error_text() {
    let err = compile("cidr_contains(net.dip)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "CIDR_CONTAINS function requires 2 argument(s) but 1 argument(s) given"
    );
}

#[test]
fn test_argument_kind_error_text() {
    let err = compile("cidr_contains(net.dip, 12)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "argument #2 (cidr) in function CIDR_CONTAINS should be one of: string"
    );
}

#[test]
fn test_undefined_function_suggestion_text() {
    let err = compile("md('172.17.12.4')").unwrap_err();
    assert_eq!(
        err.to_string(),
        "md function is undefined. Did you mean one of MD5?"
    );
}

#[test]
fn test_rejected_rule_does_not_poison_later_compiles() {
    assert!(compile("bogus.field = 1").is_err());
    compile("kevt.name = 'Send'").unwrap();
}

#[test]
fn test_not_applicable_context_never_errors() {
    let expr = compile("ps.parent.name = 'systemd'").unwrap();
    let mut evt = send_event();
    assert!(evaluate(&expr, &evt));
    evt.ps = None;
    assert!(!evaluate(&expr, &evt));
}

#[test]
fn test_compiled_rule_is_shareable_across_threads() {
    let expr = Arc::new(compile("net.dport = 443 or ps.name contains 'fox'").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let expr = Arc::clone(&expr);
            std::thread::spawn(move || (0..500).all(|_| evaluate(&expr, &send_event())))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_catalog_surface_is_queryable() {
    let catalog = probeql::default_catalog();
    let cidr = catalog.lookup("cidr_contains").unwrap();
    assert_eq!(cidr.arity(), 2);
    assert_eq!(cidr.args[1].name, "cidr");
    assert!(catalog.len() >= 13);
}

#[test]
fn test_registry_kinds_match_resolved_values() {
    use probeql::fields::{resolve_field, Namespace};

    let evt = send_event();
    let registry = probeql::default_registry();
    for field in registry.iter().filter(|f| f.namespace == Namespace::Kevt) {
        let value = resolve_field(field, &evt).expect("kevt fields apply to every event");
        assert_eq!(value.kind(), field.kind, "{}", field.name);
    }
}
