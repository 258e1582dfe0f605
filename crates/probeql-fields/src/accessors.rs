//! Namespace-scoped field accessors
//!
//! One accessor per namespace. Each resolves a field identifier against
//! an event record (and the optional process context hanging off it)
//! into a typed value, or reports not-applicable by returning `None`.
//! Not-applicable is a normal state: a file field asked of a network
//! event, or a parent lookup with no tracker entry, must degrade to a
//! non-match rather than fail.

use crate::{Field, Namespace};
use chrono::{Datelike, Timelike};
use probeql_event::Event;
use probeql_types::Value;

const TIME_FMT: &str = "%H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";

/// Resolves field identifiers against one event record.
///
/// Implementations never mutate the event or any shared registry and
/// are safe to call from any number of concurrent evaluators.
pub trait Accessor: Send + Sync {
    /// Fetch the value for the field, or `None` when the field does not
    /// apply to this event
    fn resolve(&self, field: &Field, evt: &Event) -> Option<Value>;
}

/// Dispatch a field to its namespace accessor.
///
/// The namespace tag was fixed when the expression was compiled, so
/// this is a plain match, not runtime introspection.
pub fn resolve_field(field: &Field, evt: &Event) -> Option<Value> {
    match field.namespace {
        Namespace::Kevt => KevtAccessor.resolve(field, evt),
        Namespace::Ps => PsAccessor.resolve(field, evt),
        Namespace::Pe => PeAccessor.resolve(field, evt),
        Namespace::Thread | Namespace::Image | Namespace::File | Namespace::Net | Namespace::Registry => {
            ParamAccessor.resolve(field, evt)
        }
    }
}

/// Extracts event-intrinsic values: identity, naming and every derived
/// calendar component of the event timestamp.
pub struct KevtAccessor;

impl Accessor for KevtAccessor {
    fn resolve(&self, field: &Field, evt: &Event) -> Option<Value> {
        let ts = evt.timestamp;
        match field.name {
            "kevt.seq" => Some(Value::Uint64(evt.seq)),
            "kevt.pid" => Some(Value::Pid(evt.pid)),
            "kevt.tid" => Some(Value::Tid(evt.tid)),
            "kevt.cpu" => Some(Value::Uint8(evt.cpu)),
            "kevt.name" => Some(Value::string(evt.name.clone())),
            "kevt.category" => Some(Value::string(evt.category.as_str())),
            "kevt.desc" => Some(Value::string(evt.description.clone())),
            "kevt.host" => Some(Value::string(evt.host.clone())),
            "kevt.nparams" => Some(Value::Uint64(evt.params.len() as u64)),
            "kevt.time" => Some(Value::string(ts.format(TIME_FMT).to_string())),
            "kevt.time.h" => Some(Value::Uint8(ts.hour() as u8)),
            "kevt.time.m" => Some(Value::Uint8(ts.minute() as u8)),
            "kevt.time.s" => Some(Value::Uint8(ts.second() as u8)),
            "kevt.time.ns" => Some(Value::Int64(ts.timestamp_nanos_opt().unwrap_or(0))),
            "kevt.date" => Some(Value::string(ts.format(DATE_FMT).to_string())),
            "kevt.date.d" => Some(Value::Uint8(ts.day() as u8)),
            "kevt.date.m" => Some(Value::Uint8(ts.month() as u8)),
            "kevt.date.tz" => Some(Value::string(ts.format("%Z").to_string())),
            "kevt.date.y" => Some(Value::Uint32(ts.year() as u32)),
            "kevt.date.week" => Some(Value::Uint8(ts.iso_week().week() as u8)),
            "kevt.date.weekday" => Some(Value::string(ts.format("%A").to_string())),
            _ => None,
        }
    }
}

/// Extracts process-state values, walking exactly one level to the
/// parent for the `ps.parent.` fields.
pub struct PsAccessor;

impl Accessor for PsAccessor {
    fn resolve(&self, field: &Field, evt: &Event) -> Option<Value> {
        let ps = evt.ps.as_ref()?;
        match field.name {
            "ps.pid" => Some(Value::Pid(ps.pid)),
            "ps.ppid" => Some(Value::Pid(ps.ppid)),
            "ps.name" => Some(Value::string(ps.name.clone())),
            "ps.comm" => Some(Value::string(ps.comm.clone())),
            "ps.exe" => Some(Value::string(ps.exe.clone())),
            "ps.cwd" => Some(Value::string(ps.cwd.clone())),
            "ps.args" => Some(Value::Slice(
                ps.args.iter().map(|a| Value::string(a.clone())).collect(),
            )),
            "ps.sid" => Some(Value::string(ps.sid.clone())),
            "ps.sessionid" => Some(Value::Uint32(ps.session_id)),
            "ps.envs" => Some(Value::Slice(
                ps.envs.iter().map(|e| Value::string(e.clone())).collect(),
            )),
            "ps.parent.pid" => evt.parent_ps().map(|p| Value::Pid(p.pid)),
            "ps.parent.name" => evt.parent_ps().map(|p| Value::string(p.name.clone())),
            "ps.parent.comm" => evt.parent_ps().map(|p| Value::string(p.comm.clone())),
            "ps.parent.exe" => evt.parent_ps().map(|p| Value::string(p.exe.clone())),
            "ps.parent.cwd" => evt.parent_ps().map(|p| Value::string(p.cwd.clone())),
            _ => None,
        }
    }
}

/// Extracts PE metadata values from the process context.
pub struct PeAccessor;

impl Accessor for PeAccessor {
    fn resolve(&self, field: &Field, evt: &Event) -> Option<Value> {
        let pe = evt.ps.as_ref()?.pe.as_ref()?;
        match field.name {
            "pe.nsections" => Some(Value::Uint16(pe.nsections)),
            "pe.nsymbols" => Some(Value::Uint32(pe.nsymbols)),
            "pe.address.base" => Some(Value::HexInt64(pe.base_address)),
            "pe.address.entrypoint" => Some(Value::HexInt64(pe.entry_point)),
            "pe.sections" => Some(Value::Slice(
                pe.sections.iter().map(|s| Value::string(s.clone())).collect(),
            )),
            "pe.symbols" => Some(Value::Slice(
                pe.symbols.iter().map(|s| Value::string(s.clone())).collect(),
            )),
            "pe.imports" => Some(Value::Slice(
                pe.imports.iter().map(|s| Value::string(s.clone())).collect(),
            )),
            "pe.timestamp" => pe.link_time.map(Value::Time),
            _ => None,
        }
    }
}

/// Extracts parameter-backed values for the thread, image, file, net
/// and registry namespaces. The parameter key is the field name with
/// the namespace prefix stripped, so `net.dport.name` reads the
/// `dport.name` parameter.
pub struct ParamAccessor;

impl Accessor for ParamAccessor {
    fn resolve(&self, field: &Field, evt: &Event) -> Option<Value> {
        let (_, key) = field.name.split_once('.')?;
        evt.params.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldRegistry;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use probeql_event::{EventCategory, ProcessInfo};
    use probeql_types::ValueKind;
    use std::sync::Arc;

    fn sample_event() -> Event {
        let tz = FixedOffset::east_opt(3600).unwrap();
        Event {
            seq: 42,
            pid: 1204,
            tid: 3201,
            cpu: 1,
            name: "Send".into(),
            category: EventCategory::Net,
            description: "transmits data over the wire".into(),
            host: "archrabbit".into(),
            // 2024-05-14 is a Tuesday in ISO week 20
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
                name: "svchost.exe".into(),
                parent: Some(Arc::new(ProcessInfo {
                    pid: 620,
                    name: "services.exe".into(),
                    ..Default::default()
                })),
                ..Default::default()
            })),
        }
    }

    fn resolve(name: &str, evt: &Event) -> Option<Value> {
        let registry = FieldRegistry::with_default_fields();
        let field = registry.lookup(name).unwrap_or_else(|| panic!("{name} not registered"));
        resolve_field(field, evt)
    }

    #[test]
    fn test_kevt_identity_fields() {
        let evt = sample_event();
        assert!(matches!(resolve("kevt.seq", &evt), Some(Value::Uint64(42))));
        assert!(matches!(resolve("kevt.pid", &evt), Some(Value::Pid(1204))));
        assert!(matches!(resolve("kevt.tid", &evt), Some(Value::Tid(3201))));
        assert!(matches!(resolve("kevt.cpu", &evt), Some(Value::Uint8(1))));
        assert!(matches!(resolve("kevt.nparams", &evt), Some(Value::Uint64(2))));
    }

    #[test]
    fn test_kevt_time_fields() {
        let evt = sample_event();
        assert_eq!(
            resolve("kevt.time", &evt).unwrap().as_str(),
            Some("22:13:49")
        );
        assert!(matches!(resolve("kevt.time.h", &evt), Some(Value::Uint8(22))));
        assert!(matches!(resolve("kevt.time.m", &evt), Some(Value::Uint8(13))));
        assert!(matches!(resolve("kevt.time.s", &evt), Some(Value::Uint8(49))));
    }

    #[test]
    fn test_kevt_date_fields() {
        let evt = sample_event();
        assert_eq!(
            resolve("kevt.date", &evt).unwrap().as_str(),
            Some("2024-05-14")
        );
        assert!(matches!(resolve("kevt.date.d", &evt), Some(Value::Uint8(14))));
        assert!(matches!(resolve("kevt.date.m", &evt), Some(Value::Uint8(5))));
        assert!(matches!(resolve("kevt.date.y", &evt), Some(Value::Uint32(2024))));
        assert!(matches!(resolve("kevt.date.week", &evt), Some(Value::Uint8(20))));
        assert_eq!(
            resolve("kevt.date.weekday", &evt).unwrap().as_str(),
            Some("Tuesday")
        );
    }

    #[test]
    fn test_resolved_kinds_match_declared_kinds() {
        let evt = sample_event();
        let registry = FieldRegistry::with_default_fields();
        for field in registry.iter().filter(|f| f.namespace == Namespace::Kevt) {
            let value = resolve_field(field, &evt)
                .unwrap_or_else(|| panic!("{} must resolve for any event", field.name));
            // Pid/Tid declared fields resolve to the dedicated kinds
            assert_eq!(
                value.kind(),
                field.kind,
                "kind mismatch for {}",
                field.name
            );
        }
    }

    #[test]
    fn test_ps_parent_walks_one_level() {
        let evt = sample_event();
        assert_eq!(
            resolve("ps.parent.name", &evt).unwrap().as_str(),
            Some("services.exe")
        );
        assert!(matches!(resolve("ps.parent.pid", &evt), Some(Value::Pid(620))));
    }

    #[test]
    fn test_absent_process_context_is_not_applicable() {
        let mut evt = sample_event();
        evt.ps = None;
        assert!(resolve("ps.name", &evt).is_none());
        assert!(resolve("ps.parent.name", &evt).is_none());
        assert!(resolve("pe.nsections", &evt).is_none());
    }

    #[test]
    fn test_param_backed_namespaces() {
        let evt = sample_event();
        assert!(matches!(resolve("net.dport", &evt), Some(Value::Port(443))));
        assert_eq!(
            resolve("net.dip", &evt).unwrap().kind(),
            ValueKind::Ipv4
        );
        // No such parameter on this event
        assert!(resolve("file.name", &evt).is_none());
    }
}
