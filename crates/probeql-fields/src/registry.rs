//! The immutable field registry
//!
//! One table, built once at startup and passed by reference to the
//! parser and the accessors. Every addressable field name appears here
//! with its namespace tag and declared value kind; an expression
//! referencing anything else is rejected at compile time.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use probeql_types::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace tag of a field, fixed at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Event-intrinsic attributes (`kevt.`)
    Kevt,
    /// Process state (`ps.`)
    Ps,
    /// Thread parameters (`thread.`)
    Thread,
    /// Image load/unload parameters (`image.`)
    Image,
    /// File system parameters (`file.`)
    File,
    /// Network parameters (`net.`)
    Net,
    /// Registry parameters (`registry.`)
    Registry,
    /// PE metadata of the process image (`pe.`)
    Pe,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Kevt => "kevt",
            Self::Ps => "ps",
            Self::Thread => "thread",
            Self::Image => "image",
            Self::File => "file",
            Self::Net => "net",
            Self::Registry => "registry",
            Self::Pe => "pe",
        };
        write!(f, "{}", name)
    }
}

/// One addressable field: interned name, namespace tag, declared kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Full dotted name, e.g. `ps.parent.name`
    pub name: &'static str,
    /// Namespace the field dispatches through
    pub namespace: Namespace,
    /// Declared value kind, used for compile-time checks
    pub kind: ValueKind,
}

impl Field {
    const fn new(name: &'static str, namespace: Namespace, kind: ValueKind) -> Self {
        Self {
            name,
            namespace,
            kind,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

use Namespace::{File, Image, Kevt, Net, Pe, Ps, Registry as Reg, Thread};
use ValueKind::{
    HexInt64, Ip, Pid, Port, Slice, Time, Tid, Uint16, Uint32, Uint64, Uint8, UnicodeString as Str,
};

/// Every addressable field, in registry order
const FIELDS: &[Field] = &[
    // Event-intrinsic
    Field::new("kevt.seq", Kevt, Uint64),
    Field::new("kevt.pid", Kevt, Pid),
    Field::new("kevt.tid", Kevt, Tid),
    Field::new("kevt.cpu", Kevt, Uint8),
    Field::new("kevt.name", Kevt, Str),
    Field::new("kevt.category", Kevt, Str),
    Field::new("kevt.desc", Kevt, Str),
    Field::new("kevt.host", Kevt, Str),
    Field::new("kevt.nparams", Kevt, Uint64),
    Field::new("kevt.time", Kevt, Str),
    Field::new("kevt.time.h", Kevt, Uint8),
    Field::new("kevt.time.m", Kevt, Uint8),
    Field::new("kevt.time.s", Kevt, Uint8),
    Field::new("kevt.time.ns", Kevt, ValueKind::Int64),
    Field::new("kevt.date", Kevt, Str),
    Field::new("kevt.date.d", Kevt, Uint8),
    Field::new("kevt.date.m", Kevt, Uint8),
    Field::new("kevt.date.tz", Kevt, Str),
    Field::new("kevt.date.y", Kevt, Uint32),
    Field::new("kevt.date.week", Kevt, Uint8),
    Field::new("kevt.date.weekday", Kevt, Str),
    // Process state
    Field::new("ps.pid", Ps, Pid),
    Field::new("ps.ppid", Ps, Pid),
    Field::new("ps.name", Ps, Str),
    Field::new("ps.comm", Ps, Str),
    Field::new("ps.exe", Ps, Str),
    Field::new("ps.cwd", Ps, Str),
    Field::new("ps.args", Ps, Slice),
    Field::new("ps.sid", Ps, Str),
    Field::new("ps.sessionid", Ps, Uint32),
    Field::new("ps.envs", Ps, Slice),
    Field::new("ps.parent.pid", Ps, Pid),
    Field::new("ps.parent.name", Ps, Str),
    Field::new("ps.parent.comm", Ps, Str),
    Field::new("ps.parent.exe", Ps, Str),
    Field::new("ps.parent.cwd", Ps, Str),
    // Thread parameters
    Field::new("thread.prio", Thread, Uint8),
    Field::new("thread.base.prio", Thread, Uint8),
    Field::new("thread.io.prio", Thread, Uint8),
    Field::new("thread.entrypoint", Thread, HexInt64),
    Field::new("thread.kstack.base", Thread, HexInt64),
    Field::new("thread.ustack.base", Thread, HexInt64),
    // Image parameters
    Field::new("image.name", Image, Str),
    Field::new("image.base.address", Image, HexInt64),
    Field::new("image.size", Image, Uint32),
    Field::new("image.checksum", Image, Uint32),
    Field::new("image.pid", Image, Pid),
    // File parameters
    Field::new("file.name", File, Str),
    Field::new("file.operation", File, Str),
    Field::new("file.io.size", File, Uint32),
    Field::new("file.offset", File, Uint64),
    Field::new("file.type", File, Str),
    Field::new("file.share.mask", File, Str),
    // Network parameters
    Field::new("net.sip", Net, Ip),
    Field::new("net.dip", Net, Ip),
    Field::new("net.sport", Net, Port),
    Field::new("net.dport", Net, Port),
    Field::new("net.sport.name", Net, Str),
    Field::new("net.dport.name", Net, Str),
    Field::new("net.l4.proto", Net, Str),
    Field::new("net.sip.names", Net, Slice),
    Field::new("net.dip.names", Net, Slice),
    // Registry parameters
    Field::new("registry.key.name", Reg, Str),
    Field::new("registry.key.handle", Reg, HexInt64),
    Field::new("registry.value", Reg, Str),
    Field::new("registry.value.type", Reg, Str),
    Field::new("registry.status", Reg, Str),
    // PE metadata
    Field::new("pe.nsections", Pe, Uint16),
    Field::new("pe.nsymbols", Pe, Uint32),
    Field::new("pe.address.base", Pe, HexInt64),
    Field::new("pe.address.entrypoint", Pe, HexInt64),
    Field::new("pe.sections", Pe, Slice),
    Field::new("pe.symbols", Pe, Slice),
    Field::new("pe.imports", Pe, Slice),
    Field::new("pe.timestamp", Pe, Time),
];

/// Immutable mapping of field name to its definition
pub struct FieldRegistry {
    fields: IndexMap<&'static str, Field>,
}

impl FieldRegistry {
    /// Build the registry with every known field
    pub fn with_default_fields() -> Self {
        Self {
            fields: FIELDS.iter().map(|f| (f.name, *f)).collect(),
        }
    }

    /// Resolve a dotted field name
    pub fn lookup(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Number of registered fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::with_default_fields()
    }
}

/// Shared default registry, constructed once and never mutated
pub fn default_registry() -> &'static FieldRegistry {
    static REGISTRY: Lazy<FieldRegistry> = Lazy::new(FieldRegistry::with_default_fields);
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_field() {
        let registry = FieldRegistry::with_default_fields();
        let field = registry.lookup("net.dip").expect("net.dip registered");
        assert_eq!(field.namespace, Namespace::Net);
        assert_eq!(field.kind, ValueKind::Ip);
    }

    #[test]
    fn test_lookup_unknown_field() {
        let registry = FieldRegistry::with_default_fields();
        assert!(registry.lookup("net.dipp").is_none());
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn test_no_duplicate_names() {
        let registry = FieldRegistry::with_default_fields();
        assert_eq!(registry.len(), FIELDS.len());
    }

    #[test]
    fn test_parent_fields_are_ps_namespace() {
        let registry = FieldRegistry::with_default_fields();
        let field = registry.lookup("ps.parent.name").unwrap();
        assert_eq!(field.namespace, Namespace::Ps);
    }
}
