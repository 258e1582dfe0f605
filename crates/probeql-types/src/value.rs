//! The `Value` tagged union and its kind tags
//!
//! The kind roster mirrors the parameter type lattice of the capture
//! subsystem: fixed-width integers in both signednesses, hex-rendered
//! integers, identifiers with dedicated kinds (PID, TID, port), network
//! addresses, timestamps, binary blobs and collections.

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Kind tag for a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Absent value
    None,
    /// UTF-16 originated string, stored as UTF-8
    UnicodeString,
    /// 8-bit character string
    AnsiString,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    /// IEEE 4-byte floating point
    Float,
    /// IEEE 8-byte floating point
    Double,
    Bool,
    /// Binary data of variable size
    Binary,
    /// Pointer-sized unsigned integer
    Pointer,
    /// Process identifier
    Pid,
    /// Thread identifier
    Tid,
    HexInt8,
    HexInt16,
    HexInt32,
    HexInt64,
    /// Endpoint port number
    Port,
    /// IP address, either family
    Ip,
    Ipv4,
    Ipv6,
    /// Wall-clock timestamp
    Time,
    /// Ordered collection of values
    Slice,
    /// Enumeration backed by a raw integer
    Enum,
    /// Keyed collection of values
    Map,
    /// Generic object
    Object,
    /// Unknown parameter type
    Unknown,
}

impl ValueKind {
    /// Signed or unsigned fixed-width integer kinds, including the
    /// identifier and hex variants that are integers on the wire
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Uint8
                | Self::Int16
                | Self::Uint16
                | Self::Int32
                | Self::Uint32
                | Self::Int64
                | Self::Uint64
                | Self::Pointer
                | Self::Pid
                | Self::Tid
                | Self::HexInt8
                | Self::HexInt16
                | Self::HexInt32
                | Self::HexInt64
                | Self::Port
                | Self::Enum
        )
    }

    /// Floating-point kinds
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Any numeric kind
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// String kinds
    pub fn is_string(&self) -> bool {
        matches!(self, Self::UnicodeString | Self::AnsiString)
    }

    /// IP address kinds
    pub fn is_ip(&self) -> bool {
        matches!(self, Self::Ip | Self::Ipv4 | Self::Ipv6)
    }

    /// Compile-time comparability relation between two declared kinds.
    ///
    /// Unknown is compatible with everything: its kind only becomes
    /// concrete once an event supplies the parameter.
    pub fn is_comparable_with(&self, other: &ValueKind) -> bool {
        if matches!(self, Self::Unknown | Self::None) || matches!(other, Self::Unknown | Self::None)
        {
            return true;
        }
        (self.is_numeric() && other.is_numeric())
            || (self.is_string() && other.is_string())
            || (self.is_ip() && other.is_ip())
            // IP fields compare against string literals (addresses, CIDR blocks)
            || (self.is_ip() && other.is_string())
            || (self.is_string() && other.is_ip())
            || (*self == Self::Bool && *other == Self::Bool)
            || (*self == Self::Time && *other == Self::Time)
            || *self == Self::Slice
            || *other == Self::Slice
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::UnicodeString => "unicode string",
            Self::AnsiString => "ansi string",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Binary => "binary",
            Self::Pointer => "pointer",
            Self::Pid => "pid",
            Self::Tid => "tid",
            Self::HexInt8 => "hex8",
            Self::HexInt16 => "hex16",
            Self::HexInt32 => "hex32",
            Self::HexInt64 => "hex64",
            Self::Port => "port",
            Self::Ip => "ip",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Time => "time",
            Self::Slice => "slice",
            Self::Enum => "enum",
            Self::Map => "map",
            Self::Object => "object",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Runtime value produced by accessors, literals and functions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Null,
    UnicodeString(String),
    AnsiString(String),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Binary(Vec<u8>),
    Pointer(u64),
    Pid(u32),
    Tid(u32),
    HexInt8(u8),
    HexInt16(u16),
    HexInt32(u32),
    HexInt64(u64),
    Port(u16),
    Ip(IpAddr),
    Time(DateTime<FixedOffset>),
    Slice(Vec<Value>),
    Enum(u32),
    Map(IndexMap<String, Value>),
    Object(serde_json::Value),
    Unknown,
}

impl Value {
    /// Get the kind tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::None,
            Self::UnicodeString(_) => ValueKind::UnicodeString,
            Self::AnsiString(_) => ValueKind::AnsiString,
            Self::Int8(_) => ValueKind::Int8,
            Self::Uint8(_) => ValueKind::Uint8,
            Self::Int16(_) => ValueKind::Int16,
            Self::Uint16(_) => ValueKind::Uint16,
            Self::Int32(_) => ValueKind::Int32,
            Self::Uint32(_) => ValueKind::Uint32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::Binary(_) => ValueKind::Binary,
            Self::Pointer(_) => ValueKind::Pointer,
            Self::Pid(_) => ValueKind::Pid,
            Self::Tid(_) => ValueKind::Tid,
            Self::HexInt8(_) => ValueKind::HexInt8,
            Self::HexInt16(_) => ValueKind::HexInt16,
            Self::HexInt32(_) => ValueKind::HexInt32,
            Self::HexInt64(_) => ValueKind::HexInt64,
            Self::Port(_) => ValueKind::Port,
            Self::Ip(addr) => match addr {
                IpAddr::V4(_) => ValueKind::Ipv4,
                IpAddr::V6(_) => ValueKind::Ipv6,
            },
            Self::Time(_) => ValueKind::Time,
            Self::Slice(_) => ValueKind::Slice,
            Self::Enum(_) => ValueKind::Enum,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
            Self::Unknown => ValueKind::Unknown,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is boolean true
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Widen to i128 if the value is any integer kind
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int8(v) => Some(*v as i128),
            Self::Uint8(v) | Self::HexInt8(v) => Some(*v as i128),
            Self::Int16(v) => Some(*v as i128),
            Self::Uint16(v) | Self::HexInt16(v) => Some(*v as i128),
            Self::Int32(v) => Some(*v as i128),
            Self::Uint32(v) | Self::HexInt32(v) | Self::Pid(v) | Self::Tid(v) | Self::Enum(v) => {
                Some(*v as i128)
            }
            Self::Int64(v) => Some(*v as i128),
            Self::Uint64(v) | Self::HexInt64(v) | Self::Pointer(v) => Some(*v as i128),
            Self::Port(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Widen to f64 if the value is any numeric kind
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            other => other.as_i128().map(|i| i as f64),
        }
    }

    /// Borrow the string payload of either string kind
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::UnicodeString(s) | Self::AnsiString(s) => Some(s),
            _ => None,
        }
    }

    /// Get the IP payload
    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Borrow the slice payload
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Slice(items) => Some(items),
            _ => None,
        }
    }

    /// Canonical string rendering used by the string predicates
    /// (`contains`, `startswith`, `endswith`, `matches`)
    pub fn string_form(&self) -> Option<String> {
        match self {
            Self::UnicodeString(s) | Self::AnsiString(s) => Some(s.clone()),
            Self::Ip(addr) => Some(addr.to_string()),
            Self::HexInt8(v) => Some(format!("{:#x}", v)),
            Self::HexInt16(v) => Some(format!("{:#x}", v)),
            Self::HexInt32(v) => Some(format!("{:#x}", v)),
            Self::HexInt64(v) => Some(format!("{:#x}", v)),
            Self::Pointer(v) => Some(format!("{:#x}", v)),
            other => other.as_i128().map(|i| i.to_string()),
        }
    }

    /// Create a unicode string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::UnicodeString(value.into())
    }
}

// Display renders the operator-facing form of a value: quoted strings,
// hex for pointer-like kinds, recursive rendering for collections.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::UnicodeString(s) | Self::AnsiString(s) => write!(f, "'{}'", s),
            Self::Int8(v) => write!(f, "{}", v),
            Self::Uint8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Uint16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Uint32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Uint64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Binary(bytes) => write!(f, "binary({} bytes)", bytes.len()),
            Self::Pointer(v) => write!(f, "{:#x}", v),
            Self::Pid(v) => write!(f, "{}", v),
            Self::Tid(v) => write!(f, "{}", v),
            Self::HexInt8(v) => write!(f, "{:#x}", v),
            Self::HexInt16(v) => write!(f, "{:#x}", v),
            Self::HexInt32(v) => write!(f, "{:#x}", v),
            Self::HexInt64(v) => write!(f, "{:#x}", v),
            Self::Port(v) => write!(f, "{}", v),
            Self::Ip(addr) => write!(f, "{}", addr),
            Self::Time(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Slice(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Self::Enum(v) => write!(f, "{}", v),
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Self::Object(obj) => write!(f, "{}", obj),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
