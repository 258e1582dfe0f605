use indexmap::IndexMap;
use once_cell::sync::Lazy;
use probeql_types::{Value, ValueKind};
use std::fmt;
use thiserror::Error;

use crate::builtins;

/// Failure raised by a function body at evaluation time.
///
/// These never abort a rule: the evaluator records them and treats the
/// call as a non-match.
#[derive(Debug, Clone, Error)]
pub enum FunctionError {
    #[error("{func}: {message}")]
    Invocation { func: &'static str, message: String },
}

impl FunctionError {
    pub fn invocation(func: &'static str, message: impl Into<String>) -> Self {
        Self::Invocation {
            func,
            message: message.into(),
        }
    }
}

/// Class of value kinds an argument position accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Number,
    Ip,
    Bool,
    Slice,
}

impl ArgKind {
    /// Whether a declared kind tag satisfies this class.
    ///
    /// Unknown always passes: a parameter-backed field only reveals its
    /// concrete kind once an event supplies it.
    pub fn admits(&self, kind: ValueKind) -> bool {
        if kind == ValueKind::Unknown {
            return true;
        }
        match self {
            Self::String => kind.is_string(),
            Self::Number => kind.is_numeric(),
            Self::Ip => kind.is_ip(),
            Self::Bool => kind == ValueKind::Bool,
            Self::Slice => kind == ValueKind::Slice,
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Ip => "ip",
            Self::Bool => "bool",
            Self::Slice => "slice",
        };
        write!(f, "{}", name)
    }
}

/// One argument position in a function signature
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    /// Argument name as shown in diagnostics
    pub name: &'static str,
    /// Accepted kind classes for this position
    pub kinds: &'static [ArgKind],
}

impl ArgSpec {
    pub const fn new(name: &'static str, kinds: &'static [ArgKind]) -> Self {
        Self { name, kinds }
    }

    /// Whether the declared kind is acceptable at this position
    pub fn admits(&self, kind: ValueKind) -> bool {
        self.kinds.iter().any(|k| k.admits(kind))
    }

    /// The accepted classes rendered for a mismatch diagnostic
    pub fn accepted(&self) -> String {
        self.kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Complete description of one built-in function
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    /// Canonical uppercase name
    pub name: &'static str,
    /// Ordered argument signature; call arity must match its length
    pub args: &'static [ArgSpec],
    /// Kind tag of the value the function returns
    pub return_kind: ValueKind,
    /// Runtime body
    pub call: fn(&[Value]) -> Result<Value, FunctionError>,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

use ArgKind::{Ip, Number, Slice as SliceArg, String as Str};

/// Every function callable from an expression
pub const BUILTINS: &[FunctionDef] = &[
    FunctionDef {
        name: "CIDR_CONTAINS",
        args: &[ArgSpec::new("ip", &[Ip, Str]), ArgSpec::new("cidr", &[Str])],
        return_kind: ValueKind::Bool,
        call: builtins::cidr_contains,
    },
    FunctionDef {
        name: "MD5",
        args: &[ArgSpec::new("data", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::md5,
    },
    FunctionDef {
        name: "SHA1",
        args: &[ArgSpec::new("data", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::sha1,
    },
    FunctionDef {
        name: "SHA256",
        args: &[ArgSpec::new("data", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::sha256,
    },
    FunctionDef {
        name: "CONCAT",
        args: &[
            ArgSpec::new("s1", &[Str, Number]),
            ArgSpec::new("s2", &[Str, Number]),
        ],
        return_kind: ValueKind::UnicodeString,
        call: builtins::concat,
    },
    FunctionDef {
        name: "LOWER",
        args: &[ArgSpec::new("s", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::lower,
    },
    FunctionDef {
        name: "UPPER",
        args: &[ArgSpec::new("s", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::upper,
    },
    FunctionDef {
        name: "LTRIM",
        args: &[ArgSpec::new("s", &[Str]), ArgSpec::new("prefix", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::ltrim,
    },
    FunctionDef {
        name: "RTRIM",
        args: &[ArgSpec::new("s", &[Str]), ArgSpec::new("suffix", &[Str])],
        return_kind: ValueKind::UnicodeString,
        call: builtins::rtrim,
    },
    FunctionDef {
        name: "REPLACE",
        args: &[
            ArgSpec::new("s", &[Str]),
            ArgSpec::new("old", &[Str]),
            ArgSpec::new("new", &[Str]),
        ],
        return_kind: ValueKind::UnicodeString,
        call: builtins::replace,
    },
    FunctionDef {
        name: "LENGTH",
        args: &[ArgSpec::new("s", &[Str, SliceArg])],
        return_kind: ValueKind::Int32,
        call: builtins::length,
    },
    FunctionDef {
        name: "INDEXOF",
        args: &[ArgSpec::new("s", &[Str]), ArgSpec::new("sub", &[Str])],
        return_kind: ValueKind::Int32,
        call: builtins::indexof,
    },
    FunctionDef {
        name: "SPLIT",
        args: &[ArgSpec::new("s", &[Str]), ArgSpec::new("sep", &[Str])],
        return_kind: ValueKind::Slice,
        call: builtins::split,
    },
];

/// Immutable name-to-signature table consulted during parsing.
///
/// Lookup is case-insensitive; the table itself is never mutated after
/// construction, so a shared reference is safe across threads.
#[derive(Debug, Clone)]
pub struct FunctionCatalog {
    funcs: IndexMap<&'static str, &'static FunctionDef>,
}

impl FunctionCatalog {
    /// Catalog holding every built-in
    pub fn with_builtins() -> Self {
        let funcs = BUILTINS.iter().map(|f| (f.name, f)).collect();
        Self { funcs }
    }

    /// Case-insensitive lookup by name
    pub fn lookup(&self, name: &str) -> Option<&'static FunctionDef> {
        let upper = name.to_ascii_uppercase();
        self.funcs.get(upper.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// All definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &'static FunctionDef> + '_ {
        self.funcs.values().copied()
    }

    /// Canonical names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.funcs.keys().copied()
    }
}

impl Default for FunctionCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Shared catalog used when no custom one is supplied
pub fn default_catalog() -> &'static FunctionCatalog {
    static CATALOG: Lazy<FunctionCatalog> = Lazy::new(FunctionCatalog::with_builtins);
    &CATALOG
}
