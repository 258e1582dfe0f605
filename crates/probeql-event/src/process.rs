//! Process-state context supplied by the external tracker
//!
//! The tracker owns a tree of process entries linked by Arc parent
//! references. Entries reaching the engine are immutable snapshots; the
//! tracker may publish fresher snapshots concurrently, so a parent read
//! through an event can be stale. Stale is acceptable, dangling is not,
//! which is exactly what the Arc links guarantee.

use crate::Params;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One process entry in the tracker's tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Process identifier
    pub pid: u32,
    /// Parent process identifier
    pub ppid: u32,
    /// Image name (e.g. `svchost.exe`)
    pub name: String,
    /// Full command line
    pub comm: String,
    /// Full path of the executable image
    pub exe: String,
    /// Current working directory
    pub cwd: String,
    /// Command line arguments
    pub args: Vec<String>,
    /// Security identifier of the owning user
    pub sid: String,
    /// Session the process belongs to
    pub session_id: u32,
    /// Environment variables as NAME=value strings
    pub envs: Vec<String>,
    /// Parameters captured with the process state
    pub params: Params,
    /// Parent entry, one level up the tree
    #[serde(skip)]
    pub parent: Option<Arc<ProcessInfo>>,
    /// PE metadata of the process image, when resolved
    pub pe: Option<PeMetadata>,
}

/// Portable-executable metadata of a process image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeMetadata {
    /// Number of sections
    pub nsections: u16,
    /// Number of symbols
    pub nsymbols: u32,
    /// Image base address
    pub base_address: u64,
    /// Entry point address
    pub entry_point: u64,
    /// Link-time timestamp
    pub link_time: Option<DateTime<FixedOffset>>,
    /// Section names in image order
    pub sections: Vec<String>,
    /// Exported symbols
    pub symbols: Vec<String>,
    /// Imported libraries
    pub imports: Vec<String>,
}
