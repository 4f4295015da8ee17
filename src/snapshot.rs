use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of sensor chip name to its readings, in discovery order.
pub type TempMap = BTreeMap<String, Vec<TempReading>>;

/// One complete point-in-time report. Built once per invocation and
/// discarded after rendering; every environment-dependent field is
/// optional, where `None` means "unavailable on this host".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub host: String,
    pub os: String,
    pub uptime_seconds: u64,
    pub load_avg: Option<LoadAvgStat>,
    pub cpu_usage_percent: f64,
    pub memory: MemoryStat,
    pub disks: DiskReport,
    pub top_cpu: Vec<ProcessStat>,
    pub top_mem: Vec<ProcessStat>,
    pub users: Option<Vec<String>>,
    pub failed_logins: Option<u64>,
    pub gpu: Option<GpuReport>,
    pub temperatures: Option<TempMap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAvgStat {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// `used_bytes` counts what new allocations cannot have: total minus the
/// kernel's reclaimable-plus-free estimate, not total minus raw free.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStat {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskReport {
    pub per_mount: Vec<DiskStat>,
    /// Derived sum over `per_mount`, never a source value.
    pub overall: DiskStat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStat {
    pub mount: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

/// `name` is the full process name; the 22-char cut is a text-renderer
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStat {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vendor")]
pub enum GpuReport {
    #[serde(rename = "NVIDIA")]
    Nvidia { gpus: Vec<GpuDevice> },
    /// rocm-smi output is kept verbatim rather than parsed.
    #[serde(rename = "AMD")]
    Amd { raw: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuDevice {
    pub id: String,
    pub model: String,
    pub gpu_util_percent: f64,
    pub mem_util_percent: f64,
    pub mem_used_mib: f64,
    pub mem_total_mib: f64,
    pub temp_celsius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempReading {
    pub label: String,
    pub celsius: f64,
}
