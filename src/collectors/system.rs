use std::collections::HashSet;

use sysinfo::{CpuExt, DiskExt, PidExt, ProcessExt, System, SystemExt};

use crate::snapshot::{DiskReport, DiskStat, LoadAvgStat, MemoryStat, ProcessStat};

/// Virtual mounts excluded from physical disk accounting.
const PSEUDO_FILESYSTEMS: &[&str] = &["tmpfs", "devtmpfs", "squashfs"];

/// How many processes each top-N table keeps.
pub const TOP_N: usize = 5;

pub fn host_name(system: &System) -> String {
    system.host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Platform identity line. Static queries with static fallbacks, so this
/// never fails and never comes back empty.
pub fn os_description(system: &System) -> String {
    let name = system
        .name()
        .unwrap_or_else(|| std::env::consts::OS.to_string());
    let kernel = system.kernel_version().unwrap_or_else(|| "?".to_string());
    match system.long_os_version() {
        Some(long) => format!("{name} {kernel} ({long})"),
        None => format!("{name} {kernel}"),
    }
}

/// 1/5/15-minute load averages, a unix-only concept.
pub fn load_averages(system: &System) -> Option<LoadAvgStat> {
    if !cfg!(unix) {
        return None;
    }
    let avg = system.load_average();
    Some(LoadAvgStat {
        one: avg.one,
        five: avg.five,
        fifteen: avg.fifteen,
    })
}

/// Mean utilization across all logical cores, valid once the sampling
/// window has elapsed between two CPU refreshes.
pub fn cpu_usage_percent(system: &System) -> f64 {
    let cpus = system.cpus();
    if cpus.is_empty() {
        return 0.0;
    }
    let sum: f32 = cpus.iter().map(|c| c.cpu_usage()).sum();
    f64::from(sum / cpus.len() as f32)
}

pub fn memory_stats(system: &System) -> MemoryStat {
    let total = system.total_memory();
    let available = system.available_memory();
    let used = total.saturating_sub(available);
    MemoryStat {
        total_bytes: total,
        used_bytes: used,
        free_bytes: available,
        used_percent: percent(used, total),
    }
}

/// One partition as enumerated from the mount table, before the
/// exclusion/dedup policy is applied.
#[derive(Debug, Clone)]
pub(crate) struct Partition {
    pub mount: String,
    pub fstype: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

pub fn disk_report(system: &System) -> DiskReport {
    let partitions = system
        .disks()
        .iter()
        .map(|d| Partition {
            mount: d.mount_point().to_string_lossy().to_string(),
            fstype: String::from_utf8_lossy(d.file_system()).to_string(),
            total_bytes: d.total_space(),
            free_bytes: d.available_space(),
        })
        .collect();
    build_disk_report(partitions)
}

/// Drops pseudo-filesystems, keeps the first occurrence of each mount,
/// sorts rows by mount path and derives the TOTAL aggregate.
pub(crate) fn build_disk_report(partitions: Vec<Partition>) -> DiskReport {
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<DiskStat> = Vec::new();
    let (mut total_sum, mut used_sum, mut free_sum) = (0_u64, 0_u64, 0_u64);

    for p in partitions {
        if PSEUDO_FILESYSTEMS.contains(&p.fstype.as_str()) {
            continue;
        }
        if !seen.insert(p.mount.clone()) {
            continue;
        }
        let used = p.total_bytes.saturating_sub(p.free_bytes);
        total_sum += p.total_bytes;
        used_sum += used;
        free_sum += p.free_bytes;
        rows.push(DiskStat {
            mount: p.mount,
            total_bytes: p.total_bytes,
            used_bytes: used,
            free_bytes: p.free_bytes,
            used_percent: percent(used, p.total_bytes),
        });
    }

    rows.sort_by(|a, b| a.mount.cmp(&b.mount));

    let overall = DiskStat {
        mount: "TOTAL".to_string(),
        total_bytes: total_sum,
        used_bytes: used_sum,
        free_bytes: free_sum,
        used_percent: percent(used_sum, total_sum),
    };

    DiskReport {
        per_mount: rows,
        overall,
    }
}

/// Top-N tables by CPU and by resident memory. Processes that vanished
/// between the warm-up and the committed read are already gone from the
/// table, so nothing is reported as zero.
pub fn top_processes(system: &System) -> (Vec<ProcessStat>, Vec<ProcessStat>) {
    let mut procs: Vec<ProcessStat> = system
        .processes()
        .values()
        .map(|p| {
            let name = p.name();
            ProcessStat {
                pid: p.pid().as_u32(),
                name: if name.is_empty() {
                    "?".to_string()
                } else {
                    name.to_string()
                },
                cpu_percent: f64::from(p.cpu_usage()),
                mem_bytes: p.memory(),
            }
        })
        .collect();
    // Process-table iteration order is arbitrary; pin it so tie-breaking
    // in the top-N cut is deterministic.
    procs.sort_by_key(|p| p.pid);

    let top_cpu = top_by(&procs, |p| p.cpu_percent);
    let top_mem = top_by(&procs, |p| p.mem_bytes as f64);
    (top_cpu, top_mem)
}

/// Descending top-N cut; the stable sort keeps ties in input order.
pub(crate) fn top_by<F>(procs: &[ProcessStat], key: F) -> Vec<ProcessStat>
where
    F: Fn(&ProcessStat) -> f64,
{
    let mut sorted = procs.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(TOP_N);
    sorted
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}
