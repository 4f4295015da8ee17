pub mod gpu;
pub mod security;
pub mod system;
pub mod temps;

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use sysinfo::{System, SystemExt};
use thiserror::Error;
use tracing::debug;

use crate::snapshot::Snapshot;

/// Window over which CPU and per-process utilization deltas are measured.
pub const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(
        "virtual memory statistics are unavailable on this host; \
         hostsnap requires a platform with memory metrics supported by the sysinfo crate"
    )]
    MemoryUnavailable,
}

/// Runs every source adapter and assembles one snapshot. Adapters degrade
/// independently; the only failure that crosses this boundary is the
/// missing memory-metrics facility.
pub fn collect_snapshot(system: &mut System) -> Result<Snapshot, SnapshotError> {
    system.refresh_memory();
    if system.total_memory() == 0 {
        return Err(SnapshotError::MemoryUnavailable);
    }

    // Prime CPU and per-process counters, let one sampling window elapse,
    // then re-read so both deltas cover the same stretch of real activity.
    system.refresh_cpu();
    system.refresh_processes();
    thread::sleep(SAMPLE_WINDOW);
    system.refresh_cpu();
    system.refresh_processes();

    system.refresh_disks_list();
    system.refresh_disks();
    system.refresh_components_list();
    system.refresh_components();

    let (top_cpu, top_mem) = system::top_processes(system);

    Ok(Snapshot {
        host: system::host_name(system),
        os: system::os_description(system),
        uptime_seconds: system.uptime(),
        load_avg: system::load_averages(system),
        cpu_usage_percent: system::cpu_usage_percent(system),
        memory: system::memory_stats(system),
        disks: system::disk_report(system),
        top_cpu,
        top_mem,
        users: security::logged_in_users(),
        failed_logins: security::failed_login_count(),
        gpu: gpu::collect(),
        temperatures: temps::collect(system),
    })
}

/// Resolves a tool by name on the search path. `None` means the tool is
/// absent and its adapter reports "unavailable" without surfacing an error.
pub(crate) fn which(tool: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file())
}

/// Runs a located tool and returns its trimmed stdout. A failed spawn,
/// non-zero exit, or undecodable output all resolve to `None`.
pub(crate) fn run_tool(program: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        Err(err) => {
            debug!(program = %program.display(), error = %err, "tool invocation failed");
            return None;
        }
    };
    if !output.status.success() {
        debug!(program = %program.display(), status = %output.status, "tool exited with failure");
        return None;
    }

    match String::from_utf8(output.stdout) {
        Ok(text) => Some(text.trim().to_string()),
        Err(_) => {
            debug!(program = %program.display(), "tool produced non-utf8 output");
            None
        }
    }
}
