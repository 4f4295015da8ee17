use std::fmt::Write;
use std::time::Duration;

use crate::snapshot::{GpuReport, Snapshot};
use crate::units::format_bytes;

const RULE_WIDTH: usize = 80;

/// Display cut applied to process names; the snapshot keeps them whole.
const PROC_NAME_WIDTH: usize = 22;
const GPU_MODEL_WIDTH: usize = 32;

const DISK_WIDTHS: [usize; 5] = [20, 10, 10, 10, 6];
const TOP_CPU_WIDTHS: [usize; 4] = [8, 22, 6, 10];
const TOP_MEM_WIDTHS: [usize; 4] = [8, 22, 10, 6];
const GPU_WIDTHS: [usize; 7] = [4, 32, 6, 6, 10, 10, 6];

/// One table cell: numeric cells are right-justified to their fixed column
/// width, textual cells left-justified.
enum Cell {
    Text(String),
    Num(String),
}

fn fmt_row(cells: &[Cell], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| match cell {
            Cell::Text(s) => format!("{:<w$}", s, w = *width),
            Cell::Num(s) => format!("{:>w$}", s, w = *width),
        })
        .collect::<Vec<String>>()
        .join("  ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Fixed-section text report. Every section header prints even when its
/// body degrades to a placeholder, so the report shape is stable across
/// hosts.
pub fn render_text(snapshot: &Snapshot) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "Host:        {}", snapshot.host);
    let _ = writeln!(out, "OS:          {}", snapshot.os);
    let _ = writeln!(
        out,
        "Uptime:      {}",
        humantime::format_duration(Duration::from_secs(snapshot.uptime_seconds))
    );
    match &snapshot.load_avg {
        Some(load) => {
            let _ = writeln!(
                out,
                "Load Avg:    1m: {:.2}  5m: {:.2}  15m: {:.2}",
                load.one, load.five, load.fifteen
            );
        }
        None => {
            let _ = writeln!(out, "Load Avg:    unavailable");
        }
    }
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(
        out,
        "CPU Usage:   {:.1}% (overall)",
        snapshot.cpu_usage_percent
    );
    let _ = writeln!(out, "{rule}");

    let mem = &snapshot.memory;
    let _ = writeln!(out, "Memory:");
    let _ = writeln!(
        out,
        "  Total: {}  Used: {}  Free: {}  Used: {:.1}%",
        format_bytes(mem.total_bytes),
        format_bytes(mem.used_bytes),
        format_bytes(mem.free_bytes),
        mem.used_percent
    );
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out, "Disk:");
    let _ = writeln!(
        out,
        "{}",
        fmt_row(
            &[
                Cell::Text("Mount".into()),
                Cell::Text("Total".into()),
                Cell::Text("Used".into()),
                Cell::Text("Free".into()),
                Cell::Text("Use%".into()),
            ],
            &DISK_WIDTHS
        )
    );
    for disk in &snapshot.disks.per_mount {
        let _ = writeln!(
            out,
            "{}",
            fmt_row(
                &[
                    Cell::Text(disk.mount.clone()),
                    Cell::Text(format_bytes(disk.total_bytes)),
                    Cell::Text(format_bytes(disk.used_bytes)),
                    Cell::Text(format_bytes(disk.free_bytes)),
                    Cell::Text(format!("{:.0}%", disk.used_percent)),
                ],
                &DISK_WIDTHS
            )
        );
    }
    let _ = writeln!(out, "{rule}");
    let overall = &snapshot.disks.overall;
    let _ = writeln!(
        out,
        "{}",
        fmt_row(
            &[
                Cell::Text(overall.mount.clone()),
                Cell::Text(format_bytes(overall.total_bytes)),
                Cell::Text(format_bytes(overall.used_bytes)),
                Cell::Text(format_bytes(overall.free_bytes)),
                Cell::Text(format!("{:.1}%", overall.used_percent)),
            ],
            &DISK_WIDTHS
        )
    );
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out, "Top 5 Processes by CPU:");
    let _ = writeln!(
        out,
        "{}",
        fmt_row(
            &[
                Cell::Text("PID".into()),
                Cell::Text("NAME".into()),
                Cell::Text("CPU%".into()),
                Cell::Text("MEM".into()),
            ],
            &TOP_CPU_WIDTHS
        )
    );
    for proc in &snapshot.top_cpu {
        let _ = writeln!(
            out,
            "{}",
            fmt_row(
                &[
                    Cell::Num(proc.pid.to_string()),
                    Cell::Text(truncate_chars(&proc.name, PROC_NAME_WIDTH)),
                    Cell::Text(format!("{:.1}", proc.cpu_percent)),
                    Cell::Text(format_bytes(proc.mem_bytes)),
                ],
                &TOP_CPU_WIDTHS
            )
        );
    }
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out, "Top 5 Processes by Memory:");
    let _ = writeln!(
        out,
        "{}",
        fmt_row(
            &[
                Cell::Text("PID".into()),
                Cell::Text("NAME".into()),
                Cell::Text("MEM".into()),
                Cell::Text("CPU%".into()),
            ],
            &TOP_MEM_WIDTHS
        )
    );
    for proc in &snapshot.top_mem {
        let _ = writeln!(
            out,
            "{}",
            fmt_row(
                &[
                    Cell::Num(proc.pid.to_string()),
                    Cell::Text(truncate_chars(&proc.name, PROC_NAME_WIDTH)),
                    Cell::Text(format_bytes(proc.mem_bytes)),
                    Cell::Text(format!("{:.1}", proc.cpu_percent)),
                ],
                &TOP_MEM_WIDTHS
            )
        );
    }
    let _ = writeln!(out, "{rule}");

    let users_line = match &snapshot.users {
        Some(users) if !users.is_empty() => users.join(", "),
        _ => "unavailable".to_string(),
    };
    let _ = writeln!(out, "Logged-in users: {users_line}");
    let failed_line = match snapshot.failed_logins {
        Some(count) => count.to_string(),
        None => "unknown".to_string(),
    };
    let _ = writeln!(out, "Failed SSH login attempts: {failed_line}");
    let _ = writeln!(out, "{rule}");

    match &snapshot.gpu {
        Some(GpuReport::Nvidia { gpus }) => {
            let _ = writeln!(out, "GPU:");
            let _ = writeln!(
                out,
                "{}",
                fmt_row(
                    &[
                        Cell::Text("ID".into()),
                        Cell::Text("Model".into()),
                        Cell::Text("GPU%".into()),
                        Cell::Text("Mem%".into()),
                        Cell::Text("Used".into()),
                        Cell::Text("Total".into()),
                        Cell::Text("Temp".into()),
                    ],
                    &GPU_WIDTHS
                )
            );
            for gpu in gpus {
                let _ = writeln!(
                    out,
                    "{}",
                    fmt_row(
                        &[
                            Cell::Text(gpu.id.clone()),
                            Cell::Text(truncate_chars(&gpu.model, GPU_MODEL_WIDTH)),
                            Cell::Text(format!("{:.0}", gpu.gpu_util_percent)),
                            Cell::Text(format!("{:.0}", gpu.mem_util_percent)),
                            Cell::Text(format!("{} MiB", gpu.mem_used_mib as i64)),
                            Cell::Text(format!("{} MiB", gpu.mem_total_mib as i64)),
                            Cell::Text(format!("{}\u{b0}C", gpu.temp_celsius as i64)),
                        ],
                        &GPU_WIDTHS
                    )
                );
            }
        }
        Some(GpuReport::Amd { raw }) => {
            let _ = writeln!(out, "GPU:");
            let _ = writeln!(out, "{raw}");
        }
        None => {
            let _ = writeln!(out, "GPU: not detected / nvidia-smi not found");
        }
    }

    match &snapshot.temperatures {
        Some(temps) => {
            let _ = writeln!(out, "Temperatures (sensors):");
            for (chip, readings) in temps {
                for reading in readings {
                    let _ = writeln!(
                        out,
                        "  {}: {} {:.1}\u{b0}C",
                        chip, reading.label, reading.celsius
                    );
                }
            }
        }
        None => {
            let _ = writeln!(out, "Temperatures: unavailable (install lm-sensors)");
        }
    }
    let _ = writeln!(out, "{rule}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        DiskReport, DiskStat, GpuDevice, LoadAvgStat, MemoryStat, ProcessStat, Snapshot, TempMap,
        TempReading,
    };

    fn disk(mount: &str, total: u64, used: u64) -> DiskStat {
        DiskStat {
            mount: mount.to_string(),
            total_bytes: total,
            used_bytes: used,
            free_bytes: total - used,
            used_percent: if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    fn degraded_snapshot() -> Snapshot {
        Snapshot {
            host: "testhost".to_string(),
            os: "Linux 6.1.0 (Debian GNU/Linux 12)".to_string(),
            uptime_seconds: 3661,
            load_avg: None,
            cpu_usage_percent: 12.5,
            memory: MemoryStat {
                total_bytes: 8 * 1024 * 1024 * 1024,
                used_bytes: 2 * 1024 * 1024 * 1024,
                free_bytes: 6 * 1024 * 1024 * 1024,
                used_percent: 25.0,
            },
            disks: DiskReport {
                per_mount: vec![disk("/", 100 * 1024 * 1024 * 1024, 40 * 1024 * 1024 * 1024)],
                overall: disk("TOTAL", 100 * 1024 * 1024 * 1024, 40 * 1024 * 1024 * 1024),
            },
            top_cpu: vec![ProcessStat {
                pid: 1234,
                name: "a-process-with-a-really-long-name".to_string(),
                cpu_percent: 42.0,
                mem_bytes: 1024 * 1024,
            }],
            top_mem: vec![ProcessStat {
                pid: 1234,
                name: "a-process-with-a-really-long-name".to_string(),
                cpu_percent: 42.0,
                mem_bytes: 1024 * 1024,
            }],
            users: None,
            failed_logins: None,
            gpu: None,
            temperatures: None,
        }
    }

    #[test]
    fn fmt_row_justifies_by_cell_kind() {
        let row = fmt_row(
            &[Cell::Num("42".into()), Cell::Text("name".into())],
            &[6, 8],
        );
        assert_eq!(row, "    42  name    ");
    }

    #[test]
    fn absent_load_average_renders_unavailable() {
        let text = render_text(&degraded_snapshot());
        assert!(text.contains("Load Avg:    unavailable"));
    }

    #[test]
    fn degraded_sections_keep_stable_headers() {
        let text = render_text(&degraded_snapshot());
        assert!(text.contains("Logged-in users: unavailable"));
        assert!(text.contains("Failed SSH login attempts: unknown"));
        assert!(text.contains("GPU: not detected / nvidia-smi not found"));
        assert!(text.contains("Temperatures: unavailable (install lm-sensors)"));
        assert!(text.contains("Top 5 Processes by CPU:"));
        assert!(text.contains("Top 5 Processes by Memory:"));
    }

    #[test]
    fn zero_failed_logins_is_not_unknown() {
        let mut snapshot = degraded_snapshot();
        snapshot.failed_logins = Some(0);
        let text = render_text(&snapshot);
        assert!(text.contains("Failed SSH login attempts: 0"));
    }

    #[test]
    fn process_names_are_cut_for_display_only() {
        let snapshot = degraded_snapshot();
        let text = render_text(&snapshot);
        assert!(text.contains("a-process-with-a-reall"));
        assert!(!text.contains("a-process-with-a-really"));
        // The canonical value stays whole.
        assert_eq!(snapshot.top_cpu[0].name, "a-process-with-a-really-long-name");
    }

    #[test]
    fn empty_user_list_renders_unavailable() {
        let mut snapshot = degraded_snapshot();
        snapshot.users = Some(Vec::new());
        let text = render_text(&snapshot);
        assert!(text.contains("Logged-in users: unavailable"));

        snapshot.users = Some(vec!["alice".to_string(), "bob".to_string()]);
        let text = render_text(&snapshot);
        assert!(text.contains("Logged-in users: alice, bob"));
    }

    #[test]
    fn nvidia_table_and_temperatures_render() {
        let mut snapshot = degraded_snapshot();
        snapshot.gpu = Some(GpuReport::Nvidia {
            gpus: vec![GpuDevice {
                id: "0".to_string(),
                model: "NVIDIA GeForce RTX 3080".to_string(),
                gpu_util_percent: 45.0,
                mem_util_percent: 12.0,
                mem_used_mib: 4096.0,
                mem_total_mib: 10240.0,
                temp_celsius: 61.0,
            }],
        });
        let mut temps = TempMap::new();
        temps.insert(
            "coretemp".to_string(),
            vec![TempReading {
                label: "Core 0".to_string(),
                celsius: 55.5,
            }],
        );
        snapshot.temperatures = Some(temps);

        let text = render_text(&snapshot);
        assert!(text.contains("NVIDIA GeForce RTX 3080"));
        assert!(text.contains("4096 MiB"));
        assert!(text.contains("61\u{b0}C"));
        assert!(text.contains("  coretemp: Core 0 55.5\u{b0}C"));
    }

    #[test]
    fn amd_report_renders_raw_text() {
        let mut snapshot = degraded_snapshot();
        snapshot.gpu = Some(GpuReport::Amd {
            raw: "GPU  Temp  AvgPwr\n0    54c   120W".to_string(),
        });
        let text = render_text(&snapshot);
        assert!(text.contains("GPU:\nGPU  Temp  AvgPwr"));
    }

    #[test]
    fn json_round_trip_preserves_absent_optionals_as_null() {
        let snapshot = degraded_snapshot();
        let json = render_json(&snapshot).expect("serialize");
        assert!(json.contains("\"load_avg\": null"));
        assert!(json.contains("\"users\": null"));
        assert!(json.contains("\"failed_logins\": null"));
        assert!(json.contains("\"gpu\": null"));
        assert!(json.contains("\"temperatures\": null"));

        let parsed: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn json_round_trip_with_all_sections_present() {
        let mut snapshot = degraded_snapshot();
        snapshot.load_avg = Some(LoadAvgStat {
            one: 0.52,
            five: 0.48,
            fifteen: 0.41,
        });
        snapshot.users = Some(vec!["alice".to_string()]);
        snapshot.failed_logins = Some(7);
        snapshot.gpu = Some(GpuReport::Amd {
            raw: "raw text".to_string(),
        });
        let mut temps = TempMap::new();
        temps.insert(
            "nvme".to_string(),
            vec![TempReading {
                label: "nvme0".to_string(),
                celsius: 38.0,
            }],
        );
        snapshot.temperatures = Some(temps);

        let json = render_json(&snapshot).expect("serialize");
        assert!(json.contains("\"vendor\": \"AMD\""));
        let parsed: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, snapshot);
    }
}
