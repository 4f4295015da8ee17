use tracing::debug;

use super::{run_tool, which};
use crate::snapshot::{GpuDevice, GpuReport};

const NVIDIA_QUERY: &str = "--query-gpu=index,name,utilization.gpu,utilization.memory,\
                            memory.used,memory.total,temperature.gpu";

/// NVIDIA first (structured CSV), then AMD (raw text). Neither tool on the
/// search path means no GPU section at all.
pub fn collect() -> Option<GpuReport> {
    if let Some(smi) = which("nvidia-smi") {
        if let Some(output) = run_tool(&smi, &[NVIDIA_QUERY, "--format=csv,noheader,nounits"]) {
            let gpus = parse_nvidia_csv(&output);
            if !gpus.is_empty() {
                return Some(GpuReport::Nvidia { gpus });
            }
        }
        debug!("nvidia-smi present but produced no usable output");
    }

    if let Some(rocm) = which("rocm-smi") {
        if let Some(output) = run_tool(&rocm, &["--showuse", "--showtemp", "--showmemuse"]) {
            if !output.is_empty() {
                return Some(GpuReport::Amd { raw: output });
            }
        }
        debug!("rocm-smi present but produced no usable output");
    }

    None
}

fn parse_nvidia_csv(text: &str) -> Vec<GpuDevice> {
    text.lines().filter_map(parse_nvidia_line).collect()
}

/// Lines that do not carry all seven expected columns (e.g. "[N/A]"
/// placeholders on exotic boards) are skipped rather than guessed at.
fn parse_nvidia_line(line: &str) -> Option<GpuDevice> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 7 {
        return None;
    }

    Some(GpuDevice {
        id: parts[0].to_string(),
        model: parts[1].to_string(),
        gpu_util_percent: parse_f64_loose(parts[2])?,
        mem_util_percent: parse_f64_loose(parts[3])?,
        mem_used_mib: parse_f64_loose(parts[4])?,
        mem_total_mib: parse_f64_loose(parts[5])?,
        temp_celsius: parse_f64_loose(parts[6])?,
    })
}

/// Tolerates locale decimal commas and stray unit suffixes in tool output.
fn parse_f64_loose(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    if let Ok(v) = trimmed.replace(',', ".").parse::<f64>() {
        return Some(v);
    }

    let filtered: String = trimmed
        .chars()
        .filter(|c| {
            c.is_ascii_digit()
                || *c == '.'
                || *c == ','
                || *c == 'e'
                || *c == 'E'
                || *c == '-'
                || *c == '+'
        })
        .collect();
    if filtered.is_empty() {
        return None;
    }
    filtered.replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_csv() {
        let text = "0, NVIDIA GeForce RTX 3080, 45, 12, 4096, 10240, 61\n\
                    1, NVIDIA GeForce RTX 3090, 90, 80, 20480, 24576, 75";
        let gpus = parse_nvidia_csv(text);
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].id, "0");
        assert_eq!(gpus[0].model, "NVIDIA GeForce RTX 3080");
        assert_eq!(gpus[0].gpu_util_percent, 45.0);
        assert_eq!(gpus[0].mem_util_percent, 12.0);
        assert_eq!(gpus[0].mem_used_mib, 4096.0);
        assert_eq!(gpus[0].mem_total_mib, 10240.0);
        assert_eq!(gpus[1].temp_celsius, 75.0);
    }

    #[test]
    fn skips_short_and_garbage_lines() {
        let text = "0, Some GPU, 45\n\
                    not a csv line at all\n\
                    1, Real GPU, 10, 5, 100, 200, 50";
        let gpus = parse_nvidia_csv(text);
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].model, "Real GPU");
    }

    #[test]
    fn skips_lines_with_unparseable_values() {
        let text = "0, Odd GPU, [N/A], 5, 100, 200, 50";
        assert!(parse_nvidia_csv(text).is_empty());
    }

    #[test]
    fn loose_parse_accepts_decimal_commas_and_suffixes() {
        assert_eq!(parse_f64_loose("42"), Some(42.0));
        assert_eq!(parse_f64_loose("3,5"), Some(3.5));
        assert_eq!(parse_f64_loose("61 C"), Some(61.0));
        assert_eq!(parse_f64_loose("N/A"), None);
        assert_eq!(parse_f64_loose(""), None);
    }
}
