use std::fs;
use std::path::Path;

use sysinfo::{ComponentExt, System, SystemExt};
use tracing::debug;

use crate::snapshot::{TempMap, TempReading};

#[cfg(target_os = "linux")]
const NVME_SYSFS_ROOT: &str = "/sys/class/nvme";

/// Merges the generic hardware-sensor view with the NVMe sysfs tree into
/// one chip-to-readings mapping. An empty merge means the whole section is
/// absent.
pub fn collect(system: &System) -> Option<TempMap> {
    let mut temps = TempMap::new();

    for component in system.components() {
        let (chip, label) = match split_component_label(component.label()) {
            Some(parts) => parts,
            None => continue,
        };
        temps.entry(chip).or_default().push(TempReading {
            label,
            celsius: f64::from(component.temperature()),
        });
    }

    collect_nvme_temps(&mut temps);

    if temps.is_empty() {
        None
    } else {
        Some(temps)
    }
}

/// Component labels come through as one string ("coretemp Core 0"); the
/// first token is the chip, the rest is the sensor label. Bare labels get
/// "temp".
fn split_component_label(label: &str) -> Option<(String, String)> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    match label.split_once(' ') {
        Some((chip, rest)) => Some((chip.to_string(), rest.trim().to_string())),
        None => Some((label.to_string(), "temp".to_string())),
    }
}

#[cfg(target_os = "linux")]
fn collect_nvme_temps(temps: &mut TempMap) {
    walk_nvme_tree(Path::new(NVME_SYSFS_ROOT), temps);
}

#[cfg(not(target_os = "linux"))]
fn collect_nvme_temps(_temps: &mut TempMap) {}

/// Reads `<root>/<dev>/device/hwmon/<hwmonN>/temp*_input` millidegree
/// files. Any unreadable entry is skipped silently.
fn walk_nvme_tree(root: &Path, temps: &mut TempMap) {
    let Ok(devices) = fs::read_dir(root) else {
        return;
    };
    for device in devices.flatten() {
        let name = device.file_name().to_string_lossy().to_string();
        let hwmon_root = device.path().join("device").join("hwmon");
        let Ok(hwmons) = fs::read_dir(&hwmon_root) else {
            continue;
        };
        for hwmon in hwmons.flatten() {
            let Ok(files) = fs::read_dir(hwmon.path()) else {
                continue;
            };
            for file in files.flatten() {
                let file_name = file.file_name().to_string_lossy().to_string();
                if !file_name.starts_with("temp") || !file_name.ends_with("_input") {
                    continue;
                }
                match read_millidegrees(&file.path()) {
                    Some(celsius) => {
                        temps.entry("nvme".to_string()).or_default().push(TempReading {
                            label: name.clone(),
                            celsius,
                        });
                    }
                    None => {
                        debug!(file = %file.path().display(), "unreadable nvme temperature");
                    }
                }
            }
        }
    }
}

fn read_millidegrees(path: &Path) -> Option<f64> {
    let raw = fs::read_to_string(path).ok()?;
    let milli: i64 = raw.trim().parse().ok()?;
    Some(milli as f64 / 1000.0)
}
