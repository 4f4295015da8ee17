const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Scales a byte count through the 1024 ladder. The base unit renders as
/// an integer, every scaled unit with exactly one decimal.
pub fn format_bytes(n: u64) -> String {
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", n, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
