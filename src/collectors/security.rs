use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::{run_tool, which};

/// Conventional auth-log locations, tried in order when the journal is
/// not usable.
const AUTH_LOG_PATHS: &[&str] = &["/var/log/auth.log", "/var/log/secure"];

const FAILED_LOGIN_PATTERN: &str = "Failed password";

/// Usernames with an active session, deduplicated and sorted. `None` when
/// the session listing tool is absent or fails.
pub fn logged_in_users() -> Option<Vec<String>> {
    let who = which("who")?;
    let output = run_tool(&who, &[])?;
    let names: BTreeSet<String> = output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect();
    Some(names.into_iter().collect())
}

/// Count of failed login attempts since boot. `None` means "unknown"
/// (no usable journal and no readable auth log), which is distinct from a
/// genuine count of zero.
pub fn failed_login_count() -> Option<u64> {
    if let Some(journalctl) = which("journalctl") {
        if let Some(output) = run_tool(&journalctl, &["-b", "-q", "-g", FAILED_LOGIN_PATTERN]) {
            return Some(output.lines().count() as u64);
        }
        debug!("journalctl present but query failed, falling back to auth logs");
    }

    let paths: Vec<&Path> = AUTH_LOG_PATHS.iter().map(Path::new).collect();
    count_in_log_files(&paths)
}

/// Scans the first readable existing log file for case-insensitive pattern
/// matches. An existing-but-unreadable file falls through to the next path.
fn count_in_log_files(paths: &[&Path]) -> Option<u64> {
    for path in paths {
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(path) {
            Ok(text) => return Some(count_matches(&text, FAILED_LOGIN_PATTERN)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "auth log unreadable");
            }
        }
    }
    None
}

fn count_matches(text: &str, pattern: &str) -> u64 {
    let needle = pattern.to_ascii_lowercase();
    text.lines()
        .filter(|line| line.to_ascii_lowercase().contains(&needle))
        .count() as u64
}
