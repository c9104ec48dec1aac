//! Listing parsers: raw tool output in, ordered records out.
//!
//! Parsing is best effort. A line that does not have the expected shape is
//! dropped and parsing carries on with the next one.

use crate::package_manager::PackageManager;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedPackage {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: String,
    pub label: String,
    pub metric_value: String,
}

/// Which resource a process listing is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    Cpu,
    Memory,
}

// Tools that draw progress spinners leave `\r`-separated frames in front of
// the real text.
fn visible(line: &str) -> &str {
    line.rsplit('\r').next().unwrap_or(line)
}

pub fn outdated_packages(raw: &str, manager: PackageManager) -> Vec<OutdatedPackage> {
    let names: Vec<String> = match manager {
        PackageManager::Homebrew => raw
            .lines()
            .map(|l| visible(l).trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        PackageManager::Chocolatey => parse_choco(raw),
        PackageManager::Winget => parse_winget(raw),
    };
    names
        .into_iter()
        .map(|name| OutdatedPackage { name })
        .collect()
}

fn parse_choco(raw: &str) -> Vec<String> {
    let body: Vec<&str> = raw
        .lines()
        .skip(1)
        .map(|l| visible(l).trim())
        .filter(|l| !l.is_empty())
        .collect();

    // When the listing uses `name|current|available` rows, only rows whose
    // first field is a single token are packages.
    let piped = body.iter().any(|l| l.contains('|'));

    body.into_iter()
        .filter_map(|l| {
            if piped {
                let first = l.split('|').next()?.trim();
                let single_token = !first.is_empty() && !first.contains(char::is_whitespace);
                (l.contains('|') && single_token).then(|| first.to_string())
            } else {
                l.split_whitespace().next().map(str::to_string)
            }
        })
        .collect()
}

fn parse_winget(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw.lines().map(visible).collect();
    let Some(header) = lines
        .iter()
        .position(|l| l.split_whitespace().next() == Some("Name"))
    else {
        return Vec::new();
    };

    lines[header + 1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .filter(|l| !is_winget_separator(l) && !is_winget_footer(l))
        .filter_map(|l| l.split_whitespace().nth(1).map(str::to_string))
        .collect()
}

fn is_winget_separator(line: &str) -> bool {
    line.trim().chars().all(|c| c == '-')
}

// "3 upgrades available." / "1 package(s) have version numbers that cannot be determined."
fn is_winget_footer(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let leading_count = tokens
        .next()
        .is_some_and(|t| t.bytes().all(|b| b.is_ascii_digit()));
    leading_count
        && tokens
            .next()
            .is_some_and(|t| t.starts_with("upgrade") || t.starts_with("package"))
}

pub fn process_usage(raw: &str, platform: Platform, ranking: Ranking) -> Vec<ProcessRecord> {
    match platform {
        Platform::MacLike => raw.lines().filter_map(|l| parse_ps_line(l, ranking)).collect(),
        Platform::WindowsLike => raw.lines().filter_map(parse_windows_line).collect(),
        Platform::Other => Vec::new(),
    }
}

// `ps aux`: USER PID %CPU %MEM VSZ RSS TT STAT STARTED TIME COMMAND
fn parse_ps_line(line: &str, ranking: Ranking) -> Option<ProcessRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() <= 10 || parts[1] == "PID" {
        return None;
    }
    let metric = match ranking {
        Ranking::Cpu => parts[2],
        Ranking::Memory => parts[3],
    };
    Some(ProcessRecord {
        pid: parts[1].to_string(),
        label: parts[10].to_string(),
        metric_value: metric.to_string(),
    })
}

// `<name> <pid> <metric>`
fn parse_windows_line(line: &str) -> Option<ProcessRecord> {
    let parts: Vec<&str> = visible(line).split_whitespace().collect();
    if parts.len() < 3 || !parts[1].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(ProcessRecord {
        pid: parts[1].to_string(),
        label: parts[0].to_string(),
        metric_value: parts[2].to_string(),
    })
}

/// Order records by numeric metric, highest first, keeping `limit` of them.
/// Records whose metric is not a number sort last; ties keep source order.
pub fn rank(mut records: Vec<ProcessRecord>, limit: usize) -> Vec<ProcessRecord> {
    let key = |r: &ProcessRecord| r.metric_value.parse::<f64>().unwrap_or(f64::NEG_INFINITY);
    records.sort_by(|a, b| key(b).total_cmp(&key(a)));
    records.truncate(limit);
    records
}
