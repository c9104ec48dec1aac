//! Metric probes.
//!
//! Every probe is total: a missing tool, a failed command or unexpected
//! output all come back as `None`, which the summary renders as `N/A`.
//!
//! - macOS: ioreg, du, sysctl, df, vm_stat, istats
//! - Windows: wmic, net stats

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use tracing::warn;

use crate::executor::Executor;
use crate::platform::Platform;
use crate::shell::{Dialect, ShellLine};

pub const UNAVAILABLE: &str = "N/A";

/// Render a probe result for display.
pub fn or_unavailable(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNAVAILABLE.to_string())
}

// ── Battery ────────────────────────────────────────────────

pub fn battery_health(platform: Platform, exec: &dyn Executor) -> Option<String> {
    match platform {
        Platform::MacLike => {
            let line = ShellLine::new(Dialect::Posix, "ioreg")
                .raw("-r")
                .raw("-c")
                .raw("AppleSmartBattery");
            let output = exec.execute(&line);
            let text = output.non_empty()?;
            // Apple Silicon reports MaxCapacity as a percentage; the mAh
            // figure lives in AppleRawMaxCapacity.
            let max = ioreg_number(text, "AppleRawMaxCapacity")
                .or_else(|| ioreg_number(text, "MaxCapacity"));
            health_percent(max, ioreg_number(text, "DesignCapacity"))
        }
        Platform::WindowsLike => {
            let full = ShellLine::new(Dialect::Cmd, "wmic")
                .raw(r"/namespace:\\root\wmi")
                .raw("path BatteryFullChargedCapacity get FullChargedCapacity");
            let design = ShellLine::new(Dialect::Cmd, "wmic")
                .raw(r"/namespace:\\root\wmi")
                .raw("path BatteryStaticData get DesignedCapacity");
            let full = exec.execute(&full).text().and_then(wmic_number);
            let design = exec.execute(&design).text().and_then(wmic_number);
            health_percent(full, design)
        }
        Platform::Other => None,
    }
}

/// `100 * max / design` with two decimals. `None` when either reading is
/// missing or the design capacity is zero.
pub fn health_percent(max: Option<u64>, design: Option<u64>) -> Option<String> {
    let (max, design) = (max?, design?);
    if design == 0 {
        return None;
    }
    Some(format!("{:.2}%", max as f64 * 100.0 / design as f64))
}

/// First numeric value of `"Key" = 123` or `"Key"=123` in an ioreg dump.
pub fn ioreg_number(dump: &str, key: &str) -> Option<u64> {
    let needle = format!("\"{}\"", key);
    dump.match_indices(&needle).find_map(|(at, _)| {
        let rest = dump[at + needle.len()..].trim_start();
        let value = rest.strip_prefix('=')?.trim_start();
        let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    })
}

/// The value under a single-column `wmic ... get <Column>` header.
pub fn wmic_number(output: &str) -> Option<u64> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .nth(1)?
        .parse()
        .ok()
}

// ── Cache size ─────────────────────────────────────────────

/// Human readable size of `path`. An empty `du` result reads as `0B`.
pub fn cache_size(platform: Platform, exec: &dyn Executor, path: &str) -> Option<String> {
    if platform != Platform::MacLike {
        return None;
    }
    let line = match ShellLine::new(Dialect::Posix, "du").raw("-sh").path(path) {
        Ok(line) => line.raw("2>/dev/null"),
        Err(e) => {
            warn!(path, error = %e, "skipping cache size probe");
            return None;
        }
    };
    let output = exec.execute(&line);
    let size = output
        .text()
        .and_then(|s| s.split_whitespace().next())
        .unwrap_or("0B");
    Some(size.to_string())
}

/// Size of `path` in whole megabytes, used to report freed space.
pub fn cache_size_mb(platform: Platform, exec: &dyn Executor, path: &str) -> Option<i64> {
    if platform != Platform::MacLike {
        return None;
    }
    let line = ShellLine::new(Dialect::Posix, "du")
        .raw("-sm")
        .path(path)
        .ok()?
        .raw("2>/dev/null");
    exec.execute(&line)
        .text()?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

// ── Uptime ─────────────────────────────────────────────────

pub fn uptime(platform: Platform, exec: &dyn Executor) -> Option<String> {
    match platform {
        Platform::MacLike => {
            let line = ShellLine::new(Dialect::Posix, "sysctl")
                .raw("-n")
                .raw("kern.boottime");
            let output = exec.execute(&line);
            uptime_from_boottime(output.non_empty()?, Utc::now())
        }
        Platform::WindowsLike => {
            let line = ShellLine::new(Dialect::Cmd, "net").raw("stats workstation");
            let output = exec.execute(&line);
            uptime_from_net_stats(output.non_empty()?, Local::now().naive_local())
        }
        Platform::Other => None,
    }
}

/// `{ sec = 1700000000, usec = 0 } Tue Nov 14 22:13:20 2023`
pub fn uptime_from_boottime(output: &str, now: DateTime<Utc>) -> Option<String> {
    let sec: i64 = output.split("sec = ").nth(1)?.split(',').next()?.trim().parse().ok()?;
    let boot = DateTime::from_timestamp(sec, 0)?;
    let secs = (now - boot).num_seconds();
    (secs >= 0).then(|| fmt_uptime(secs as u64))
}

/// `Statistics since 10/16/2026 9:00:00 AM`. Falls back to the raw line
/// when the date uses a locale format we do not know.
pub fn uptime_from_net_stats(output: &str, now: NaiveDateTime) -> Option<String> {
    let line = output.lines().find(|l| l.contains("since"))?.trim();
    let stamp = line.split("since").nth(1).unwrap_or_default().trim();

    const FORMATS: &[&str] = &["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M:%S", "%d/%m/%Y %H:%M:%S"];
    let booted = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(stamp, f).ok());

    match booted {
        Some(boot) if boot <= now => Some(fmt_uptime((now - boot).num_seconds() as u64)),
        _ => Some(line.to_string()),
    }
}

pub fn fmt_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

// ── Disk ───────────────────────────────────────────────────

pub fn free_disk(platform: Platform, exec: &dyn Executor) -> Option<String> {
    match platform {
        Platform::MacLike => {
            let line = ShellLine::new(Dialect::Posix, "df").raw("-h").raw("/");
            let output = exec.execute(&line);
            df_available(output.non_empty()?)
        }
        Platform::WindowsLike => {
            let line = ShellLine::new(Dialect::Cmd, "wmic").raw("logicaldisk get caption,freespace,size");
            let output = exec.execute(&line);
            wmic_free_disk(output.non_empty()?)
        }
        Platform::Other => None,
    }
}

/// `Avail` column of the first data row of `df -h`.
pub fn df_available(output: &str) -> Option<String> {
    output
        .lines()
        .nth(1)?
        .split_whitespace()
        .nth(3)
        .map(str::to_string)
}

/// `Caption FreeSpace Size` rows, one entry per drive with a size.
pub fn wmic_free_disk(output: &str) -> Option<String> {
    let drives: Vec<String> = output
        .lines()
        .skip(1)
        .filter_map(|l| {
            let parts: Vec<&str> = l.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let free: u64 = parts[1].parse().ok()?;
            Some(format!("{} {} free", parts[0], fmt_bytes(free)))
        })
        .collect();
    (!drives.is_empty()).then(|| drives.join(", "))
}

pub fn fmt_bytes(bytes: u64) -> String {
    if bytes >= 1_099_511_627_776 {
        format!("{:.1} TB", bytes as f64 / 1_099_511_627_776.0)
    } else if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

// ── Memory ─────────────────────────────────────────────────

pub fn free_ram(platform: Platform, exec: &dyn Executor) -> Option<String> {
    match platform {
        Platform::MacLike => {
            let output = exec.execute(&ShellLine::new(Dialect::Posix, "vm_stat"));
            vm_stat_free(output.non_empty()?)
        }
        Platform::WindowsLike => {
            let line = ShellLine::new(Dialect::Cmd, "wmic").raw("OS get FreePhysicalMemory");
            let kb = exec.execute(&line).text().and_then(wmic_number)?;
            Some(format!("{:.1} MB", kb as f64 / 1024.0))
        }
        Platform::Other => None,
    }
}

/// Free pages times the page size reported in the `vm_stat` banner.
pub fn vm_stat_free(output: &str) -> Option<String> {
    let page_size = output
        .lines()
        .next()
        .and_then(|l| l.split("page size of ").nth(1))
        .and_then(|s| s.split_whitespace().next())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(4096);

    let pages: u64 = output
        .lines()
        .find(|l| l.starts_with("Pages free"))?
        .split(':')
        .nth(1)?
        .trim()
        .trim_end_matches('.')
        .parse()
        .ok()?;

    Some(format!("{:.1} MB", (pages * page_size) as f64 / 1_048_576.0))
}

// ── Temperature ────────────────────────────────────────────

pub fn cpu_temperature(platform: Platform, exec: &dyn Executor) -> Option<String> {
    match platform {
        Platform::MacLike => {
            let line = ShellLine::new(Dialect::Posix, "istats").raw("cpu temp");
            let output = exec.execute(&line);
            istats_temperature(output.non_empty()?)
        }
        // Needs third-party sensor tooling.
        Platform::WindowsLike | Platform::Other => None,
    }
}

/// `CPU temp:               52.31°C     ▁▂▃▅▆▇`
pub fn istats_temperature(output: &str) -> Option<String> {
    output
        .lines()
        .find(|l| l.contains("CPU temp"))?
        .split_whitespace()
        .nth(2)
        .map(str::to_string)
}
