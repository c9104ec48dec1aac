//! Menu 3: top CPU / memory consumers, with an option to kill some.

use anyhow::Result;

use crate::actions::{self, Action};
use crate::commands::Context;
use crate::console::{TableView, Tone};
use crate::parsers::{self, ProcessRecord, Ranking};
use crate::platform::Platform;
use crate::probes::fmt_bytes;
use crate::selector::{self, Preview, Selection};
use crate::shell::{Dialect, ShellLine};

const PS_CPU: &str = "ps aux | sort -nrk 3,3 | head -n";
const PS_MEM: &str = "ps aux | sort -nrk 4,4 | head -n";

const WIN_CPU: &str = "-NoProfile -Command \"Get-CimInstance Win32_PerfFormattedData_PerfProc_Process \
    | Where-Object { $_.Name -notin '_Total','Idle' } \
    | ForEach-Object { '{0} {1} {2}' -f $_.Name,$_.IDProcess,$_.PercentProcessorTime }\"";
const WIN_MEM: &str = "-NoProfile -Command \"Get-Process \
    | ForEach-Object { '{0} {1} {2}' -f $_.ProcessName,$_.Id,$_.WorkingSet64 }\"";

pub fn listing_line(platform: Platform, ranking: Ranking, top: usize) -> Option<ShellLine> {
    match (platform, ranking) {
        (Platform::MacLike, Ranking::Cpu) => Some(ShellLine::new(Dialect::Posix, PS_CPU).number(top)),
        (Platform::MacLike, Ranking::Memory) => Some(ShellLine::new(Dialect::Posix, PS_MEM).number(top)),
        (Platform::WindowsLike, Ranking::Cpu) => Some(ShellLine::new(Dialect::Cmd, "powershell").raw(WIN_CPU)),
        (Platform::WindowsLike, Ranking::Memory) => Some(ShellLine::new(Dialect::Cmd, "powershell").raw(WIN_MEM)),
        (Platform::Other, _) => None,
    }
}

fn collect(ctx: &Context, ranking: Ranking) -> Vec<ProcessRecord> {
    let top = ctx.settings.top_processes;
    let Some(line) = listing_line(ctx.platform, ranking, top) else {
        return Vec::new();
    };
    let output = ctx.executor.execute(&line);
    let records = parsers::process_usage(output.text().unwrap_or_default(), ctx.platform, ranking);
    parsers::rank(records, top)
}

fn metric_header(platform: Platform, ranking: Ranking) -> &'static str {
    match (platform, ranking) {
        (_, Ranking::Cpu) => "CPU (%)",
        (Platform::WindowsLike, Ranking::Memory) => "Memory",
        (_, Ranking::Memory) => "Memory (%)",
    }
}

/// Windows reports working sets in bytes; everything else is shown as is.
fn metric_cell(platform: Platform, ranking: Ranking, value: &str) -> String {
    match (platform, ranking, value.parse::<u64>()) {
        (Platform::WindowsLike, Ranking::Memory, Ok(bytes)) => fmt_bytes(bytes),
        _ => value.to_string(),
    }
}

fn ranking_table(title: &str, platform: Platform, ranking: Ranking, records: &[ProcessRecord]) -> TableView {
    let mut table = TableView::new(title, &["#", "PID", "Process", metric_header(platform, ranking)]);
    for (idx, rec) in records.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            rec.pid.clone(),
            rec.label.clone(),
            metric_cell(platform, ranking, &rec.metric_value),
        ]);
    }
    table
}

pub fn run(ctx: &mut Context) -> Result<()> {
    let platform = ctx.platform;

    ctx.console.status_start("Monitoring resource usage...");
    let cpu = collect(ctx, Ranking::Cpu);
    let mem = collect(ctx, Ranking::Memory);
    ctx.console.status_stop();

    if cpu.is_empty() && mem.is_empty() {
        ctx.console.message(
            Tone::Warning,
            &format!("No process data available on {}.", platform),
        );
        return Ok(());
    }

    ctx.console
        .table(&ranking_table("Top CPU Consumers", platform, Ranking::Cpu, &cpu));
    ctx.console
        .table(&ranking_table("Top Memory Consumers", platform, Ranking::Memory, &mem));

    let choice = ctx.console.ask(
        "Kill a process? 1) CPU-intensive  2) Memory-intensive  3) Cancel:",
    )?;
    let (title, ranking, records) = match choice.trim() {
        "1" => ("Top CPU Consumers", Ranking::Cpu, cpu.as_slice()),
        "2" => ("Top Memory Consumers", Ranking::Memory, mem.as_slice()),
        _ => {
            ctx.console.message(Tone::Success, "No process killed.");
            return Ok(());
        }
    };

    let cells = |rec: &ProcessRecord| {
        vec![
            rec.pid.clone(),
            rec.label.clone(),
            metric_cell(platform, ranking, &rec.metric_value),
        ]
    };
    let preview = Preview {
        title,
        headers: &["PID", "Process", metric_header(platform, ranking)],
        records,
        cells: &cells,
        prompt: "Enter numbers to kill (comma separated), 'a' for all, or 'n' to cancel:",
    };
    let selection = selector::select(ctx.console, &preview, ctx.settings.preview_limit)?;

    let chosen = selection.pick(records);
    if chosen.is_empty() {
        ctx.console.message(Tone::Success, "No process killed.");
        return Ok(());
    }
    if selection == Selection::All {
        let question = format!("Really kill all {} listed processes?", chosen.len());
        if !ctx.console.confirm(&question)? {
            ctx.console.message(Tone::Success, "No process killed.");
            return Ok(());
        }
    }

    let mut killed = 0;
    for rec in &chosen {
        ctx.ensure_running()?;
        let action = Action::KillProcess(rec.pid.clone());
        if actions::apply(&action, platform, ctx.executor, ctx.console) {
            killed += 1;
        }
    }
    if killed < chosen.len() {
        ctx.console.message(
            Tone::Warning,
            &format!("{} of {} processes killed.", killed, chosen.len()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_listing_is_truncated_to_configured_top() {
        let line = listing_line(Platform::MacLike, Ranking::Memory, 10).unwrap();
        assert_eq!(line.as_str(), "ps aux | sort -nrk 4,4 | head -n 10");
        assert!(listing_line(Platform::Other, Ranking::Cpu, 10).is_none());
    }

    #[test]
    fn windows_memory_renders_as_bytes() {
        assert_eq!(metric_cell(Platform::WindowsLike, Ranking::Memory, "1048576"), "1.0 MB");
        assert_eq!(metric_cell(Platform::MacLike, Ranking::Memory, "3.1"), "3.1");
        assert_eq!(metric_cell(Platform::WindowsLike, Ranking::Cpu, "25"), "25");
    }
}
