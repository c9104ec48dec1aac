//! Menu 1: system check.

use anyhow::Result;

use crate::commands::Context;
use crate::console::{TableView, Tone};
use crate::probes::{self, or_unavailable};

fn gethostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".into())
}

/// Render the fixed five-row metric table. Missing metrics show as `N/A`.
pub fn run(ctx: &mut Context) -> Result<()> {
    let (platform, exec) = (ctx.platform, ctx.executor);

    ctx.console.status_start("Loading system summary");
    let rows = [
        ("Uptime", probes::uptime(platform, exec)),
        ("Free Disk Space", probes::free_disk(platform, exec)),
        ("Free RAM", probes::free_ram(platform, exec)),
        ("Battery Health", probes::battery_health(platform, exec)),
        ("CPU Temperature", probes::cpu_temperature(platform, exec)),
    ];
    ctx.console.status_stop();

    let mut table = TableView::new(format!("System Summary: {}", gethostname()), &["Metric", "Value"]);
    for (metric, value) in rows {
        table.push(vec![metric.to_string(), or_unavailable(value)]);
    }
    ctx.console.table(&table);

    if !platform.is_supported() {
        ctx.console.message(
            Tone::Info,
            &format!("System metrics are not collected on {}.", platform),
        );
    }
    Ok(())
}
