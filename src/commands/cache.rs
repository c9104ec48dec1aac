//! Menu 2: clear system and browser caches.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::commands::Context;
use crate::console::Tone;
use crate::error::Error;
use crate::executor::Executor;
use crate::platform::Platform;
use crate::probes::{self, or_unavailable};
use crate::shell::{self, Dialect, ShellLine};

/// A configured location with its environment expanded, present on disk.
struct Target<'a> {
    label: &'a str,
    path: String,
}

fn expand<'a>(ctx: &mut Context, label: &'a str, raw: &str) -> Option<Target<'a>> {
    let Some(path) = shell::expand_env_path(raw) else {
        warn!(path = raw, "cache path references an unset variable");
        ctx.console
            .message(Tone::Warning, &format!("Skipping {}: location is not set", raw));
        return None;
    };
    if !Path::new(&path).exists() {
        info!(path = %path, "cache location does not exist");
        ctx.console
            .message(Tone::Info, &format!("Skipping {}: {} not found", label, path));
        return None;
    }
    Some(Target { label, path })
}

fn delete_line(platform: Platform, dir: &str) -> Result<ShellLine, Error> {
    match platform {
        Platform::MacLike => ShellLine::new(Dialect::Posix, "rm").raw("-rf").dir_contents(dir),
        Platform::WindowsLike => ShellLine::new(Dialect::Cmd, "del").raw("/q /s").dir_contents(dir),
        Platform::Other => Err(Error::UnsupportedPlatform("cache cleanup")),
    }
}

fn clear(ctx: &mut Context, exec: &dyn Executor, target: &Target) -> bool {
    let line = match delete_line(ctx.platform, &target.path) {
        Ok(line) => line,
        Err(e) => {
            ctx.console
                .message(Tone::Error, &format!("Error clearing {}: {}", target.label, e));
            return false;
        }
    };
    info!(command = %line, "clearing cache");
    if exec.execute(&line).text().is_none() {
        ctx.console
            .message(Tone::Error, &format!("Error clearing {}: command did not run", target.label));
        return false;
    }
    true
}

/// Delete the contents of every configured cache location for the current
/// platform, reporting freed space where it can be measured.
pub fn run(ctx: &mut Context) -> Result<()> {
    let (platform, settings, exec) = (ctx.platform, ctx.settings, ctx.executor);

    let mut system = Vec::new();
    for raw in settings.cache.system_paths(platform) {
        if let Some(target) = expand(ctx, raw, raw) {
            system.push(target);
        }
    }
    let mut browsers = Vec::new();
    for (name, raw) in settings.cache.browser_paths(platform) {
        if let Some(target) = expand(ctx, name, raw) {
            browsers.push(target);
        }
    }

    if system.is_empty() && browsers.is_empty() {
        return Ok(());
    }

    if settings.confirm_destructive {
        let question = format!(
            "Delete the contents of {} cache locations?",
            system.len() + browsers.len()
        );
        if !ctx.console.confirm(&question)? {
            ctx.console.message(Tone::Info, "Cache left untouched.");
            return Ok(());
        }
    }

    ctx.console.status_start("Clearing cache...");

    let mut total_freed: i64 = 0;
    for target in &system {
        ctx.ensure_running()?;
        let before = probes::cache_size_mb(platform, exec, &target.path);
        if !clear(ctx, exec, target) {
            continue;
        }
        let after = probes::cache_size_mb(platform, exec, &target.path);
        if let (Some(before), Some(after)) = (before, after) {
            let freed = (before - after).max(0);
            total_freed += freed;
            ctx.console
                .message(Tone::Success, &format!("Freed {} MB from {}", freed, target.label));
        } else {
            ctx.console.message(Tone::Success, &format!("Cleared {}", target.label));
        }
    }

    for target in &browsers {
        ctx.ensure_running()?;
        let before = or_unavailable(probes::cache_size(platform, exec, &target.path));
        ctx.console.message(
            Tone::Info,
            &format!("{} cache size before cleanup: {}", target.label, before),
        );
        if !clear(ctx, exec, target) {
            continue;
        }
        let after = or_unavailable(probes::cache_size(platform, exec, &target.path));
        ctx.console.message(
            Tone::Success,
            &format!("{} cache cleared! Current size: {}", target.label, after),
        );
    }

    ctx.console.status_stop();
    if platform == Platform::MacLike {
        ctx.console
            .message(Tone::Success, &format!("Total freed: {} MB", total_freed));
    }
    Ok(())
}
