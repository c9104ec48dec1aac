//! Menu 4: check for OS and package-manager updates, upgrade on request.

use anyhow::Result;

use crate::actions::{self, Action};
use crate::commands::Context;
use crate::console::Tone;
use crate::executor::Executor;
use crate::package_manager::PackageManager;
use crate::parsers::{self, OutdatedPackage};
use crate::platform::Platform;
use crate::selector::{self, Preview, Selection};
use crate::shell::{Dialect, ShellLine};

/// Labels of pending macOS updates, `None` when `softwareupdate` did not run.
fn software_updates(exec: &dyn Executor) -> Option<Vec<String>> {
    let line = ShellLine::new(Dialect::Posix, "softwareupdate").raw("-l");
    let output = exec.execute(&line);
    Some(software_update_labels(output.text()?))
}

/// `* Label: macOS Sonoma 14.6.1-23G93` (older releases: `   * iTunes-12.0`).
pub fn software_update_labels(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| l.trim().strip_prefix('*'))
        .map(|l| l.trim())
        .map(|l| l.strip_prefix("Label:").unwrap_or(l).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn outdated(manager: PackageManager, exec: &dyn Executor) -> Vec<OutdatedPackage> {
    let output = exec.execute(&manager.outdated_line());
    parsers::outdated_packages(output.text().unwrap_or_default(), manager)
}

pub fn run(ctx: &mut Context) -> Result<()> {
    let (platform, exec) = (ctx.platform, ctx.executor);
    if !platform.is_supported() {
        ctx.console.message(
            Tone::Info,
            &format!("Update checks are not supported on {}.", platform),
        );
        return Ok(());
    }

    ctx.console.status_start("Checking for updates...");
    let system = match platform {
        Platform::MacLike => software_updates(exec),
        _ => None,
    };
    let manager = PackageManager::detect(platform, exec);
    let packages = manager.map(|m| outdated(m, exec)).unwrap_or_default();
    ctx.console.status_stop();

    if platform == Platform::MacLike {
        match system {
            Some(labels) if labels.is_empty() => {
                ctx.console.message(Tone::Success, "Your macOS is up to date.")
            }
            Some(labels) => {
                ctx.console.message(Tone::Warning, "System updates available:");
                for label in labels {
                    ctx.console.message(Tone::Warning, &format!("  {}", label));
                }
            }
            None => ctx
                .console
                .message(Tone::Warning, "Could not query macOS software updates."),
        }
    }

    match manager {
        None => {
            let missing = match platform {
                Platform::MacLike => "Homebrew is not installed. Skipping Homebrew updates.",
                _ => "Neither Chocolatey nor Winget is installed. Skipping package updates.",
            };
            ctx.console.message(Tone::Error, missing);
        }
        Some(manager) if packages.is_empty() => {
            ctx.console
                .message(Tone::Success, &format!("{} is up to date.", manager));
        }
        Some(manager) => offer_upgrades(ctx, manager, &packages)?,
    }

    if platform == Platform::WindowsLike {
        ctx.console
            .message(Tone::Warning, "Please check Windows Update in Settings manually.");
    }
    Ok(())
}

fn offer_upgrades(ctx: &mut Context, manager: PackageManager, packages: &[OutdatedPackage]) -> Result<()> {
    let title = format!("Outdated {} Packages", manager);
    let cells = |p: &OutdatedPackage| vec![p.name.clone()];
    let preview = Preview {
        title: &title,
        headers: &["Package"],
        records: packages,
        cells: &cells,
        prompt: "Enter numbers to upgrade (comma separated), 'a' for all, or 'n' to skip:",
    };
    let selection = selector::select(ctx.console, &preview, ctx.settings.preview_limit)?;

    match &selection {
        Selection::All => {
            ctx.ensure_running()?;
            actions::apply(&Action::UpgradeAll(manager), ctx.platform, ctx.executor, ctx.console);
        }
        Selection::None => ctx.console.message(Tone::Success, "No packages upgraded."),
        Selection::Indices(_) => {
            let picked = selection.pick(packages);
            let mut upgraded = 0;
            for pkg in &picked {
                ctx.ensure_running()?;
                let action = Action::UpgradeOne(manager, pkg.name.clone());
                if actions::apply(&action, ctx.platform, ctx.executor, ctx.console) {
                    upgraded += 1;
                }
            }
            if upgraded == picked.len() {
                ctx.console
                    .message(Tone::Success, "Selected packages upgraded!");
            } else {
                ctx.console.message(
                    Tone::Warning,
                    &format!("{} of {} selected packages upgraded.", upgraded, picked.len()),
                );
            }
        }
    }
    Ok(())
}
