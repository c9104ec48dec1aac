//! The interactive main menu and its dispatch loop.

use std::fmt;

use anyhow::Result;
use tracing::{error, info};

use crate::commands::{self, Context};
use crate::console::{TableView, Tone};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SystemCheck,
    ClearCache,
    MonitorUsage,
    CheckUpdates,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 5] = [
        MenuChoice::SystemCheck,
        MenuChoice::ClearCache,
        MenuChoice::MonitorUsage,
        MenuChoice::CheckUpdates,
        MenuChoice::Exit,
    ];

    pub fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(MenuChoice::SystemCheck),
            "2" => Some(MenuChoice::ClearCache),
            "3" => Some(MenuChoice::MonitorUsage),
            "4" => Some(MenuChoice::CheckUpdates),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    fn key(self) -> usize {
        match self {
            MenuChoice::SystemCheck => 1,
            MenuChoice::ClearCache => 2,
            MenuChoice::MonitorUsage => 3,
            MenuChoice::CheckUpdates => 4,
            MenuChoice::Exit => 5,
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuChoice::SystemCheck => "System Check",
            MenuChoice::ClearCache => "Clear Cache",
            MenuChoice::MonitorUsage => "Monitor Resource Usage",
            MenuChoice::CheckUpdates => "Check for Updates",
            MenuChoice::Exit => "Exit",
        };
        f.write_str(label)
    }
}

pub fn menu_table() -> TableView {
    let mut table = TableView::new("Main Menu", &["Option", "Action"]);
    for choice in MenuChoice::ALL {
        table.push(vec![choice.key().to_string(), choice.to_string()]);
    }
    table
}

fn dispatch(ctx: &mut Context, choice: MenuChoice) -> Result<()> {
    match choice {
        MenuChoice::SystemCheck => commands::summary::run(ctx),
        MenuChoice::ClearCache => commands::cache::run(ctx),
        MenuChoice::MonitorUsage => commands::monitor::run(ctx),
        MenuChoice::CheckUpdates => commands::updates::run(ctx),
        MenuChoice::Exit => Ok(()),
    }
}

/// Errors that end the menu instead of being reported.
fn leaves_menu(err: &anyhow::Error) -> Option<&Error> {
    err.downcast_ref::<Error>()
        .filter(|e| matches!(e, Error::InputClosed | Error::Interrupted))
}

fn leave(ctx: &mut Context, reason: &Error) -> Result<()> {
    match reason {
        Error::Interrupted => {
            ctx.console
                .message(Tone::Info, "Interrupted by user. Exiting...");
            info!("interrupted");
        }
        _ => info!("input closed, leaving menu"),
    }
    Ok(())
}

/// Show the menu until the user exits, stdin closes or Ctrl-C is pressed.
///
/// A failing operation is reported and the loop continues.
pub fn run(ctx: &mut Context) -> Result<()> {
    if !ctx.platform.is_supported() {
        ctx.console.message(
            Tone::Warning,
            &format!(
                "Unsupported platform: {}. Most operations will report N/A or do nothing.",
                ctx.platform
            ),
        );
    }

    loop {
        if let Err(e) = ctx.ensure_running() {
            return leave(ctx, &e);
        }

        ctx.console.table(&menu_table());
        let answer = match ctx.console.ask("Choose an option:") {
            Ok(answer) => answer,
            Err(e @ (Error::InputClosed | Error::Interrupted)) => return leave(ctx, &e),
            Err(e) => return Err(e.into()),
        };

        let Some(choice) = MenuChoice::parse(&answer) else {
            ctx.console
                .message(Tone::Error, "Invalid choice, please try again.");
            continue;
        };
        if choice == MenuChoice::Exit {
            ctx.console.message(Tone::Info, "Exiting...");
            return Ok(());
        }

        info!(choice = %choice, "running menu option");
        if let Err(e) = dispatch(ctx, choice) {
            if let Some(reason) = leaves_menu(&e) {
                info!("{} stopped: {}", choice, reason);
                return leave(ctx, reason);
            }
            error!(choice = %choice, error = %format!("{:#}", e), "menu option failed");
            ctx.console
                .message(Tone::Error, &format!("{} failed: {:#}", choice, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_the_five_keys() {
        assert_eq!(MenuChoice::parse(" 1 "), Some(MenuChoice::SystemCheck));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::CheckUpdates));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("0"), None);
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse("exit"), None);
    }

    #[test]
    fn menu_lists_every_choice_in_order() {
        let table = menu_table();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0], vec!["1".to_string(), "System Check".to_string()]);
        assert_eq!(table.rows[4], vec!["5".to_string(), "Exit".to_string()]);
    }

    #[test]
    fn closed_input_and_interrupt_are_recognised_through_anyhow() {
        let closed = anyhow::Error::from(Error::InputClosed);
        let interrupted = anyhow::Error::from(Error::Interrupted).context("killing processes");
        assert!(matches!(leaves_menu(&closed), Some(Error::InputClosed)));
        assert!(matches!(leaves_menu(&interrupted), Some(Error::Interrupted)));
        assert!(leaves_menu(&anyhow::anyhow!("boom")).is_none());
        assert!(leaves_menu(&anyhow::Error::from(Error::InvalidPid("x".into()))).is_none());
    }
}
