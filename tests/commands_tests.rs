use std::path::Path;

use tuneup::commands::{self, Context};
use tuneup::config::{BrowserCache, CacheSettings, Settings};
use tuneup::console::{ScriptedConsole, Tone};
use tuneup::executor::{CommandResult, ScriptedExecutor};
use tuneup::menu;
use tuneup::platform::Platform;
use tuneup::Error;

type Operation = fn(&mut Context<'_>) -> anyhow::Result<()>;

fn run_op(
    op: Operation,
    platform: Platform,
    settings: &Settings,
    exec: &ScriptedExecutor,
    console: &mut ScriptedConsole,
) -> anyhow::Result<()> {
    let mut ctx = Context {
        platform,
        settings,
        executor: exec,
        console,
    };
    op(&mut ctx)
}

fn cache_settings(mac_paths: &[&str], windows_paths: &[&str], browsers: Vec<BrowserCache>) -> Settings {
    Settings {
        cache: CacheSettings {
            mac_paths: mac_paths.iter().map(|p| p.to_string()).collect(),
            windows_paths: windows_paths.iter().map(|p| p.to_string()).collect(),
            browsers,
        },
        ..Settings::default()
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

const PS_CPU: &str = "USER  PID  %CPU %MEM VSZ RSS TT STAT STARTED TIME COMMAND\n\
alice  812  45.0  2.1 1234 5678 ?? R 10:00AM 1:00.00 /Applications/Chrome\n\
alice   90  12.5  8.0 1111 2222 ?? S  9:00AM 0:10.00 /usr/bin/node";

// ── System summary ─────────────────────────────────────────

#[test]
fn summary_on_unknown_platform_is_all_unavailable() {
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::default();
    run_op(commands::summary::run, Platform::Other, &Settings::default(), &exec, &mut console).unwrap();

    assert!(exec.executed().is_empty());
    let table = &console.tables[0];
    assert!(table.title.starts_with("System Summary: "));
    let metrics: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        metrics,
        vec!["Uptime", "Free Disk Space", "Free RAM", "Battery Health", "CPU Temperature"]
    );
    assert!(table.rows.iter().all(|r| r[1] == "N/A"));
}

#[test]
fn summary_on_mac_fills_available_rows() {
    let exec = ScriptedExecutor::new()
        .respond(
            "df -h /",
            "Filesystem     Size   Used  Avail Capacity Mounted on\n/dev/disk3s1s1 460Gi  15Gi  120Gi    12%    /",
        )
        .respond(
            "vm_stat",
            "Mach Virtual Memory Statistics: (page size of 16384 bytes)\nPages free:                               2048.\nPages active:                            1000.",
        )
        .respond("ioreg", "\"MaxCapacity\" = 4500\n\"DesignCapacity\" = 5000")
        .respond_with("istats", CommandResult::Failed);
    let mut console = ScriptedConsole::default();
    run_op(commands::summary::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    let rows = &console.tables[0].rows;
    assert_eq!(rows[0][1], "N/A");
    assert_eq!(rows[1][1], "120Gi");
    assert_eq!(rows[2][1], "32.0 MB");
    assert_eq!(rows[3][1], "90.00%");
    assert_eq!(rows[4][1], "N/A");
}

// ── Cache ──────────────────────────────────────────────────

#[test]
fn cache_on_unknown_platform_does_nothing() {
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::default();
    run_op(commands::cache::run, Platform::Other, &Settings::default(), &exec, &mut console).unwrap();

    assert!(exec.executed().is_empty());
    assert!(console.questions.is_empty());
    assert!(console.messages_with(Tone::Error).is_empty());
}

#[test]
fn cache_declined_leaves_everything_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::new(["n"]);
    let settings = cache_settings(&[path_str(dir.path())], &[], Vec::new());
    run_op(commands::cache::run, Platform::MacLike, &settings, &exec, &mut console).unwrap();

    assert!(exec.executed().iter().all(|l| !l.starts_with("rm")));
    assert_eq!(console.messages_with(Tone::Info), vec!["Cache left untouched."]);
}

#[test]
fn cache_clears_contents_and_reports_totals() {
    let dir = tempfile::tempdir().unwrap();
    let path = path_str(dir.path());
    let exec = ScriptedExecutor::new().respond("du -sm", "120\t/tmp/cache");
    let mut console = ScriptedConsole::new(["y"]);
    let settings = cache_settings(&[path], &[], Vec::new());
    run_op(commands::cache::run, Platform::MacLike, &settings, &exec, &mut console).unwrap();

    assert!(exec.executed().contains(&format!("rm -rf '{}'/*", path)));
    let success = console.messages_with(Tone::Success);
    let freed = format!("Freed 0 MB from {}", path);
    assert!(success.contains(&freed.as_str()));
    assert_eq!(success.last(), Some(&"Total freed: 0 MB"));
}

#[test]
fn cache_clears_browser_caches_with_sizes() {
    let system = tempfile::tempdir().unwrap();
    let firefox = tempfile::tempdir().unwrap();
    let firefox_path = path_str(firefox.path());
    let exec = ScriptedExecutor::new()
        .respond("du -sm", "0\t/tmp/cache")
        .respond("du -sh", "42M\t/tmp/firefox");
    let mut console = ScriptedConsole::new(["y"]);
    let settings = cache_settings(
        &[path_str(system.path())],
        &[],
        vec![BrowserCache::new("Firefox", Some(firefox_path), None)],
    );
    run_op(commands::cache::run, Platform::MacLike, &settings, &exec, &mut console).unwrap();

    assert_eq!(console.questions, vec!["Delete the contents of 2 cache locations? [y/N]"]);
    assert!(exec.executed().contains(&format!("rm -rf '{}'/*", firefox_path)));
    assert_eq!(
        console.messages_with(Tone::Info),
        vec!["Firefox cache size before cleanup: 42M"]
    );
    assert!(console
        .messages_with(Tone::Success)
        .contains(&"Firefox cache cleared! Current size: 42M"));
}

#[test]
fn cache_on_windows_expands_variables_and_uses_del() {
    let temp = tempfile::tempdir().unwrap();
    let chrome = tempfile::tempdir().unwrap();
    let temp_path = path_str(temp.path());
    let chrome_path = path_str(chrome.path());
    std::env::set_var("TEMP", temp_path);

    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::new(["y"]);
    let settings = cache_settings(
        &[],
        &["%TEMP%"],
        vec![BrowserCache::new("Chrome", None, Some(chrome_path))],
    );
    run_op(commands::cache::run, Platform::WindowsLike, &settings, &exec, &mut console).unwrap();

    // Sizes are not measured on Windows, so only the deletions run.
    assert_eq!(
        exec.executed(),
        vec![
            format!(r#"del /q /s "{}\*""#, temp_path),
            format!(r#"del /q /s "{}\*""#, chrome_path),
        ]
    );
    assert_eq!(
        console.messages_with(Tone::Info),
        vec!["Chrome cache size before cleanup: N/A"]
    );
    let success = console.messages_with(Tone::Success);
    assert_eq!(success, vec!["Cleared %TEMP%", "Chrome cache cleared! Current size: N/A"]);
    assert!(success.iter().all(|m| !m.starts_with("Total freed")));
}

#[test]
fn cache_skips_unset_variables_and_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::default();
    let settings = cache_settings(&[], &["%TUNEUP_CACHE_FIXTURE_NEVER_SET%", path_str(&missing)], Vec::new());
    run_op(commands::cache::run, Platform::WindowsLike, &settings, &exec, &mut console).unwrap();

    assert!(exec.executed().is_empty());
    assert!(console.questions.is_empty());
    assert_eq!(
        console.messages_with(Tone::Warning),
        vec!["Skipping %TUNEUP_CACHE_FIXTURE_NEVER_SET%: location is not set"]
    );
    let not_found = format!("Skipping {0}: {0} not found", missing.display());
    assert_eq!(console.messages_with(Tone::Info), vec![not_found.as_str()]);
}

// ── Monitor ────────────────────────────────────────────────

#[test]
fn monitor_kills_selected_process_only() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let mut console = ScriptedConsole::new(["1", "2"]);
    run_op(commands::monitor::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    let executed = exec.executed();
    assert!(executed.contains(&"kill -9 90".to_string()));
    assert!(!executed.contains(&"kill -9 812".to_string()));
    assert_eq!(console.tables[0].rows[0][1], "812");
    assert!(console.messages_with(Tone::Success).contains(&"Process 90 killed."));
}

#[test]
fn monitor_kill_all_needs_extra_confirmation() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let mut console = ScriptedConsole::new(["1", "a", "n"]);
    run_op(commands::monitor::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    assert!(exec.executed().iter().all(|l| !l.starts_with("kill")));
    assert_eq!(console.messages_with(Tone::Success), vec!["No process killed."]);
}

#[test]
fn monitor_cancel_kills_nothing() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let mut console = ScriptedConsole::new(["3"]);
    run_op(commands::monitor::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    assert!(exec.executed().iter().all(|l| !l.starts_with("kill")));
    assert_eq!(console.remaining_answers(), 0);
}

// ── Updates ────────────────────────────────────────────────

#[test]
fn brew_upgrades_selected_packages_in_input_order() {
    let exec = ScriptedExecutor::new()
        .respond("which brew", "/opt/homebrew/bin/brew")
        .respond("brew outdated", "git\nwget\nnode");
    let mut console = ScriptedConsole::new(["2,1"]);
    run_op(commands::updates::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    let upgrades: Vec<String> = exec
        .executed()
        .into_iter()
        .filter(|l| l.starts_with("brew upgrade"))
        .collect();
    assert_eq!(upgrades, vec!["brew upgrade wget", "brew upgrade git"]);
    let success = console.messages_with(Tone::Success);
    assert!(success.contains(&"Your macOS is up to date."));
    assert_eq!(success.last(), Some(&"Selected packages upgraded!"));
}

#[test]
fn brew_missing_is_reported() {
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::default();
    run_op(commands::updates::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    assert_eq!(
        console.messages_with(Tone::Error),
        vec!["Homebrew is not installed. Skipping Homebrew updates."]
    );
    assert!(console.questions.is_empty());
}

#[test]
fn winget_upgrade_all_and_windows_update_reminder() {
    let listing = "Name      Id             Version   Available Source\n\
                   ------------------------------------------------\n\
                   Git       Git.Git        2.40.0    2.41.0    winget\n\
                   2 upgrades available.";
    let exec = ScriptedExecutor::new()
        .respond("where winget", r"C:\Users\me\AppData\Local\Microsoft\WindowsApps\winget.exe")
        .respond("winget upgrade --accept-source-agreements", listing);
    let mut console = ScriptedConsole::new(["a"]);
    run_op(commands::updates::run, Platform::WindowsLike, &Settings::default(), &exec, &mut console).unwrap();

    assert!(exec
        .executed()
        .contains(&"winget upgrade --all --silent".to_string()));
    assert_eq!(console.tables[0].rows, vec![vec!["1".to_string(), "Git.Git".to_string()]]);
    assert_eq!(
        console.messages_with(Tone::Warning).last(),
        Some(&"Please check Windows Update in Settings manually.")
    );
}

#[test]
fn failed_upgrade_is_counted() {
    let exec = ScriptedExecutor::new()
        .respond("which brew", "/opt/homebrew/bin/brew")
        .respond("brew outdated", "git\nwget")
        .respond_with(
            "brew upgrade git",
            CommandResult::Output { stdout: "Error: boom".into(), success: false },
        );
    let mut console = ScriptedConsole::new(["1,2"]);
    run_op(commands::updates::run, Platform::MacLike, &Settings::default(), &exec, &mut console).unwrap();

    assert!(console.messages_with(Tone::Error).contains(&"Failed: git"));
    assert_eq!(
        console.messages_with(Tone::Warning).last(),
        Some(&"1 of 2 selected packages upgraded.")
    );
}

// ── Interrupts ─────────────────────────────────────────────

#[test]
fn interrupt_at_selection_prompt_kills_nothing() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let mut console = ScriptedConsole::new(["1", "a", "y"]).interrupt_after(1);
    let err = run_op(commands::monitor::run, Platform::MacLike, &Settings::default(), &exec, &mut console)
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Interrupted)));
    assert!(exec.executed().iter().all(|l| !l.starts_with("kill")));
    assert_eq!(console.remaining_answers(), 2);
}

#[test]
fn interrupt_after_selection_upgrades_nothing() {
    let exec = ScriptedExecutor::new()
        .respond("which brew", "/opt/homebrew/bin/brew")
        .respond("brew outdated", "git\nwget");
    let mut console = ScriptedConsole::new(["1,2"]).interrupt_after(1);
    let err = run_op(commands::updates::run, Platform::MacLike, &Settings::default(), &exec, &mut console)
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Interrupted)));
    assert!(exec.executed().iter().all(|l| !l.starts_with("brew upgrade")));
}

#[test]
fn interrupt_during_operation_ends_the_menu() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let settings = Settings::default();
    let mut console = ScriptedConsole::new(["3", "1", "2", "1"]).interrupt_after(2);
    run_menu(Platform::MacLike, &settings, &exec, &mut console);

    assert!(exec.executed().iter().all(|l| !l.starts_with("kill")));
    assert_eq!(
        console.messages_with(Tone::Info).last(),
        Some(&"Interrupted by user. Exiting...")
    );
    assert!(console.messages_with(Tone::Error).is_empty());
    assert_eq!(console.remaining_answers(), 2);
}

// ── Menu loop ──────────────────────────────────────────────

fn run_menu(platform: Platform, settings: &Settings, exec: &ScriptedExecutor, console: &mut ScriptedConsole) {
    let mut ctx = Context {
        platform,
        settings,
        executor: exec,
        console,
    };
    menu::run(&mut ctx).unwrap();
}

#[test]
fn menu_exits_on_five() {
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::new(["9", "5", "1"]);
    run_menu(Platform::MacLike, &Settings::default(), &exec, &mut console);

    assert_eq!(console.messages_with(Tone::Error), vec!["Invalid choice, please try again."]);
    assert_eq!(console.remaining_answers(), 1);
    assert!(exec.executed().is_empty());
}

#[test]
fn menu_exits_when_input_closes_mid_operation() {
    let exec = ScriptedExecutor::new().respond("ps aux | sort -nrk 3,3", PS_CPU);
    let mut console = ScriptedConsole::new(["3"]);
    run_menu(Platform::MacLike, &Settings::default(), &exec, &mut console);

    assert_eq!(
        console.questions.last().map(String::as_str),
        Some("Kill a process? 1) CPU-intensive  2) Memory-intensive  3) Cancel:")
    );
    assert!(console.messages_with(Tone::Error).is_empty());
}

#[test]
fn menu_stops_when_interrupted() {
    let exec = ScriptedExecutor::new();
    let mut console = ScriptedConsole::new(["1"]).interrupt_after(0);
    run_menu(Platform::MacLike, &Settings::default(), &exec, &mut console);

    assert_eq!(console.messages_with(Tone::Info), vec!["Interrupted by user. Exiting..."]);
    assert_eq!(console.remaining_answers(), 1);
    assert!(console.questions.is_empty());
}
