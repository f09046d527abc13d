use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use patrol_core::core_api::{CoreError, Engine, EngineOptions, Session};
use patrol_core::edits::GlobalFallback;
use patrol_core::paths::{SAVE_PATH_ENV, default_save_path};
use patrol_core::store::WriteStrategy;
use patrol_render::{
    FieldSelection, render_backup_info, render_global_edit, render_json_full,
    render_json_selected, render_load_warnings, render_selected_pairs, render_status_text,
    render_unlock_summary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GlobalFallbackArg {
    Insert,
    Detached,
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum WriteModeArg {
    Atomic,
    Truncate,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE", env = SAVE_PATH_ENV)]
    path: Option<PathBuf>,
    #[arg(long)]
    levels: bool,
    #[arg(long)]
    weapons: bool,
    #[arg(long)]
    money: bool,
    #[arg(long)]
    records: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-levels", allow_hyphen_values = true)]
    set_levels: Option<i64>,
    #[arg(long = "set-money", allow_hyphen_values = true)]
    set_money: Option<String>,
    #[arg(long = "unlock-all-weapons")]
    unlock_all_weapons: bool,
    #[arg(long, conflicts_with = "restore")]
    backup: bool,
    #[arg(long)]
    restore: bool,
    #[arg(long = "backup-info")]
    backup_info: bool,
    #[arg(long = "global-fallback", value_enum, default_value_t = GlobalFallbackArg::Insert)]
    global_fallback: GlobalFallbackArg,
    #[arg(long = "write-mode", value_enum, default_value_t = WriteModeArg::Atomic)]
    write_mode: WriteModeArg,
    #[arg(long = "no-prompt")]
    no_prompt: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn fields(&self) -> FieldSelection {
        FieldSelection {
            levels: self.levels,
            weapons: self.weapons,
            money: self.money,
            records: self.records,
        }
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            global_fallback: match self.global_fallback {
                GlobalFallbackArg::Insert => GlobalFallback::Insert,
                GlobalFallbackArg::Detached => GlobalFallback::Detached,
                GlobalFallbackArg::Reject => GlobalFallback::Reject,
            },
            write_strategy: match self.write_mode {
                WriteModeArg::Atomic => WriteStrategy::Atomic,
                WriteModeArg::Truncate => WriteStrategy::Truncate,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fields = cli.fields();
    let primary = cli.path.clone().or_else(default_save_path).unwrap_or_else(|| {
        eprintln!("No save path given and no default save location could be determined.");
        eprintln!("Pass SAVE or set {SAVE_PATH_ENV}.");
        process::exit(2);
    });
    info!(path = %primary.display(), "resolved save path");

    let engine = Engine::with_options(cli.engine_options());
    let opened = if cli.no_prompt {
        engine.open_path(&primary)
    } else {
        engine.open_path_or_prompt(&primary, prompt_for_path)
    };
    let mut session = opened.unwrap_or_else(|e| {
        eprintln!("Error opening save file: {}", primary.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    for line in render_load_warnings(session.load_report()) {
        eprintln!("{line}");
    }

    // Keep stdout clean for JSON consumers.
    let report = |msg: String| {
        if cli.json {
            eprintln!("{msg}");
        } else {
            println!("{msg}");
        }
    };

    if cli.backup_info {
        let info = session.backup_info().unwrap_or_else(|e| fail(&e, "reading backup info"));
        report(render_backup_info(info.as_ref()));
    }
    if cli.backup {
        let backup = session.create_backup().unwrap_or_else(|e| fail(&e, "creating backup"));
        report(format!("Backup created at {}", backup.display()));
    }
    if cli.restore {
        let backup = session
            .restore_backup()
            .unwrap_or_else(|e| fail(&e, "restoring backup"));
        report(format!("Backup loaded from {}", backup.display()));
    }

    if let Some(levels) = cli.set_levels {
        let edit = session
            .set_levels_unlocked(levels)
            .unwrap_or_else(|e| fail(&e, "applying levels edit"));
        persist(&session);
        report(render_global_edit(&edit));
    }
    if cli.unlock_all_weapons {
        let summary = session.unlock_all_weapons();
        if summary.needs_save() {
            persist(&session);
        }
        report(render_unlock_summary(&summary));
    }
    if let Some(money) = cli.set_money.as_deref() {
        let edit = session
            .set_money(money)
            .unwrap_or_else(|e| fail(&e, "applying money edit"));
        persist(&session);
        report(render_global_edit(&edit));
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session.snapshot(), &fields)
        } else {
            render_json_full(&session)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_selected_pairs(&session.snapshot(), &fields) {
            println!("{key}={value}");
        }
        return;
    }

    print!("{}", render_status_text(&session.snapshot()));
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn prompt_for_path(missing: &Path) -> Option<PathBuf> {
    eprintln!("File {} was not found.", missing.display());
    eprint!("Please enter the path to the save file: ");
    io::stderr().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let entered = line.trim();
    if entered.is_empty() {
        return None;
    }
    Some(PathBuf::from(entered))
}

/// Saves after an accepted edit. The edit is still in memory if this fails,
/// but the process exits, so it is lost.
fn persist(session: &Session) {
    if let Err(e) = session.save() {
        eprintln!("Error writing {}: {e}", session.path().display());
        eprintln!("The last change was not saved.");
        process::exit(1);
    }
}

fn fail(err: &CoreError, context: &str) -> ! {
    eprintln!("Error {context}: {err}");
    process::exit(if err.is_validation() { 2 } else { 1 });
}
