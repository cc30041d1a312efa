//! Titan Protocol - Entry Point
//!
//! Command line front end for the tracker, plus the terminal dashboard.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use uuid::Uuid;

use titan_protocol::config::{default_config_path, TrackerConfig};
use titan_protocol::ledger::LedgerEntry;
use titan_protocol::quests::{Quest, QuestCreate, QuestFilter, QuestType, QuestUpdate};
use titan_protocol::ui::{progress_ratio, Dashboard};
use titan_protocol::Tracker;

/// How long the dashboard waits for a key before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "titan")]
#[command(about = "Titan Protocol - complete quests, earn XP, level up", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (RON); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the data stores are readable
    Status,

    /// Show level, XP progress and rank
    Progress,

    /// Add an XP ledger entry (negative values deduct)
    Award {
        #[arg(allow_negative_numbers = true)]
        delta: i64,

        /// Why the XP changed
        reason: String,

        /// Kind of entity that caused the change (e.g. "quest")
        #[arg(long)]
        ref_type: Option<String>,

        /// Identifier of that entity
        #[arg(long)]
        ref_id: Option<String>,
    },

    /// Show recent ledger entries, newest first
    Ledger {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage quests
    Quest {
        #[command(subcommand)]
        command: QuestCommands,
    },

    /// Open the interactive dashboard
    Dashboard,

    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum QuestCommands {
    /// Create a quest
    Add {
        /// main, side or daily
        #[arg(long = "type", value_name = "TYPE")]
        quest_type: QuestType,

        title: String,

        #[arg(long)]
        description: Option<String>,

        /// XP paid out on completion
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        xp: i64,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },

    /// List quests, newest first
    List {
        #[arg(long = "type", value_name = "TYPE")]
        quest_type: Option<QuestType>,

        /// Include inactive quests
        #[arg(long)]
        all: bool,

        /// Only completed (true) or open (false) quests
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Change quest fields
    Update {
        id: Uuid,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        xp: Option<i64>,

        /// New due date, YYYY-MM-DD
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Complete a quest and collect its XP
    Complete { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if let Commands::InitConfig { force } = cli.command {
        init_logging(None);
        return init_config(&config_path, force);
    }

    let mut config = TrackerConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }

    if matches!(cli.command, Commands::Dashboard) {
        std::fs::create_dir_all(config.data_dir())?;
        init_logging(Some(&config.data_dir().join("titan.log")));
    } else {
        init_logging(None);
    }
    log::info!("Starting Titan Protocol v{}", env!("CARGO_PKG_VERSION"));

    let tracker = Tracker::open(config).context("Failed to open tracker data")?;
    let json = cli.json;

    match cli.command {
        Commands::Status => {
            let health = tracker.health()?;
            if json {
                print_json(&health)?;
            } else {
                println!("{}", health.status);
                println!("  ledger entries: {}", health.ledger_entries);
                println!("  quests:         {}", health.quests);
            }
        }
        Commands::Progress => {
            let progress = tracker.progress()?;
            if json {
                print_json(&progress)?;
            } else {
                let pct = (progress_ratio(&progress) * 100.0).round();
                println!("{} • Level {}", progress.rank, progress.level);
                println!(
                    "XP {}/{} ({}%), {} total",
                    progress.xp_into_level, progress.xp_for_next_level, pct, progress.total_xp
                );
            }
        }
        Commands::Award { delta, reason, ref_type, ref_id } => {
            let entry = tracker.award_xp(delta, &reason, ref_type, ref_id)?;
            if json {
                print_json(&entry)?;
            } else {
                print_entry(&entry);
            }
        }
        Commands::Ledger { limit } => {
            let entries = tracker.ledger(limit)?;
            if json {
                print_json(&entries)?;
            } else if entries.is_empty() {
                println!("Ledger is empty");
            } else {
                entries.iter().for_each(print_entry);
            }
        }
        Commands::Quest { command } => run_quest_command(&tracker, command, json)?,
        Commands::Dashboard => run_dashboard(&tracker)?,
        Commands::InitConfig { .. } => unreachable!("handled before the tracker is opened"),
    }

    Ok(())
}

fn run_quest_command(tracker: &Tracker, command: QuestCommands, json: bool) -> Result<()> {
    match command {
        QuestCommands::Add { quest_type, title, description, xp, due } => {
            let request = QuestCreate {
                quest_type,
                title,
                description,
                xp_reward: xp,
                due_date: due,
            };
            let quest = tracker.create_quest(request)?;
            if json {
                print_json(&quest)?;
            } else {
                println!("Created quest {}", quest.id);
                print_quest(&quest);
            }
        }
        QuestCommands::List { quest_type, all, completed } => {
            let filter = QuestFilter {
                quest_type,
                active_only: !all,
                completed,
            };
            let quests = tracker.list_quests(&filter);
            if json {
                print_json(&quests)?;
            } else if quests.is_empty() {
                println!("No quests");
            } else {
                quests.iter().for_each(print_quest);
            }
        }
        QuestCommands::Update { id, title, description, xp, due, clear_due, active } => {
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let update = QuestUpdate {
                title,
                description,
                xp_reward: xp,
                due_date,
                is_active: active,
            };
            let quest = tracker.update_quest(id, &update)?;
            if json {
                print_json(&quest)?;
            } else {
                print_quest(&quest);
            }
        }
        QuestCommands::Complete { id } => {
            let receipt = tracker.complete_quest(id)?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("Quest {} completed, {:+} XP", receipt.quest_id, receipt.xp_awarded);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry(entry: &LedgerEntry) {
    let reference = match (&entry.ref_type, &entry.ref_id) {
        (Some(kind), Some(id)) => format!(" [{}:{}]", kind, id),
        (Some(kind), None) => format!(" [{}]", kind),
        _ => String::new(),
    };
    println!(
        "{}  {:>+6} XP  {}{}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.delta_xp,
        entry.reason,
        reference
    );
}

fn print_quest(quest: &Quest) {
    let state = if quest.is_completed {
        "done"
    } else if quest.is_active {
        "open"
    } else {
        "paused"
    };
    let due = quest.due_date.map(|d| format!("  due {}", d)).unwrap_or_default();
    println!(
        "{}  [{:<5}] {:<6} {}  {:+} XP{}",
        quest.id, quest.quest_type, state, quest.title, quest.xp_reward, due
    );
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", path);
    }
    TrackerConfig::default()
        .export(path)
        .with_context(|| format!("Failed to write config to {:?}", path))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Initialize logging; the dashboard logs to a file so output does not
/// interfere with the TUI
fn init_logging(log_path: Option<&Path>) {
    let mut builder = match log_path {
        Some(_) => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")),
    };

    if let Some(path) = log_path {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Warning: cannot open log file {:?}: {}", path, e);
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn run_dashboard(tracker: &Tracker) -> Result<()> {
    let mut dashboard = Dashboard::new();
    dashboard.refresh(tracker)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = dashboard_loop(&mut terminal, &mut dashboard, tracker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Dashboard exited with error: {}", e);
    }
    log::info!("Dashboard closed");
    result
}

fn dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dashboard: &mut Dashboard,
    tracker: &Tracker,
) -> Result<()> {
    loop {
        terminal.draw(|frame| dashboard.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match dashboard.handle_input(key, tracker) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }
    }
    Ok(())
}
