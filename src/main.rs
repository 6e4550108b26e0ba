use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use tabshell_lib::modules::document::DeferredDocuments;
use tabshell_lib::modules::navigation::{resolve_input, Location};
use tabshell_lib::modules::views::{HistoryView, OutlineView};
use tabshell_lib::settings::{JsonFileStore, MemoryStore, SettingsStore};
use tabshell_lib::state::{event_bus, TabEvent, TabEventKind};
use tabshell_lib::Session;

/// tabshell - tabbed Gemini browsing session driven from stdin
#[derive(Parser)]
#[command(name = "tabshell")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (favourites, style, search engine)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Keep settings in memory only
    #[arg(long, conflicts_with = "settings")]
    ephemeral: bool,

    /// Simulated page load latency
    #[arg(long, value_name = "MS", default_value_t = 150)]
    latency_ms: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Locations to open at startup, one tab each
    locations: Vec<String>,
}

const HELP: &str = "\
commands:
  open <input>     navigate the active tab
  tab <input>      open in a new tab
  back <row>       return to history row
  fav <row>        open favourite in a new tab
  fav-add          bookmark the active tab
  switch <index>   activate tab
  close [index]    close tab (active by default)
  static <title>   add a non-browser page
  hover [url]      preview a link in the status bar
  show             print tabs and panels
  quit
  Ctrl+T / Ctrl+W / F5 and other bound key sequences";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level: log::LevelFilter = cli
        .log_level
        .parse()
        .map_err(|_| anyhow!("invalid log level {:?}", cli.log_level))?;
    tabshell_lib::setup_logging(level).context("failed to install logger")?;

    let store: Box<dyn SettingsStore> = if cli.ephemeral {
        Box::new(MemoryStore::default())
    } else {
        let path = cli.settings.clone().unwrap_or_else(JsonFileStore::default_path);
        Box::new(JsonFileStore::new(path))
    };

    let (sender, mut events) = event_bus();
    let mut session = Session::open(
        store,
        Box::new(DeferredDocuments::new(Duration::from_millis(cli.latency_ms))),
        sender,
        HistoryView::new(),
        OutlineView::new(),
    );

    for input in &cli.locations {
        let location = resolve_input(input, session.settings());
        session.add_new_tab(true, location);
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        if !run_command(&mut session, line.trim()) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(event) = events.recv() => {
                session.handle_event(event);
            }
        }
    }

    session.close().context("failed to save settings")?;
    Ok(())
}

/// Executes one command line. Returns false when the session should end.
fn run_command(session: &mut Session, line: &str) -> bool {
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };
    let row = || arg.parse::<usize>().ok();

    match command {
        "" => {}
        "quit" | "exit" => return false,
        "help" => println!("{}", HELP),
        "show" => print_state(session),
        "open" => {
            session.open_input(arg);
        }
        "tab" => {
            let location = resolve_input(arg, session.settings());
            session.add_new_tab(true, location);
        }
        "back" => report(row().is_some_and(|r| session.activate_history_row(r)), "no such history row"),
        "fav" => report(row().and_then(|r| session.activate_favourite(r)).is_some(), "no valid favourite at that row"),
        "fav-add" => {
            let current = session.active_tab().and_then(|t| t.current_location());
            match current {
                Some(location) => {
                    session.settings_mut().favourites.add(&location);
                }
                None => println!("nothing to bookmark"),
            }
        }
        "switch" => report(row().is_some_and(|i| session.set_active(Some(i))), "no such tab"),
        "close" => {
            let closed = match row() {
                Some(index) => session.close_at(index),
                None => session.close_active(),
            };
            report(closed, "no such tab");
        }
        "static" => {
            session.add_static_page(if arg.is_empty() { "About" } else { arg }, true);
        }
        "hover" => {
            if let Some(id) = session.active_tab().map(|t| t.id()) {
                session.handle_event(TabEvent {
                    tab: id,
                    kind: TabEventKind::LinkHovered(Location::parse(arg).ok()),
                });
            }
            println!("status: {}", session.status_text());
        }
        _ => match session.dispatch_shortcut(line) {
            Some(done) => report(done, "nothing to do"),
            None => println!("unknown command: {}", line),
        },
    }
    true
}

fn report(ok: bool, failure: &str) {
    if !ok {
        println!("{}", failure);
    }
}

fn print_state(session: &Session) {
    for (i, container) in session.containers().iter().enumerate() {
        let marker = if session.active_index() == Some(i) { '*' } else { ' ' };
        println!("{} [{}] {}  {}", marker, i, container.label(), container.tooltip());
    }

    let views = session.coordinator();
    println!("history:");
    for (i, row) in views.history_view().rows().iter().enumerate() {
        let current = session.active_tab().and_then(|t| t.position()) == Some(i);
        println!("  {}{} {}", if current { '>' } else { ' ' }, i, row);
    }
    println!("outline:");
    for row in views.outline_view().rows() {
        println!("  {}{}", "  ".repeat(row.depth), row.title);
    }
    println!("favourites:");
    for (i, favourite) in session.favourites().iter().enumerate() {
        println!("  {} {}", i, favourite);
    }
    if !session.status_text().is_empty() {
        println!("status: {}", session.status_text());
    }
}
