mod app;
mod cli;
mod config;
mod error;
mod event;
mod form;
mod kanban_board;
mod logging;
mod store;
mod task;
mod ui;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf, sync::Arc};

use crate::app::App;
use crate::store::{HttpStore, KworkStore};

#[derive(Parser)]
#[command(name = "kworkboard", version, about = "Kanban board for freelance job leads")]
struct Cli {
    /// Config file (default: <config dir>/kworkboard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides server.base_url
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive board (default)
    Board,
    /// Print every column
    List,
    /// Count cards per column
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match cli.config.or_else(config::default_config_path) {
        Some(path) => config::load_config(&path)?,
        None => config::Config::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }
    if let Err(err) = logging::init(&config.log) {
        eprintln!("warning: logging disabled: {}", err);
    }

    let store = Arc::new(HttpStore::new(
        &config.server.base_url,
        config.server.timeout(),
    ));

    match cli.command.unwrap_or(Commands::Board) {
        Commands::Board => run_board(store)?,
        Commands::List => cli::list_tasks(store.as_ref())?,
        Commands::Stats => cli::show_stats(store.as_ref())?,
    }
    Ok(())
}

fn run_board(store: Arc<dyn KworkStore>) -> Result<(), Box<dyn std::error::Error>> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    app.load();

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "board loop failed");
        eprintln!("{:?}", err);
    }
    Ok(())
}
