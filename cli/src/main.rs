mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    event::{EnableMouseCapture, DisableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use postdeck_core::{
    content::ContentClient,
    storage::{FavoritesStore, SqliteKvStore},
};
use postdeck_tui::{
    config::{default_config_path, load_config},
    App, AppMessage, EventHandler,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::info;

/// Terminal reader for a WordPress news feed
#[derive(Parser, Debug)]
#[command(name = "postdeck", version, about)]
struct Cli {
    /// Config file (created with defaults if missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite file holding favorites
    #[arg(long)]
    db: Option<PathBuf>,

    /// Content API base URL, e.g. https://example.org/wp-json/wp/v2
    #[arg(long)]
    api_url: Option<String>,

    /// Open this post's detail screen on start
    #[arg(long)]
    post: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let db_path = &config.storage.db_path;
    let kv = SqliteKvStore::open(db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    let favorites = Arc::new(FavoritesStore::new(Arc::new(kv)));
    let client = Arc::new(ContentClient::new(&config.api.base_url, config.request_timeout())?);
    info!(api = %config.api.base_url, db = %config.storage.db_path.display(), "starting");

    let (tx, mut rx) = unbounded_channel();
    let tick_rate_ms = config.ui.tick_rate_ms;
    let mut app = App::new(config, favorites, client, tx);
    app.start();
    if let Some(post) = cli.post.as_deref() {
        app.open_detail_param(post);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = EventHandler::new(tick_rate_ms);

    // Main loop
    let result = run_app(&mut terminal, &mut app, &event_handler, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print result
    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
    rx: &mut UnboundedReceiver<AppMessage>,
) -> Result<()> {
    loop {
        // Apply results from background fetches and favorites writes
        while let Ok(message) = rx.try_recv() {
            app.handle_message(message);
        }

        // Draw UI
        terminal.draw(|f| postdeck_tui::ui::render(f, app))?;

        // Handle events
        let event = event_handler.next()?;
        match event {
            postdeck_tui::Event::Key(key) => {
                postdeck_tui::event::handle_key_event(key, app);
            }
            postdeck_tui::Event::Mouse(mouse) => {
                postdeck_tui::event::handle_mouse_event(mouse, app);
            }
            postdeck_tui::Event::Tick => {
                app.tick();
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
