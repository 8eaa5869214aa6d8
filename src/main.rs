use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use pdfquiz::app::App;
use pdfquiz::config::{self, Config};
use pdfquiz::event::{AppEvent, EventHandler};
use pdfquiz::generator::{OpenAiGenerator, QuestionGenerator};
use pdfquiz::logging;
use pdfquiz::pdf::PdfProcessor;
use pdfquiz::session::Services;
use pdfquiz::store::db::Store;
use pdfquiz::ui;
use pdfquiz::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "pdfquiz", version, about = "Generate practice tests from PDF documents")]
struct Cli {
    #[arg(long, help = "SQLite database file")]
    database: Option<PathBuf>,

    #[arg(short, long, help = "Directory to search for PDF files")]
    dir: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Model used for question generation")]
    model: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_path = Config::config_path();
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config {}: {e:#}", config_path.display());
            std::process::exit(1);
        }
    };
    let _log_guard = match logging::init(&logging::log_dir(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        }
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pdfquiz starting");

    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(dir) = cli.dir {
        config.pdf_dir = dir;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(model) = cli.model {
        config.openai_model = model;
    }

    let store = match Store::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(path = %config.database_path.display(), error = %e, "cannot open database");
            eprintln!("Error: failed to open database {}: {e}", config.database_path.display());
            std::process::exit(1);
        }
    };

    let generator = OpenAiGenerator::from_config(&config, config::openai_api_key());
    tracing::info!(
        database = %config.database_path.display(),
        model = %config.openai_model,
        generation_enabled = generator.is_enabled(),
        "services ready"
    );
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });

    let services = Services {
        store,
        extractor: Box::new(PdfProcessor::new()),
        generator: Box::new(generator),
        config,
        config_path: Some(config_path),
    };
    let mut app = App::new(services, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "exiting on error");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("pdfquiz exiting");
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if app.is_busy() {
            app.run_pending();
            let dropped = events.drain();
            if dropped > 0 {
                tracing::debug!(dropped, "ignored input received while busy");
            }
            continue;
        }

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
