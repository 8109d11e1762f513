use std::{io, path::PathBuf, sync::Arc, time::Duration};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{info, warn};

use stashpeek::{
    app::App,
    config::Settings,
    git::GitCli,
    input::map_key,
    logging::init_logging,
    tasks::Dispatcher,
    theme::Theme,
    ui,
    utils::copy_to_clipboard,
};

/// Browse, apply, drop and build git stashes from the terminal.
#[derive(Parser, Debug)]
#[command(name = "stashpeek", version, about)]
struct Cli {
    /// Repository to open (defaults to the current directory)
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Extra configuration file, applied last
    #[arg(long)]
    config: Option<PathBuf>,
    /// git executable to run
    #[arg(long)]
    git: Option<String>,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(git) = cli.git {
        settings.git_binary = git;
    }
    if let Some(repo) = &cli.repo {
        settings.repo_path = Some(repo.to_string_lossy().into_owned());
    }

    let _log_guard = init_logging(&settings)?;
    let backend = GitCli::new(settings.git_binary.clone(), settings.repo_dir());
    info!(repo = %backend.repo().display(), "starting");

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, Arc::new(backend), &settings).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    terminal::enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        hook(info);
    }));

    Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run(terminal: &mut Tui, backend: Arc<GitCli>, settings: &Settings) -> Result<()> {
    let theme = Theme::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(backend, tx);

    let mut app = App::new();
    let (width, height) = terminal::size()?;
    app.resize(width, height);

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(settings.tick_rate_ms.max(16)));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        dispatcher.dispatch_all(app.take_tasks());
        terminal.draw(|f| ui::render(f, &app, &theme))?;
        if app.should_quit {
            info!("quitting");
            return Ok(());
        }

        tokio::select! {
            _ = tick.tick() => {}
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Some(Ok(Event::Resize(width, height))) => app.resize(width, height),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("reading terminal events"),
                None => return Ok(()),
            },
            Some(completion) = rx.recv() => app.on_completion(completion),
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let Some(action) = map_key(app.modal, key) else { return };
    app.apply(action);

    let Some(text) = app.take_clipboard() else { return };
    match copy_to_clipboard(text) {
        Ok(()) => app.notice("Copied panel to clipboard"),
        Err(e) => {
            warn!(error = %e, "clipboard unavailable");
            app.notice(format!("Clipboard unavailable: {e}"));
        }
    }
}
