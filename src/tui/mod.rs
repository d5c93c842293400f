mod app;
mod draw;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

use crate::storage::KeyValueStorage;
use crate::store::CandidateStore;
use app::App;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run<S: KeyValueStorage>(store: CandidateStore<S>, reply_delay: Duration) -> Result<()> {
    let mut app = App::new(store, reply_delay);
    info!(candidates = app.store.len(), "starting terminal ui");

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<S: KeyValueStorage>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| draw::draw(frame, app))?;

        // poll so a pending assistant reply shows up without a keypress
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.tick();
    }
    Ok(())
}
