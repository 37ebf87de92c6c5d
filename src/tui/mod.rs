pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::ThemeColors;

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::fetch::{load_snapshot, Snapshot};
use crate::source::Client;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

type FetchHandle = JoinHandle<Result<anyhow::Result<Snapshot>, tokio::time::error::Elapsed>>;

fn spawn_fetch(client: &Client, model: &str) -> FetchHandle {
    let client = client.clone();
    let model = model.to_string();
    tokio::spawn(async move {
        tokio::time::timeout(FETCH_TIMEOUT, load_snapshot(&client, &model)).await
    })
}

pub async fn run_dashboard(mut app: App, client: Client) -> anyhow::Result<()> {
    // Buffer stderr while the dashboard is active to prevent log lines corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let mut pending_fetch: Option<FetchHandle> = None;
    let mut pending_save: Option<JoinHandle<anyhow::Result<()>>> = None;

    let result: anyhow::Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Some(Event::Key(key)) => {
                if let Some(payload) = handle_key_event(&mut app, key) {
                    let client = client.clone();
                    let model = app.session.model_name().to_string();
                    pending_save = Some(tokio::spawn(async move {
                        client.save_weights(&model, &payload).await
                    }));
                }
            }
            Some(Event::Tick) => {
                app.update_flash();
                app.advance_spinner();
            }
            None => app.should_quit = true,
        }

        // Check if background fetch has completed
        if pending_fetch.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_fetch.take() {
                match handle.await {
                    Ok(Ok(Ok(snapshot))) => {
                        let read_only = client.is_read_only(&snapshot.model_name);
                        app.update_snapshot(snapshot, read_only);
                    }
                    Ok(Ok(Err(e))) => app.show_flash(format!("Failed to load data: {:#}", e)),
                    Ok(Err(_elapsed)) => app.show_flash(format!(
                        "Failed to load data: timed out after {}s",
                        FETCH_TIMEOUT.as_secs()
                    )),
                    Err(e) => app.show_flash(format!("Failed to load data: task panicked: {}", e)),
                }
                app.is_loading = false;
            }
        }

        if pending_save.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_save.take() {
                let result = handle
                    .await
                    .unwrap_or_else(|e| Err(anyhow::anyhow!("save task panicked: {}", e)));
                app.finish_save(result);
            }
        }

        // A model switch takes priority over a refresh of the current model
        if pending_fetch.is_none() {
            if let Some(model) = app.pending_model.take() {
                app.needs_refresh = false;
                pending_fetch = Some(spawn_fetch(&client, &model));
                app.is_loading = true;
            }
        }

        // Spawn new refresh if needed and no fetch is pending
        if app.needs_refresh && pending_fetch.is_none() {
            app.needs_refresh = false;
            pending_fetch = Some(spawn_fetch(&client, app.session.model_name()));
            app.is_loading = true;
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered log lines now that the terminal is restored
    for line in crate::stderr_buffer::drain() {
        eprintln!("{}", line);
    }

    result
}

/// Apply a key press. Returns a weights payload when the user asked to save.
fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<std::collections::BTreeMap<String, f64>> {
    match app.input_mode {
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
            return None;
        }
        app::InputMode::ModelPicker => {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.next_model(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_model(),
                KeyCode::Enter => app.confirm_model(),
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => {
                    app.cancel_model_picker()
                }
                _ => {}
            }
            return None;
        }
        app::InputMode::Normal => {}
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.next_row(),
        KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
        KeyCode::Tab => app.toggle_focus(),

        // Weights
        KeyCode::Char('l') | KeyCode::Right if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.adjust_selected(app::COARSE_STEP)
        }
        KeyCode::Char('h') | KeyCode::Left if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.adjust_selected(-app::COARSE_STEP)
        }
        KeyCode::Char('l') | KeyCode::Right => app.adjust_selected(app::FINE_STEP),
        KeyCode::Char('h') | KeyCode::Left => app.adjust_selected(-app::FINE_STEP),
        KeyCode::Char('L') => app.adjust_selected(app::COARSE_STEP),
        KeyCode::Char('H') => app.adjust_selected(-app::COARSE_STEP),
        KeyCode::Char('0') => app.reset_weights(),

        // Model and ordering
        KeyCode::Char('m') => app.open_model_picker(),
        KeyCode::Char('o') => app.toggle_sort(),

        // Save
        KeyCode::Char('s') => return app.request_save(),

        // Refresh
        KeyCode::Char('r') => {
            app.needs_refresh = true;
            app.show_flash("Refreshing...".to_string());
        }

        // Help
        KeyCode::Char('?') => app.show_help(),

        _ => {}
    }
    None
}
