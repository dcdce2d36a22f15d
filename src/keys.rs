use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let Some(request) = dispatch(&mut guard, key_event) {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

/// Apply a key to the app. Returns a request on `r` or when a tab switch lands
/// on data that has not been loaded yet.
fn dispatch(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        quit();
    }

    if app.state.search.composing {
        match key_event.code {
            KeyCode::Enter => return app.submit_search(),
            KeyCode::Esc => app.clear_search(),
            KeyCode::Backspace => app.pop_search_char(),
            Char(c) => app.push_search_char(c),
            _ => {}
        }
        return None;
    }

    let tab_before = app.state.active_tab;

    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        (_, Char('q'), _) => quit(),

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Live),
        (_, Char('2'), _) => app.update_tab(MenuItem::Upcoming),
        (_, Char('3'), _) => app.update_tab(MenuItem::Tournaments),
        (_, Char('4'), _) => app.update_tab(MenuItem::Players),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // List navigation
        (_, Char('j') | KeyCode::Down, _) => app.state.move_down(),
        (_, Char('k') | KeyCode::Up, _) => app.state.move_up(),
        (_, Char('r'), _) => return app.refresh_request(),

        // Search
        (_, Char('/'), _) => app.start_search(),
        (_, KeyCode::Esc, _) => app.clear_search(),

        // Global
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }

    if app.state.active_tab == tab_before {
        return None;
    }
    app.pending_load()
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}
