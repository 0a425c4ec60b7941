use anyhow::Result;
use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind, Event as CEvent, KeyEventKind};
use std::time::Duration;
use crate::app::{App, Tab};

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    // We only want to handle press events to avoid duplicates.
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Help screen takes precedence
    if app.help_open {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') => app.close_help(),
            _ => {}
        }
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // Detail screen sits on top of the tabs
    if app.detail.is_some() {
        handle_detail_input(key, app);
        return;
    }

    // --- Global key handlers (list and favorites tabs) ---
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('?') | KeyCode::Char('h') => app.open_help(),
        KeyCode::Tab | KeyCode::BackTab => app.next_tab(),
        KeyCode::Char('1') => app.select_tab(Tab::News),
        KeyCode::Char('2') => app.select_tab(Tab::Favorites),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('r') if app.tab == Tab::News => app.reload_posts(),
        KeyCode::Char('d') | KeyCode::Delete if app.tab == Tab::Favorites => {
            app.remove_selected_favorite();
        }
        _ => {}
    }
}

/// Handle key events while the detail screen is open
fn handle_detail_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => app.close_detail(),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('?') | KeyCode::Char('h') => app.open_help(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_favorite_current(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
        KeyCode::PageUp => {
            for _ in 0..10 {
                app.move_cursor_up();
            }
        }
        KeyCode::PageDown => {
            for _ in 0..10 {
                app.move_cursor_down();
            }
        }
        KeyCode::Tab | KeyCode::BackTab => app.next_tab(),
        _ => {}
    }
}

/// Handle mouse events: the wheel moves the selection or scrolls the article
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_cursor_up(),
        MouseEventKind::ScrollDown => app.move_cursor_down(),
        _ => {}
    }
}
