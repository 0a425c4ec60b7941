use crate::app::{App, Tab};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{render_header, render_post_list, render_detail, render_favorites, render_status_bar, render_help_screen};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    // Create main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(0),     // Content
            Constraint::Length(1),  // Status bar
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Overlays (drawn last)
    if app.help_open {
        render_help_screen(frame, app, size);
    }
}

/// The detail screen replaces whichever tab it was opened from
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(detail) = &app.detail {
        render_detail(frame, app, detail, area);
        return;
    }
    match app.tab {
        Tab::News => render_post_list(frame, app, area),
        Tab::Favorites => render_favorites(frame, app, area),
    }
}
