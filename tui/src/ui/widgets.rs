use crate::app::{
    App, DetailScreen, Loadable, Tab, MSG_LOADING_ARTICLE, MSG_LOADING_FAVORITES, MSG_LOADING_NEWS,
    MSG_NO_FAVORITES,
};
use postdeck_core::text::{strip_html, truncate_chars};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

const NO_TITLE: &str = "No title";
const NO_DESCRIPTION: &str = "No description";
const NO_TEXT: &str = "No text";

/// Render the header with tabs and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Postdeck "))
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let key_hints = if app.detail.is_some() {
        " [Esc:Back] [f:Favorite] [↑/↓:Scroll] [?:Help] [q:Quit] "
    } else if app.tab == Tab::Favorites {
        " [↑/↓:Move] [Enter:Open] [d:Remove] [Tab:Switch] [?:Help] [q:Quit] "
    } else {
        " [↑/↓:Move] [Enter:Open] [r:Reload] [Tab:Switch] [?:Help] [q:Quit] "
    };
    let hints = Paragraph::new(Line::from(Span::styled(key_hints, Style::default().fg(Color::DarkGray))))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    frame.render_widget(hints, chunks[1]);
}

/// Centered one-line message inside a titled box
fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)))
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render the news list
pub fn render_post_list(frame: &mut Frame, app: &App, area: Rect) {
    let posts = match &app.posts {
        Loadable::Loading => {
            render_message(frame, area, "News", MSG_LOADING_NEWS, Color::DarkGray);
            return;
        }
        Loadable::Failed(message) => {
            render_message(frame, area, "News", message, Color::Red);
            return;
        }
        Loadable::Loaded(posts) => posts,
    };

    if posts.is_empty() {
        render_message(frame, area, "News", "No news yet.", Color::DarkGray);
        return;
    }

    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| {
            let title = post.plain_title();
            let excerpt = post.plain_excerpt();
            let excerpt = if excerpt.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                truncate_chars(&excerpt, app.config.ui.excerpt_chars).replace('\n', " ")
            };
            let marker = if app.is_favorite(post.id) { "♥ " } else { "  " };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Red)),
                    Span::styled(
                        if title.is_empty() { NO_TITLE.to_string() } else { title },
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(format!("  {}", excerpt), Style::default().fg(Color::Gray))),
                Line::from(""),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.posts_selected_index));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" News ({}) ", posts.len()))
                .title_alignment(Alignment::Left),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render a single post
pub fn render_detail(frame: &mut Frame, app: &App, detail: &DetailScreen, area: Rect) {
    let block_title = match detail.post_id {
        Some(id) => format!("Article #{}", id),
        None => "Article".to_string(),
    };
    let post = match &detail.state {
        Loadable::Loading => {
            render_message(frame, area, &block_title, MSG_LOADING_ARTICLE, Color::DarkGray);
            return;
        }
        Loadable::Failed(message) => {
            render_message(frame, area, &block_title, message, Color::Red);
            return;
        }
        Loadable::Loaded(post) => post,
    };

    let title = post.plain_title();
    let favorite = app.is_favorite(post.id);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                if favorite { "♥ " } else { "♡ " },
                Style::default().fg(if favorite { Color::Red } else { Color::DarkGray }),
            ),
            Span::styled(
                if title.is_empty() { NO_TITLE.to_string() } else { title },
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(date) = post.date {
        lines.push(Line::from(Span::styled(
            date.format("%Y-%m-%d %H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    let content = post.plain_content();
    if content.is_empty() {
        lines.push(Line::from(NO_TEXT));
    } else {
        lines.extend(content.lines().map(|l| Line::from(l.to_string())));
    }

    // Rows after wrapping; the last row may scroll up to the top edge
    let inner_width = usize::from(area.width.saturating_sub(2).max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(inner_width))
        .sum();
    let max_scroll = u16::try_from(rows.saturating_sub(1)).unwrap_or(u16::MAX);
    detail.max_scroll.set(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", block_title))
                .title_alignment(Alignment::Left),
        )
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll.min(max_scroll), 0));

    frame.render_widget(paragraph, area);
}

/// Render the favorites tab
pub fn render_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.favorites_snapshot();
    if app.favorites_loading() {
        render_message(frame, area, "Favorites", MSG_LOADING_FAVORITES, Color::DarkGray);
        return;
    }
    if snapshot.items.is_empty() {
        render_message(frame, area, "Favorites", MSG_NO_FAVORITES, Color::DarkGray);
        return;
    }

    let items: Vec<ListItem> = snapshot
        .items
        .iter()
        .map(|f| {
            ListItem::new(Line::from(vec![
                Span::styled("♥ ", Style::default().fg(Color::Red)),
                Span::styled(strip_html(&f.title).trim().to_string(), Style::default().fg(Color::Cyan)),
                Span::styled(format!("  #{}", f.id), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.favorites_selected_index));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Favorites ({}) ", snapshot.items.len()))
                .title_alignment(Alignment::Left),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = match &app.status_message {
        Some(message) => format!(" {} ", message),
        None => format!(" {} ", app.config.api.base_url),
    };

    let status_bar = Paragraph::new(status_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

pub fn render_help_screen(frame: &mut Frame, _app: &App, size: Rect) {
    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("Lists", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from("↑/↓ j/k      Move selection"),
        Line::from("Enter        Open article"),
        Line::from("Tab          Switch News / Favorites"),
        Line::from("1 / 2        Jump to News / Favorites"),
        Line::from("r            Reload news"),
        Line::from("d / Delete   Remove favorite"),
        Line::from(""),
        Line::from(Span::styled("Article", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from("↑/↓ PgUp/Dn  Scroll"),
        Line::from("f            Toggle favorite"),
        Line::from("Esc          Back"),
        Line::from(""),
        Line::from(Span::styled("Interface", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from("?            Show this help"),
        Line::from("q            Quit application"),
        Line::from(""),
        Line::from(Span::styled("Press '?' or 'Esc' to close", Style::default().fg(Color::DarkGray))),
    ];

    let popup_width = 50.min(size.width);
    let popup_height = (help_text.len() as u16 + 2).min(size.height);
    let x = (size.width.saturating_sub(popup_width)) / 2;
    let y = (size.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help - Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use crate::app::tests::{post, test_app, FakeSource};
    use crate::app::{App, AppMessage, Tab, MSG_LOADING_ARTICLE, MSG_NEWS_FAILED, MSG_NO_FAVORITES};
    use crate::config::Config;
    use crate::ui::render;
    use postdeck_core::models::ContentPost;
    use postdeck_core::storage::{FavoritesStore, MemoryKvStore, FAVORITES_KEY};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;

    fn draw(app: &crate::app::App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_list_failure_is_rendered() {
        let (mut app, _store, _rx) = test_app(vec![], true);
        app.handle_message(AppMessage::PostsLoaded(Err("HTTP error 500".to_string())));

        let screen = draw(&app);
        assert!(screen.contains(MSG_NEWS_FAILED));
    }

    #[test]
    fn test_list_shows_plain_titles() {
        let (mut app, _store, _rx) = test_app(vec![], false);
        app.handle_message(AppMessage::PostsLoaded(Ok(vec![post(1, "<b>Campus news</b>")])));

        let screen = draw(&app);
        assert!(screen.contains("Campus news"));
        assert!(screen.contains("Excerpt of 1 ..."));
        assert!(!screen.contains("<b>"));
    }

    #[tokio::test]
    async fn test_loading_article_shows_id() {
        let (mut app, _store, _rx) = test_app(vec![], false);
        app.open_detail_param("12");

        let screen = draw(&app);
        assert!(screen.contains("Article #12"));
        assert!(screen.contains(MSG_LOADING_ARTICLE));
    }

    #[tokio::test]
    async fn test_detail_scroll_stops_at_last_line() {
        let body: String = (1..=40).map(|i| format!("Paragraph {}\n", i)).collect();
        let long: ContentPost = serde_json::from_value(serde_json::json!({
            "id": 5,
            "title": {"rendered": "Long read"},
            "content": {"rendered": body},
        }))
        .unwrap();
        let (mut app, _store, mut rx) = test_app(vec![long], false);
        app.open_detail(5);
        let message = rx.recv().await.unwrap();
        app.handle_message(message);
        draw(&app);

        for _ in 0..500 {
            app.move_cursor_down();
        }
        let detail = app.detail.as_ref().unwrap();
        // Title, blank line, then 40 content lines
        assert_eq!(detail.max_scroll.get(), 41);
        assert_eq!(detail.scroll, 41);
        assert!(draw(&app).contains("Paragraph 40"));

        app.move_cursor_up();
        assert_eq!(app.detail.as_ref().unwrap().scroll, 40);
    }

    #[tokio::test]
    async fn test_favorites_render_legacy_markup_as_text() {
        let kv = Arc::new(MemoryKvStore::with_entry(
            FAVORITES_KEY,
            r#"[{"id":4,"title":"<em>Open</em> day"}]"#,
        ));
        let store = Arc::new(FavoritesStore::new(kv));
        store.load().await;
        let (tx, _rx) = unbounded_channel();
        let mut app = App::new(
            Config::default(),
            store,
            Arc::new(FakeSource { posts: vec![], fail_list: false }),
            tx,
        );
        app.select_tab(Tab::Favorites);

        let screen = draw(&app);
        assert!(screen.contains("Open day"));
        assert!(!screen.contains("<em>"));
    }

    #[tokio::test]
    async fn test_empty_favorites_message() {
        let (mut app, store, _rx) = test_app(vec![], false);
        store.load().await;
        app.next_tab();

        let screen = draw(&app);
        assert!(screen.contains(MSG_NO_FAVORITES));
    }
}
