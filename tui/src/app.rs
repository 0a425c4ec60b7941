use postdeck_core::{
    content::{parse_post_id, ContentSource},
    models::{ContentPost, FavoriteItem},
    storage::{FavoritesSnapshot, FavoritesStore},
};
use std::cell::Cell;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::{debug, error};
use crate::config::Config;

pub const MSG_LOADING_NEWS: &str = "Loading news...";
pub const MSG_NEWS_FAILED: &str = "Failed to load news";
pub const MSG_LOADING_ARTICLE: &str = "Loading article...";
pub const MSG_ARTICLE_FAILED: &str = "Failed to load article";
pub const MSG_INVALID_ARTICLE_ID: &str = "Invalid article ID";
pub const MSG_LOADING_FAVORITES: &str = "Loading favorites...";
pub const MSG_NO_FAVORITES: &str = "Your favorites list is empty.";

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    News,
    Favorites,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::News, Tab::Favorites];

    pub fn title(self) -> &'static str {
        match self {
            Tab::News => "News",
            Tab::Favorites => "Favorites",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::News => 0,
            Tab::Favorites => 1,
        }
    }
}

/// State of a remote resource owned by one screen
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Failed(String),
    Loaded(T),
}

/// The detail screen for one post
#[derive(Debug, Clone)]
pub struct DetailScreen {
    pub post_id: Option<i64>,
    /// Sequence number of the fetch this screen is waiting on
    pub request: u64,
    pub state: Loadable<ContentPost>,
    pub scroll: u16,
    /// Furthest the article can scroll, measured on the last render
    pub max_scroll: Cell<u16>,
}

impl DetailScreen {
    fn new(post_id: Option<i64>, request: u64, state: Loadable<ContentPost>) -> Self {
        Self {
            post_id,
            request,
            state,
            scroll: 0,
            max_scroll: Cell::new(0),
        }
    }
}

/// Results sent back to the UI loop by background tasks
#[derive(Debug)]
pub enum AppMessage {
    PostsLoaded(std::result::Result<Vec<ContentPost>, String>),
    PostLoaded {
        request: u64,
        result: std::result::Result<ContentPost, String>,
    },
    FavoriteChanged {
        title: String,
        added: bool,
    },
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub tab: Tab,
    pub posts: Loadable<Vec<ContentPost>>,
    pub posts_selected_index: usize,
    pub favorites_selected_index: usize,
    pub detail: Option<DetailScreen>,
    pub help_open: bool,
    pub status_message: Option<String>,
    favorites: Arc<FavoritesStore>,
    favorites_rx: watch::Receiver<FavoritesSnapshot>,
    source: Arc<dyn ContentSource>,
    tx: UnboundedSender<AppMessage>,
    next_request: u64,
}

impl App {
    /// Create a new App instance
    pub fn new(
        config: Config,
        favorites: Arc<FavoritesStore>,
        source: Arc<dyn ContentSource>,
        tx: UnboundedSender<AppMessage>,
    ) -> Self {
        let favorites_rx = favorites.subscribe();
        Self {
            should_quit: false,
            config,
            tab: Tab::News,
            posts: Loadable::Loading,
            posts_selected_index: 0,
            favorites_selected_index: 0,
            detail: None,
            help_open: false,
            status_message: None,
            favorites,
            favorites_rx,
            source,
            tx,
            next_request: 0,
        }
    }

    /// Kick off the one favorites load of this session and the first news fetch
    pub fn start(&mut self) {
        let favorites = Arc::clone(&self.favorites);
        tokio::spawn(async move { favorites.load().await });
        self.reload_posts();
    }

    pub fn reload_posts(&mut self) {
        self.posts = Loadable::Loading;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_list().await.map_err(|e| {
                error!(error = %e, "failed to load news");
                e.to_string()
            });
            // The receiver is gone only when the app is shutting down
            let _ = tx.send(AppMessage::PostsLoaded(result));
        });
    }

    /// Open the detail screen for `id`, replacing any open one
    pub fn open_detail(&mut self, id: i64) {
        self.next_request += 1;
        let request = self.next_request;
        self.detail = Some(DetailScreen::new(Some(id), request, Loadable::Loading));

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_one(id).await.map_err(|e| {
                error!(post_id = id, error = %e, "failed to load article");
                e.to_string()
            });
            let _ = tx.send(AppMessage::PostLoaded { request, result });
        });
    }

    /// Open the detail screen from a raw path parameter
    pub fn open_detail_param(&mut self, raw: &str) {
        match parse_post_id(raw) {
            Ok(id) => self.open_detail(id),
            Err(e) => {
                debug!(param = raw, error = %e, "rejected article id");
                self.next_request += 1;
                self.detail = Some(DetailScreen::new(
                    None,
                    self.next_request,
                    Loadable::Failed(MSG_INVALID_ARTICLE_ID.to_string()),
                ));
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Apply a background result. Results for a closed or replaced detail
    /// screen are dropped.
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::PostsLoaded(Ok(posts)) => {
                self.status_message = Some(format!("Loaded {} posts", posts.len()));
                self.posts_selected_index = self.posts_selected_index.min(posts.len().saturating_sub(1));
                self.posts = Loadable::Loaded(posts);
            }
            AppMessage::PostsLoaded(Err(e)) => {
                self.status_message = Some(e);
                self.posts = Loadable::Failed(MSG_NEWS_FAILED.to_string());
            }
            AppMessage::PostLoaded { request, result } => {
                let Some(detail) = self.detail.as_mut().filter(|d| d.request == request) else {
                    debug!(request, "dropping stale article result");
                    return;
                };
                detail.state = match result {
                    Ok(post) => Loadable::Loaded(post),
                    Err(e) => {
                        self.status_message = Some(e);
                        Loadable::Failed(MSG_ARTICLE_FAILED.to_string())
                    }
                };
            }
            AppMessage::FavoriteChanged { title, added } => {
                self.status_message = Some(if added {
                    format!("Added to favorites: {}", title)
                } else {
                    format!("Removed from favorites: {}", title)
                });
            }
        }
    }

    /// Toggle the post shown in the detail screen in or out of favorites
    pub fn toggle_favorite_current(&mut self) {
        let Some(post) = self.current_post() else {
            return;
        };
        let item = FavoriteItem::from_post(post);
        let store = Arc::clone(&self.favorites);
        let tx = self.tx.clone();

        if self.favorites.is_favorite(item.id) {
            tokio::spawn(async move {
                if store.remove(item.id).await {
                    let _ = tx.send(AppMessage::FavoriteChanged { title: item.title, added: false });
                }
            });
        } else {
            tokio::spawn(async move {
                let title = item.title.clone();
                if store.add(item).await {
                    let _ = tx.send(AppMessage::FavoriteChanged { title, added: true });
                }
            });
        }
    }

    pub fn remove_selected_favorite(&mut self) {
        let Some(item) = self.selected_favorite() else {
            return;
        };
        let store = Arc::clone(&self.favorites);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if store.remove(item.id).await {
                let _ = tx.send(AppMessage::FavoriteChanged { title: item.title, added: false });
            }
        });
    }

    /// Open whatever is selected on the current tab
    pub fn open_selected(&mut self) {
        let id = match self.tab {
            Tab::News => self.selected_post().map(|p| p.id),
            Tab::Favorites => self.selected_favorite().map(|f| f.id),
        };
        if let Some(id) = id {
            self.open_detail(id);
        }
    }

    pub fn current_post(&self) -> Option<&ContentPost> {
        match &self.detail.as_ref()?.state {
            Loadable::Loaded(post) => Some(post),
            _ => None,
        }
    }

    pub fn selected_post(&self) -> Option<&ContentPost> {
        match &self.posts {
            Loadable::Loaded(posts) => posts.get(self.posts_selected_index),
            _ => None,
        }
    }

    pub fn selected_favorite(&self) -> Option<FavoriteItem> {
        self.favorites
            .favorites()
            .get(self.favorites_selected_index)
            .cloned()
    }

    pub fn favorites_snapshot(&self) -> FavoritesSnapshot {
        self.favorites.snapshot()
    }

    pub fn favorites_loading(&self) -> bool {
        self.favorites.is_loading()
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn move_cursor_up(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll = detail.scroll.saturating_sub(1);
            return;
        }
        match self.tab {
            Tab::News => self.posts_selected_index = self.posts_selected_index.saturating_sub(1),
            Tab::Favorites => {
                self.favorites_selected_index = self.favorites_selected_index.saturating_sub(1)
            }
        }
    }

    pub fn move_cursor_down(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll = detail.scroll.saturating_add(1).min(detail.max_scroll.get());
            return;
        }
        match self.tab {
            Tab::News => {
                let len = match &self.posts {
                    Loadable::Loaded(posts) => posts.len(),
                    _ => 0,
                };
                if self.posts_selected_index + 1 < len {
                    self.posts_selected_index += 1;
                }
            }
            Tab::Favorites => {
                if self.favorites_selected_index + 1 < self.favorites.favorites().len() {
                    self.favorites_selected_index += 1;
                }
            }
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.detail = None;
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        let next = Tab::ALL[(self.tab.index() + 1) % Tab::ALL.len()];
        self.select_tab(next);
    }

    /// Called on every tick; picks up favorites published by background tasks
    pub fn tick(&mut self) {
        if self.favorites_rx.has_changed().unwrap_or(false) {
            let len = self.favorites_rx.borrow_and_update().items.len();
            self.favorites_selected_index = self.favorites_selected_index.min(len.saturating_sub(1));
        }
    }

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
