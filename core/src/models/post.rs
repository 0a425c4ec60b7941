use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::text::strip_html;

/// A field the content API delivers as pre-rendered HTML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// A remote article. Only `id` is required; everything else falls back to
/// empty so a sparse payload still renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentPost {
    pub id: i64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_gmt: Option<NaiveDateTime>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub author: Option<i64>,
    #[serde(default)]
    pub featured_media: Option<i64>,
}

impl ContentPost {
    pub fn plain_title(&self) -> String {
        strip_html(&self.title.rendered).trim().to_string()
    }

    pub fn plain_content(&self) -> String {
        strip_html(&self.content.rendered).trim().to_string()
    }

    pub fn plain_excerpt(&self) -> String {
        strip_html(&self.excerpt.rendered).trim().to_string()
    }
}
