use serde::{Deserialize, Serialize};

use super::ContentPost;

/// A post retained locally by id, with the title captured when it was favorited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteItem {
    pub id: i64,
    pub title: String,
}

impl FavoriteItem {
    /// Create a new favorite
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Snapshot a post as a favorite, keeping its title as plain text
    pub fn from_post(post: &ContentPost) -> Self {
        Self::new(post.id, post.plain_title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_creation() {
        let favorite = FavoriteItem::new(5, "X");
        assert_eq!(favorite.id, 5);
        assert_eq!(favorite.title, "X");
    }

    #[test]
    fn test_favorite_from_post_strips_markup() {
        let post: ContentPost = serde_json::from_str(
            r#"{"id": 12, "title": {"rendered": "<b>Open</b> day"}}"#,
        )
        .unwrap();

        let favorite = FavoriteItem::from_post(&post);
        assert_eq!(favorite, FavoriteItem::new(12, "Open day"));
    }

    #[test]
    fn test_favorite_json_shape() {
        let json = serde_json::to_string(&FavoriteItem::new(3, "Title")).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"Title"}"#);
    }
}
