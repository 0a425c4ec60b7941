mod favorite;
mod post;

pub use favorite::FavoriteItem;
pub use post::{ContentPost, Rendered};
