mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_header,
    render_post_list,
    render_detail,
    render_favorites,
    render_status_bar,
    render_help_screen,
};
