mod health;
mod url;

pub use self::health::health_handler;
pub use self::url::{
    expand_handler, list_handler, not_found_handler, redirect_handler, root_redirect_handler,
    shorten_handler,
};
