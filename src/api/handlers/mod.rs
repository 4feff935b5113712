//! HTTP request handlers.

pub mod create;
pub mod fallback;
pub mod health;
pub mod redirect;

pub use create::create_handler;
pub use fallback::{method_not_allowed_handler, not_found_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
