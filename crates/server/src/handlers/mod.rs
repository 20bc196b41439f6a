//! Handlers for the blog and user resources

pub mod blogs;
pub mod testing;
pub mod users;

// Re-export AppState from config
pub use crate::core::config::AppState;

pub use blogs::{create_blog, delete_blog, list_blogs, update_blog};
pub use users::{create_user, list_users};
