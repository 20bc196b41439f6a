//! Auth Handlers

pub mod login;

pub use login::login;
