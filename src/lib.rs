//! queuebot - a chat bot control core with hot-reloadable extensions

pub mod application;
pub mod domain;
pub mod extensions;
pub mod infrastructure;
