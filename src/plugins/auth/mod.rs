pub mod handlers;
pub mod models;
pub mod plugin;
pub mod middleware;
pub mod repo;

pub use plugin::AuthPlugin;
