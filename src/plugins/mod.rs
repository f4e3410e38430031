pub mod auth;
pub mod banners;
pub mod blog;
pub mod books;
pub mod health;
pub mod metrics;
pub mod shared;
