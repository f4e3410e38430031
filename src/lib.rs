pub mod db;
pub mod http_error;
pub mod kernel;
pub mod plugins;
pub mod storage;

pub use crate::db::*;
pub use crate::kernel::*;
