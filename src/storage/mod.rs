pub mod form;
pub mod paths;
pub mod upload;

pub use form::FormPayload;
pub use upload::{UploadStore, UploadedFile};
