pub mod api;
pub mod csv_export;
pub mod file;
pub mod image_export;
pub mod sync;

pub use api::StateClient;
pub use sync::{Autosaver, SyncStatus};
