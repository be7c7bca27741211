pub mod connectivity;
pub mod deletion;
pub mod executor;
pub mod files;
pub mod label;
pub mod manager;
pub mod manifest;
pub mod ordering;
pub mod progress;
pub mod store;
pub mod validator;

pub use connectivity::Connectivity;
pub use executor::{RetryPolicy, UploadExecutor};
pub use manager::{IgnoreReason, MediaManager, UploadOutcome};
pub use store::{HttpImageStore, ImageStore};
