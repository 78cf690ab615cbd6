pub mod config;
pub mod dataset;
pub mod error;
pub mod store;

// Re-export specific items for convenient access
pub use config::{RangeMatch, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use store::curator::DatasetStore;
