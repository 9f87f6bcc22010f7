// data/mod.rs
pub mod types;
pub mod errors;
pub mod loader;

// Re-export main interfaces for easy access
pub use types::*;
pub use errors::DataError;
pub use loader::{PriceLoader, LoaderConfig};
