pub mod analysis;
pub mod errors;
pub mod report;
pub mod runner;

// Re-export main interfaces
pub use analysis::{Analysis, AnalysisService};
pub use errors::ServiceError;
pub use runner::run_batch;
