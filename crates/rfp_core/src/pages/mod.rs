//! Per-page state. Each page owns the request ids it is waiting on and drops
//! events for any other id.
mod analyzer;
mod builder;
mod extraction;
mod upload;

pub use analyzer::AnalyzerPage;
pub use builder::BuilderPage;
pub use extraction::ExtractionPage;
pub use upload::UploadPage;
