//! Analysis layer: keyword fallback classifier, remote analyzer contract, image
//! evidence boost, and chunked batch analysis.

mod analyzer;
mod backend;
mod batch;
mod error;
pub mod fallback;
pub mod keywords;
pub mod reply;

#[cfg(test)]
mod mock;

pub use analyzer::{AnalyzerConfig, MAX_EVIDENCE_IMAGES, ObjectionAnalyzer};
pub use backend::{AnalysisBackend, ImageAnalysisRequest, TextAnalysisRequest};
pub use batch::{BATCH_CHUNK_SIZE, BatchItem};
pub use error::{AnalysisError, BatchError};
pub use fallback::{KeywordSignals, classify};
