//! Core types for Mojaz: objections, analysis results, priority ordering, and the store.

pub mod analysis;
mod error;
pub mod objection;
pub mod queue;
pub mod store;

pub use analysis::{AnalysisResult, BonusScore, ImageAnalysisResult, MatchQuality, Priority};
pub use error::ObjectionError;
pub use objection::{NewObjection, Objection, Resolution, ReviewState, ViolationType};
pub use queue::{AutoRejectReport, QueueView, apply_priorities, auto_reject, rerank, sort_by_priority};
pub use store::{DEFAULT_STORE_FILE, ObjectionStore, QueueStats, ResolutionFilter};
