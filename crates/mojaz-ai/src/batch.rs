//! Chunked batch analysis.
//!
//! Items are split into chunks of [`BATCH_CHUNK_SIZE`] in input order. Calls
//! within a chunk run concurrently; the next chunk is only issued once every
//! call in the current one has resolved, so at most five remote calls are in
//! flight.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use mojaz_core::{AnalysisResult, Objection, ViolationType};
use tracing::{debug, info};

use crate::analyzer::ObjectionAnalyzer;
use crate::error::BatchError;

pub const BATCH_CHUNK_SIZE: usize = 5;

/// One objection to (re-)analyse. Batch analysis is text-only.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub id: String,
    pub text: String,
    pub violation_type: ViolationType,
    pub attachments_count: u32,
}

impl From<&Objection> for BatchItem {
    fn from(obj: &Objection) -> Self {
        Self {
            id: obj.id().to_string(),
            text: obj.description().to_string(),
            violation_type: obj.violation_type(),
            attachments_count: obj.evidence().len() as u32,
        }
    }
}

impl ObjectionAnalyzer {
    /// Analyse every item, returning exactly one result per id.
    ///
    /// Individual analyses cannot fail (they fall back locally); the only
    /// error is a duplicate id, detected before any call is issued.
    pub async fn analyze_batch(
        &self,
        items: &[BatchItem],
    ) -> Result<HashMap<String, AnalysisResult>, BatchError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id.as_str()) {
                return Err(BatchError::DuplicateId(item.id.clone()));
            }
        }

        let mut results = HashMap::with_capacity(items.len());
        for (index, chunk) in items.chunks(BATCH_CHUNK_SIZE).enumerate() {
            debug!(chunk = index, size = chunk.len(), "analysing chunk");
            let analysed = join_all(chunk.iter().map(|item| async move {
                let result = self
                    .analyze(&item.text, item.violation_type, item.attachments_count, &[])
                    .await;
                (item.id.clone(), result)
            }))
            .await;
            results.extend(analysed);
        }

        info!(
            count = results.len(),
            chunks = items.len().div_ceil(BATCH_CHUNK_SIZE),
            "batch analysis complete"
        );
        Ok(results)
    }
}
