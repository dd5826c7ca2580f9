//! Review-queue ordering: priority sort, sort toggle, re-rank, and auto-reject.
//!
//! All ordering goes through [`Priority`]'s `Ord` (high, then medium, then
//! low). Sorts are stable, so objections of equal priority keep their
//! relative order.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

use crate::analysis::{AnalysisResult, Priority};
use crate::objection::{Objection, Resolution};

/// Stable sort by review priority.
pub fn sort_by_priority(items: &mut [Objection]) {
    items.sort_by_key(|o| o.priority());
}

/// Apply batch analysis priorities and return a freshly sorted sequence.
///
/// Objections without an entry in `results` keep their current priority.
pub fn rerank(
    mut items: Vec<Objection>,
    results: &HashMap<String, AnalysisResult>,
) -> Vec<Objection> {
    apply_priorities(&mut items, results);
    sort_by_priority(&mut items);
    items
}

/// Overwrite priorities from `results`; returns how many objections changed tier.
pub fn apply_priorities(
    items: &mut [Objection],
    results: &HashMap<String, AnalysisResult>,
) -> usize {
    let mut changed = 0;
    for obj in items.iter_mut() {
        if let Some(result) = results.get(obj.id()) {
            if obj.priority() != result.priority {
                changed += 1;
            }
            obj.set_priority(result.priority);
        }
    }
    changed
}

/// Outcome of an auto-reject pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoRejectReport {
    pub count: usize,
    pub rejected_ids: Vec<String>,
    /// Wall-clock time of the pass itself; classification happened earlier.
    pub elapsed: Duration,
}

/// Resolve every pending low-priority objection as rejected in one step.
pub fn auto_reject(items: &mut [Objection]) -> AutoRejectReport {
    let start = Instant::now();
    let mut rejected_ids = Vec::new();

    for obj in items
        .iter_mut()
        .filter(|o| o.priority() == Priority::Low && o.is_pending())
    {
        // Pending objections always accept a resolution.
        if obj.resolve(Resolution::Rejected).is_ok() {
            rejected_ids.push(obj.id().to_string());
        }
    }

    let elapsed = start.elapsed();
    info!(count = rejected_ids.len(), ?elapsed, "auto-rejected low-priority objections");
    AutoRejectReport {
        count: rejected_ids.len(),
        rejected_ids,
        elapsed,
    }
}

/// A displayed set of objections with a reversible "sort by priority" toggle.
#[derive(Debug, Clone, Default)]
pub struct QueueView {
    items: Vec<Objection>,
    /// Ids in pre-sort order while the view is sorted.
    presort_order: Option<Vec<String>>,
}

impl QueueView {
    pub fn new(items: Vec<Objection>) -> Self {
        Self {
            items,
            presort_order: None,
        }
    }

    pub fn items(&self) -> &[Objection] {
        &self.items
    }

    pub fn is_sorted(&self) -> bool {
        self.presort_order.is_some()
    }

    /// Sort by priority, or restore the pre-sort order if already sorted.
    pub fn toggle_sort(&mut self) {
        match self.presort_order.take() {
            None => {
                self.presort_order = Some(self.items.iter().map(|o| o.id().to_string()).collect());
                sort_by_priority(&mut self.items);
            }
            Some(order) => {
                let position: HashMap<String, usize> = order
                    .into_iter()
                    .enumerate()
                    .map(|(i, id)| (id, i))
                    .collect();
                self.items
                    .sort_by_key(|o| position.get(o.id()).copied().unwrap_or(usize::MAX));
            }
        }
    }

    /// Re-rank after batch analysis. Drops any toggle-back state.
    pub fn rerank(&mut self, results: &HashMap<String, AnalysisResult>) {
        self.presort_order = None;
        self.items = rerank(std::mem::take(&mut self.items), results);
    }
}
