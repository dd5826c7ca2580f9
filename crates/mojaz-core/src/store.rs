//! The objection collection: an explicit, owned state container.
//!
//! Objections are kept newest-first; priority ordering only ever happens on
//! a [`QueueView`](crate::queue::QueueView) built from the store. Persistence
//! is a single JSON array written by whole-file replacement.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::analysis::{AnalysisResult, Priority};
use crate::error::ObjectionError;
use crate::objection::{NewObjection, Objection, Resolution};
use crate::queue::{self, AutoRejectReport};

/// Default file name for the persisted collection.
pub const DEFAULT_STORE_FILE: &str = "mojaz_objections.json";

const ID_PREFIX: &str = "OBJ-";

/// 9999-12-31T23:59:59.999Z. Larger loaded ids do not seed the id counter.
const MAX_ID_MILLIS: i64 = 253_402_300_799_999;

/// Which processed objections to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionFilter {
    #[default]
    All,
    Approved,
    Rejected,
}

impl ResolutionFilter {
    fn accepts(&self, resolution: Option<Resolution>) -> bool {
        match (self, resolution) {
            (_, None) => false,
            (Self::All, Some(_)) => true,
            (Self::Approved, Some(r)) => r == Resolution::Approved,
            (Self::Rejected, Some(r)) => r == Resolution::Rejected,
        }
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Objections filed on `today` (local calendar day).
    pub total_today: usize,
    pub high_priority: usize,
    pub resolved: usize,
    pub total: usize,
    /// Resolved share, rounded to the nearest percent. Zero when empty.
    pub completion_percent: u8,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectionStore {
    objections: Vec<Objection>,
    /// Millisecond value of the last issued identifier.
    last_id_millis: i64,
}

impl ObjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objections(objections: Vec<Objection>) -> Self {
        let last_id_millis = objections
            .iter()
            .filter_map(|o| id_millis(o.id()))
            .filter(|m| (0..=MAX_ID_MILLIS).contains(m))
            .max()
            .unwrap_or(0);
        Self {
            objections,
            last_id_millis,
        }
    }

    pub fn objections(&self) -> &[Objection] {
        &self.objections
    }

    pub fn iter(&self) -> impl Iterator<Item = &Objection> {
        self.objections.iter()
    }

    pub fn len(&self) -> usize {
        self.objections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objections.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Objection> {
        self.objections.iter().find(|o| o.id() == id)
    }

    /// Record a classified submission at the front of the collection.
    pub fn submit(
        &mut self,
        submission: NewObjection,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> &Objection {
        let millis = now.timestamp_millis().max(self.last_id_millis.saturating_add(1));
        self.last_id_millis = millis;
        let objection = Objection::new(format!("{ID_PREFIX}{millis}"), submission, priority, now);
        info!(
            id = objection.id(),
            priority = %objection.priority(),
            violation = objection.violation_type().slug(),
            "objection submitted"
        );
        self.objections.insert(0, objection);
        &self.objections[0]
    }

    /// Apply a staff decision.
    pub fn resolve(&mut self, id: &str, resolution: Resolution) -> Result<(), ObjectionError> {
        let obj = self
            .objections
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or_else(|| ObjectionError::NotFound(id.to_string()))?;
        obj.resolve(resolution)?;
        info!(id, resolution = resolution.as_str(), "objection resolved");
        Ok(())
    }

    pub fn auto_reject(&mut self) -> AutoRejectReport {
        queue::auto_reject(&mut self.objections)
    }

    /// Overwrite priorities from batch analysis results. Arrival order is kept.
    ///
    /// Returns the number of objections whose tier changed.
    pub fn apply_analysis(&mut self, results: &HashMap<String, AnalysisResult>) -> usize {
        let changed = queue::apply_priorities(&mut self.objections, results);
        info!(analysed = results.len(), changed, "batch priorities applied");
        changed
    }

    pub fn pending(&self) -> Vec<&Objection> {
        self.objections.iter().filter(|o| o.is_pending()).collect()
    }

    pub fn processed(&self, filter: ResolutionFilter) -> Vec<&Objection> {
        self.objections
            .iter()
            .filter(|o| filter.accepts(o.resolution()))
            .collect()
    }

    pub fn stats(&self, today: NaiveDate) -> QueueStats {
        let total = self.objections.len();
        let total_today = self
            .objections
            .iter()
            .filter(|o| o.timestamp().with_timezone(&Local).date_naive() == today)
            .count();
        let high_priority = self
            .objections
            .iter()
            .filter(|o| o.priority() == Priority::High)
            .count();
        let resolved = self.objections.iter().filter(|o| !o.is_pending()).count();
        let completion_percent = if total == 0 {
            0
        } else {
            (resolved as f64 / total as f64 * 100.0).round() as u8
        };

        QueueStats {
            total_today,
            high_priority,
            resolved,
            total,
            completion_percent,
        }
    }

    /// Empty the whole collection.
    pub fn clear(&mut self) {
        info!(removed = self.objections.len(), "objection store cleared");
        self.objections.clear();
    }

    pub fn to_json(&self) -> Result<String, ObjectionError> {
        Ok(serde_json::to_string_pretty(&self.objections)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ObjectionError> {
        let objections: Vec<Objection> = serde_json::from_str(json)?;
        Ok(Self::from_objections(objections))
    }

    /// Load from `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, ObjectionError> {
        if !path.exists() {
            debug!(path = %path.display(), "no store file, starting empty");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        debug!(path = %path.display(), count = store.len(), "loaded objections");
        Ok(store)
    }

    /// Write to a temporary file next to `path`, then rename it into place.
    pub fn save(&self, path: &Path) -> Result<(), ObjectionError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.to_json()?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), count = self.len(), "saved objections");
        Ok(())
    }
}

fn id_millis(id: &str) -> Option<i64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}
