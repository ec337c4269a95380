use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artists::domain::ArtistId;

use super::domain::{Review, SubmissionId};

/// Artist row created for a submission whose own status update did not land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingPromotion {
    pub submission_id: SubmissionId,
    pub artist_id: ArtistId,
    pub review: Review,
    pub recorded_at: DateTime<Utc>,
    pub last_error: String,
}

/// Compensation log for half-finished promotions, keyed by submission.
#[derive(Debug, Default)]
pub struct PromotionJournal {
    entries: Mutex<BTreeMap<SubmissionId, PendingPromotion>>,
}

impl PromotionJournal {
    fn entries(&self) -> MutexGuard<'_, BTreeMap<SubmissionId, PendingPromotion>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, entry: PendingPromotion) {
        self.entries().insert(entry.submission_id.clone(), entry);
    }

    pub fn get(&self, submission_id: &SubmissionId) -> Option<PendingPromotion> {
        self.entries().get(submission_id).cloned()
    }

    pub fn resolve(&self, submission_id: &SubmissionId) -> Option<PendingPromotion> {
        self.entries().remove(submission_id)
    }

    /// Refresh the failure message on an entry that is still outstanding.
    pub fn note_failure(&self, submission_id: &SubmissionId, error: String) {
        if let Some(entry) = self.entries().get_mut(submission_id) {
            entry.last_error = error;
        }
    }

    pub fn outstanding(&self) -> Vec<PendingPromotion> {
        self.entries().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
