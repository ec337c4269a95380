use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::artists::domain::{ArtistFields, ArtistId};
use crate::artists::repository::ArtistRepository;
use crate::backend::RepositoryError;
use crate::fields::{char_len, optional_text};
use crate::slug::slugify;

use super::domain::{Review, SubmissionId, SubmissionRecord, SubmissionStatus};
use super::guard::{IntakeViolation, SubmissionGuard};
use super::journal::{PendingPromotion, PromotionJournal};
use super::repository::SubmissionRepository;

/// Longest admin note accepted on a review.
pub const MAX_NOTES_CHARS: usize = 2000;

/// Store write that failed during a moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromotionStep {
    SubmissionFetch,
    ArtistInsert,
    SubmissionUpdate,
}

impl PromotionStep {
    pub const fn label(self) -> &'static str {
        match self {
            PromotionStep::SubmissionFetch => "submission-fetch",
            PromotionStep::ArtistInsert => "artist-insert",
            PromotionStep::SubmissionUpdate => "submission-update",
        }
    }
}

impl fmt::Display for PromotionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("submission {0} not found")]
    UnknownSubmission(SubmissionId),
    #[error("admin notes exceed {max} characters (found {found})")]
    NotesTooLong { max: usize, found: usize },
    #[error("submission no longer passes intake rules: {0}")]
    Intake(#[from] IntakeViolation),
    #[error("name '{name}' produces an empty slug")]
    EmptySlug { name: String },
    #[error("no outstanding promotion for submission {0}")]
    NoPendingPromotion(SubmissionId),
}

/// Error raised by the moderation service.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("submission {id} was already {status}")]
    AlreadyReviewed {
        id: SubmissionId,
        status: SubmissionStatus,
    },
    #[error("{step} failed: {source}")]
    Persistence {
        step: PromotionStep,
        source: RepositoryError,
    },
    #[error("promotion for submission {id} is still recoverable ({status}); reconcile it instead")]
    PromotionRecoverable {
        id: SubmissionId,
        status: SubmissionStatus,
    },
    #[error(
        "artist {artist_id} was created but submission {submission_id} was not marked approved: {source}"
    )]
    InconsistentState {
        artist_id: ArtistId,
        submission_id: SubmissionId,
        source: RepositoryError,
    },
}

/// Result of a successful approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub artist_id: ArtistId,
    pub slug: String,
}

/// Outcome of replaying the promotion journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub resolved: Vec<SubmissionId>,
    pub outstanding: Vec<PendingPromotion>,
}

/// Blank notes are dropped; oversized notes are refused.
pub fn normalize_notes(notes: Option<String>) -> Result<Option<String>, ValidationError> {
    let notes = optional_text(notes);
    if let Some(text) = &notes {
        let found = char_len(text);
        if found > MAX_NOTES_CHARS {
            return Err(ValidationError::NotesTooLong {
                max: MAX_NOTES_CHARS,
                found,
            });
        }
    }
    Ok(notes)
}

/// Moderation engine: approves pending submissions into visible artists or
/// rejects them.
pub struct ModerationService<S, A> {
    guard: Arc<SubmissionGuard>,
    submissions: Arc<S>,
    artists: Arc<A>,
    journal: Arc<PromotionJournal>,
}

impl<S, A> ModerationService<S, A>
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    pub fn new(submissions: Arc<S>, artists: Arc<A>) -> Self {
        Self::with_guard(SubmissionGuard::default(), submissions, artists)
    }

    pub fn with_guard(guard: SubmissionGuard, submissions: Arc<S>, artists: Arc<A>) -> Self {
        Self {
            guard: Arc::new(guard),
            submissions,
            artists,
            journal: Arc::new(PromotionJournal::default()),
        }
    }

    pub fn journal(&self) -> &PromotionJournal {
        &self.journal
    }

    /// Submissions newest first, optionally restricted to one status.
    pub fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, ModerationError> {
        self.submissions
            .list(status)
            .map_err(|source| ModerationError::Persistence {
                step: PromotionStep::SubmissionFetch,
                source,
            })
    }

    pub fn get_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord, ModerationError> {
        self.submissions
            .fetch(id)
            .map_err(|source| ModerationError::Persistence {
                step: PromotionStep::SubmissionFetch,
                source,
            })?
            .ok_or_else(|| ValidationError::UnknownSubmission(id.clone()).into())
    }

    fn pending_submission(&self, id: &SubmissionId) -> Result<SubmissionRecord, ModerationError> {
        let submission = self.get_submission(id)?;
        if submission.status.is_terminal() {
            tracing::warn!(
                submission_id = %id,
                status = %submission.status,
                "refusing to review a submission twice"
            );
            return Err(ModerationError::AlreadyReviewed {
                id: id.clone(),
                status: submission.status,
            });
        }
        Ok(submission)
    }

    /// Conditional update matched nothing: report who got there first.
    fn lost_race(&self, id: &SubmissionId) -> ModerationError {
        match self.get_submission(id) {
            Ok(current) => ModerationError::AlreadyReviewed {
                id: id.clone(),
                status: current.status,
            },
            Err(error) => error,
        }
    }

    /// Promote a pending submission to a visible artist.
    ///
    /// The artist insert happens first; a failure there leaves the submission
    /// untouched. A failure marking the submission afterwards is journaled and
    /// surfaced as [`ModerationError::InconsistentState`].
    pub fn approve(
        &self,
        id: &SubmissionId,
        notes: Option<String>,
    ) -> Result<Promotion, ModerationError> {
        let admin_notes = normalize_notes(notes)?;
        let submission = self.pending_submission(id)?;

        self.guard
            .sanitize(submission.as_form())
            .map_err(ValidationError::from)?;

        let slug = slugify(&submission.name);
        if slug.is_empty() {
            return Err(ValidationError::EmptySlug {
                name: submission.name.clone(),
            }
            .into());
        }

        let fields = ArtistFields::from_submission(&submission, slug.clone());
        let artist = self
            .artists
            .insert(fields)
            .map_err(|source| ModerationError::Persistence {
                step: PromotionStep::ArtistInsert,
                source,
            })?;

        let review = Review {
            status: SubmissionStatus::Approved,
            admin_notes,
            reviewed_at: Utc::now(),
        };

        let failure = match self.submissions.mark_reviewed(id, &review) {
            Ok(true) => {
                tracing::info!(submission_id = %id, artist_id = %artist.id, %slug, "submission approved");
                return Ok(Promotion {
                    artist_id: artist.id,
                    slug,
                });
            }
            Ok(false) => RepositoryError::Conflict("submission left pending state".to_string()),
            Err(source) => source,
        };

        tracing::error!(
            submission_id = %id,
            artist_id = %artist.id,
            error = %failure,
            "artist created but submission update failed"
        );
        self.journal.record(PendingPromotion {
            submission_id: id.clone(),
            artist_id: artist.id.clone(),
            review,
            recorded_at: Utc::now(),
            last_error: failure.to_string(),
        });

        Err(ModerationError::InconsistentState {
            artist_id: artist.id,
            submission_id: id.clone(),
            source: failure,
        })
    }

    /// Mark a pending submission as rejected.
    pub fn reject(&self, id: &SubmissionId, notes: Option<String>) -> Result<(), ModerationError> {
        let admin_notes = normalize_notes(notes)?;
        self.pending_submission(id)?;

        let review = Review {
            status: SubmissionStatus::Rejected,
            admin_notes,
            reviewed_at: Utc::now(),
        };

        match self.submissions.mark_reviewed(id, &review) {
            Ok(true) => {
                tracing::info!(submission_id = %id, "submission rejected");
                Ok(())
            }
            Ok(false) => Err(self.lost_race(id)),
            Err(source) => Err(ModerationError::Persistence {
                step: PromotionStep::SubmissionUpdate,
                source,
            }),
        }
    }

    /// Retry the submission update for every journaled promotion.
    pub fn reconcile(&self) -> ReconcileReport {
        let mut resolved = Vec::new();

        for entry in self.journal.outstanding() {
            let id = &entry.submission_id;
            let settled = match self.submissions.mark_reviewed(id, &entry.review) {
                Ok(true) => Ok(()),
                Ok(false) => match self.submissions.fetch(id) {
                    Ok(Some(current)) if current.status == SubmissionStatus::Approved => Ok(()),
                    Ok(Some(current)) => Err(format!("submission is {}", current.status)),
                    Ok(None) => Err("submission no longer exists".to_string()),
                    Err(error) => Err(error.to_string()),
                },
                Err(error) => Err(error.to_string()),
            };

            match settled {
                Ok(()) => {
                    tracing::info!(submission_id = %id, artist_id = %entry.artist_id, "promotion reconciled");
                    self.journal.resolve(id);
                    resolved.push(id.clone());
                }
                Err(reason) => {
                    tracing::warn!(submission_id = %id, artist_id = %entry.artist_id, %reason, "promotion still outstanding");
                    self.journal.note_failure(id, reason);
                }
            }
        }

        ReconcileReport {
            resolved,
            outstanding: self.journal.outstanding(),
        }
    }

    /// Drop a journaled promotion whose submission was settled without it,
    /// typically a reject that won the race against the approval.
    ///
    /// Pending and approved submissions are refused; [`Self::reconcile`]
    /// settles those. The artist row created for the entry is not removed.
    pub fn discard_promotion(
        &self,
        id: &SubmissionId,
    ) -> Result<PendingPromotion, ModerationError> {
        let entry = self
            .journal
            .get(id)
            .ok_or_else(|| ValidationError::NoPendingPromotion(id.clone()))?;

        let current = self
            .submissions
            .fetch(id)
            .map_err(|source| ModerationError::Persistence {
                step: PromotionStep::SubmissionFetch,
                source,
            })?;
        let status = match current.map(|record| record.status) {
            Some(status @ (SubmissionStatus::Pending | SubmissionStatus::Approved)) => {
                return Err(ModerationError::PromotionRecoverable {
                    id: id.clone(),
                    status,
                });
            }
            Some(status) => status.label(),
            None => "missing",
        };

        tracing::error!(
            submission_id = %id,
            artist_id = %entry.artist_id,
            status,
            last_error = %entry.last_error,
            "promotion discarded; artist row has no approved submission"
        );
        Ok(self.journal.resolve(id).unwrap_or(entry))
    }
}
