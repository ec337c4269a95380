//! Artist self-service submissions: public intake and the admin moderation
//! state machine that promotes approved applicants to the casting roster.

pub mod domain;
pub(crate) mod guard;
pub mod intake;
pub mod journal;
pub mod moderation;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    NewSubmission, Review, SubmissionForm, SubmissionId, SubmissionRecord, SubmissionStatus,
};
pub use guard::{IntakeLimits, IntakeViolation, SubmissionGuard};
pub use intake::{IntakeError, SubmissionIntake};
pub use journal::{PendingPromotion, PromotionJournal};
pub use moderation::{
    ModerationError, ModerationService, Promotion, PromotionStep, ReconcileReport,
    ValidationError, MAX_NOTES_CHARS,
};
pub use repository::SubmissionRepository;
pub use router::{intake_router, moderation_router};
