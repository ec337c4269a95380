use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artists::domain::Category;

/// Identifier wrapper for artist submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moderation status of a submission. Only `Pending` accepts a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw self-service application as posted by the public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub profile_image: String,
    pub category: Category,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub spotify: Option<String>,
}

/// Sanitized submission ready to be written with `pending` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub profile_image: String,
    pub category: Category,
    pub city: String,
    pub state: String,
    pub experience_years: Option<u8>,
    pub genres: Vec<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub spotify: Option<String>,
}

/// Stored submission row, including moderation audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub profile_image: String,
    pub category: Category,
    pub city: String,
    pub state: String,
    pub experience_years: Option<u8>,
    #[serde(default, deserialize_with = "crate::artists::domain::nullable_list")]
    pub genres: Vec<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub spotify: Option<String>,
    pub status: SubmissionStatus,
    pub admin_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Rebuild the form view of a stored row so intake rules can be re-applied.
    pub fn as_form(&self) -> SubmissionForm {
        SubmissionForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            bio: self.bio.clone(),
            profile_image: self.profile_image.clone(),
            category: self.category,
            city: self.city.clone(),
            state: self.state.clone(),
            experience_years: self.experience_years.map(i64::from),
            genres: self.genres.clone(),
            instagram: self.instagram.clone(),
            youtube: self.youtube.clone(),
            spotify: self.spotify.clone(),
        }
    }
}

/// Patch applied when a submission leaves `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub status: SubmissionStatus,
    pub admin_notes: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}
