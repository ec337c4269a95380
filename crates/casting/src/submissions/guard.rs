use crate::fields::{char_len, is_known_state, is_plausible_email, normalize_genres, optional_text};

use super::domain::{NewSubmission, SubmissionForm};

/// Validation errors raised by the submission guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{field} must be between {min} and {max} characters (found {found})")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("unknown state code '{0}'")]
    UnknownState(String),
    #[error("experience_years must be between 0 and {max} (found {found})")]
    ExperienceOutOfRange { max: u8, found: i64 },
    #[error("at least one genre is required")]
    MissingGenres,
    #[error("profile image is required")]
    MissingProfileImage,
}

/// Bounds applied to each field, in characters.
#[derive(Debug, Clone)]
pub struct IntakeLimits {
    pub name: (usize, usize),
    pub email_max: usize,
    pub phone: (usize, usize),
    pub bio: (usize, usize),
    pub city: (usize, usize),
    pub experience_max: u8,
    pub instagram_max: usize,
    pub youtube_max: usize,
    pub spotify_max: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            name: (3, 100),
            email_max: 255,
            phone: (10, 20),
            bio: (50, 1000),
            city: (2, 100),
            experience_max: 50,
            instagram_max: 100,
            youtube_max: 255,
            spotify_max: 255,
        }
    }
}

/// Guard responsible for producing `NewSubmission` instances.
///
/// Intake and moderation share one guard so an approved row always satisfies
/// the rules it was accepted under.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    limits: IntakeLimits,
}

fn bounded(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<String, IntakeViolation> {
    let trimmed = value.trim();
    let found = char_len(trimmed);
    if found < min || found > max {
        return Err(IntakeViolation::Length {
            field,
            min,
            max,
            found,
        });
    }
    Ok(trimmed.to_string())
}

fn bounded_optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, IntakeViolation> {
    optional_text(value)
        .map(|text| bounded(field, &text, (1, max)))
        .transpose()
}

impl SubmissionGuard {
    pub fn with_limits(limits: IntakeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    /// Convert an inbound form into a sanitized submission.
    pub fn sanitize(&self, form: SubmissionForm) -> Result<NewSubmission, IntakeViolation> {
        let limits = &self.limits;

        let name = bounded("name", &form.name, limits.name)?;

        let email = form.email.trim().to_string();
        if char_len(&email) > limits.email_max || !is_plausible_email(&email) {
            return Err(IntakeViolation::InvalidEmail);
        }

        let phone = bounded("phone", &form.phone, limits.phone)?;
        let bio = bounded("bio", &form.bio, limits.bio)?;

        let profile_image = form.profile_image.trim().to_string();
        if profile_image.is_empty() {
            return Err(IntakeViolation::MissingProfileImage);
        }

        let city = bounded("city", &form.city, limits.city)?;

        let state = form.state.trim().to_ascii_uppercase();
        if !is_known_state(&state) {
            return Err(IntakeViolation::UnknownState(form.state.trim().to_string()));
        }

        let experience_years = match form.experience_years {
            None => None,
            Some(years) if (0..=i64::from(limits.experience_max)).contains(&years) => {
                u8::try_from(years).ok()
            }
            Some(found) => {
                return Err(IntakeViolation::ExperienceOutOfRange {
                    max: limits.experience_max,
                    found,
                })
            }
        };

        let genres = normalize_genres(form.genres);
        if genres.is_empty() {
            return Err(IntakeViolation::MissingGenres);
        }

        Ok(NewSubmission {
            name,
            email,
            phone,
            bio,
            profile_image,
            category: form.category,
            city,
            state,
            experience_years,
            genres,
            instagram: bounded_optional("instagram", form.instagram, limits.instagram_max)?,
            youtube: bounded_optional("youtube", form.youtube, limits.youtube_max)?,
            spotify: bounded_optional("spotify", form.spotify, limits.spotify_max)?,
        })
    }
}
