use std::sync::Arc;

use crate::backend::RepositoryError;
use crate::fields::{char_len, is_plausible_email, optional_text};

use super::domain::{ContactForm, ContactId, ContactRecord, ContactStatus, NewContactRequest};
use super::repository::ContactRepository;

const MAX_NOTES_CHARS: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("admin notes exceed {max} characters")]
    NotesTooLong { max: usize },
    #[error("contact request {0} not found")]
    NotFound(ContactId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn required(field: &'static str, value: String) -> Result<String, ContactError> {
    optional_text(Some(value)).ok_or(ContactError::MissingField(field))
}

/// Inbound booking inquiries and their follow-up.
pub struct ContactDesk<C> {
    contacts: Arc<C>,
}

impl<C> ContactDesk<C>
where
    C: ContactRepository + 'static,
{
    pub fn new(contacts: Arc<C>) -> Self {
        Self { contacts }
    }

    pub fn submit(&self, form: ContactForm) -> Result<ContactRecord, ContactError> {
        let name = required("name", form.name)?;
        let email = required("email", form.email)?;
        if !is_plausible_email(&email) {
            return Err(ContactError::InvalidEmail);
        }
        let message = required("message", form.message)?;

        let stored = self.contacts.insert(NewContactRequest {
            name,
            company: optional_text(form.company),
            email,
            phone: optional_text(form.phone),
            event_type: optional_text(form.event_type),
            event_date: form.event_date,
            message,
        })?;
        tracing::info!(contact_id = %stored.id, "contact request received");
        Ok(stored)
    }

    pub fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactRecord>, ContactError> {
        Ok(self.contacts.list(status)?)
    }

    fn not_found_as(id: &ContactId) -> impl FnOnce(RepositoryError) -> ContactError + '_ {
        move |error| match error {
            RepositoryError::NotFound => ContactError::NotFound(id.clone()),
            other => ContactError::Repository(other),
        }
    }

    /// Any status may follow any other.
    pub fn update_status(&self, id: &ContactId, status: ContactStatus) -> Result<(), ContactError> {
        self.contacts
            .update_status(id, status)
            .map_err(Self::not_found_as(id))?;
        tracing::info!(contact_id = %id, status = status.label(), "contact status updated");
        Ok(())
    }

    pub fn save_notes(&self, id: &ContactId, notes: Option<String>) -> Result<(), ContactError> {
        let notes = optional_text(notes);
        if notes.as_deref().is_some_and(|text| char_len(text) > MAX_NOTES_CHARS) {
            return Err(ContactError::NotesTooLong {
                max: MAX_NOTES_CHARS,
            });
        }
        self.contacts
            .update_notes(id, notes)
            .map_err(Self::not_found_as(id))
    }
}
