//! Booking and general inquiries from the public contact form.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ContactForm, ContactId, ContactRecord, ContactStatus, NewContactRequest};
pub use repository::ContactRepository;
pub use router::{contact_admin_router, contact_router};
pub use service::{ContactDesk, ContactError};
