pub mod artists;
pub mod auth;
pub mod backend;
pub mod config;
pub mod contacts;
pub mod dashboard;
pub mod error;
mod fields;
mod http;
pub mod media;
pub mod slug;
pub mod submissions;
pub mod telemetry;

pub use slug::slugify;
