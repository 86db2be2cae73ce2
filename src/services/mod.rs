//! Business logic services.

pub mod admin_auth;
pub mod case_query;
pub mod dashboard;
pub mod mailer;
pub mod movements;
pub mod storage;
pub mod submission;
pub mod verification;

pub use mailer::{LogMailer, Mailer, OutboundEmail, ResendMailer};
pub use storage::{BlobStore, S3Storage};
