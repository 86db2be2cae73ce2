//! Workflow test suite.
//!
//! Drives the submission, lookup and administrator flows against an
//! in-memory SQLite database with in-process blob store and mailer fakes.
//!
//! Run with: cargo test --test workflow

mod test_helpers;

mod test_admin;
mod test_health;
mod test_movements;
mod test_submission;
