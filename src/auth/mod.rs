//! Administrator session authentication.

mod extractor;

pub use extractor::{session_token, AdminAuth};
