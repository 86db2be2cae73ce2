//! SeaORM entity definitions.

pub mod administrator;
pub mod attachment;
pub mod case_file;
pub mod case_sequence;
pub mod external_user;
pub mod movement;
