//! Human-readable case numbers (`EXP-<YEAR>-<SEQ>`).

use std::fmt;

use crate::error::{AppError, AppResult};

/// Fixed prefix of every case number.
pub const CASE_NUMBER_PREFIX: &str = "EXP";

/// A case number such as `EXP-2025-0001`.
///
/// The sequence is zero-padded to four digits and keeps growing past 9999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseNumber {
    year: i32,
    sequence: u32,
}

impl CaseNumber {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// Parse user input. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(input: &str) -> AppResult<Self> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "Ingrese el número de expediente".to_string(),
            ));
        }

        let invalid = || {
            AppError::Validation(format!(
                "Número de expediente inválido: se espera el formato {}-AAAA-NNNN",
                CASE_NUMBER_PREFIX
            ))
        };

        let mut parts = normalized.splitn(3, '-');
        let (Some(prefix), Some(year), Some(sequence)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if prefix != CASE_NUMBER_PREFIX
            || year.len() != 4
            || !year.bytes().all(|b| b.is_ascii_digit())
            || sequence.len() < 4
            || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let sequence = sequence.parse::<u32>().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }

        Ok(Self { year, sequence })
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{:04}",
            CASE_NUMBER_PREFIX, self.year, self.sequence
        )
    }
}
