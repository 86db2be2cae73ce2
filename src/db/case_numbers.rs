//! Per-year case number allocation.

use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::ConnectionTrait;

use crate::entity::case_sequence;
use crate::error::{AppError, AppResult};
use crate::models::CaseNumber;

/// Allocate the next case number for `year`.
///
/// A single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING` bumps the counter,
/// so two callers can never observe the same value. Run it inside the
/// transaction that inserts the case: a rollback returns the number.
pub async fn allocate<C: ConnectionTrait>(conn: &C, year: i32) -> AppResult<CaseNumber> {
    let insert = Query::insert()
        .into_table(case_sequence::Entity)
        .columns([
            case_sequence::Column::Year,
            case_sequence::Column::LastValue,
        ])
        .values_panic([year.into(), 1i64.into()])
        .on_conflict(
            OnConflict::column(case_sequence::Column::Year)
                .value(
                    case_sequence::Column::LastValue,
                    Expr::cust("case_sequences.last_value + 1"),
                )
                .to_owned(),
        )
        .returning_col(case_sequence::Column::LastValue)
        .to_owned();

    let statement = conn.get_database_backend().build(&insert);
    let row = conn
        .query_one_raw(statement)
        .await
        .map_err(|e| AppError::Database(format!("Failed to allocate case number: {}", e)))?
        .ok_or_else(|| AppError::Database("Case sequence returned no row".to_string()))?;

    let value: i64 = row
        .try_get("", "last_value")
        .map_err(|e| AppError::Database(format!("Failed to read case sequence: {}", e)))?;
    let sequence = u32::try_from(value)
        .map_err(|_| AppError::Database(format!("Case sequence out of range: {}", value)))?;

    Ok(CaseNumber::new(year, sequence))
}
