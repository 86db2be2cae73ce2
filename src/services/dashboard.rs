//! Administrator dashboard statistics.

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{DashboardResponse, StatusCount};
use crate::services::case_query;

/// Number of cases listed under "recent".
pub const RECENT_CASES: u64 = 10;

pub async fn overview(pool: &DbPool) -> AppResult<DashboardResponse> {
    let total_cases = pool.count_cases().await?;
    let cases_by_status = pool
        .count_cases_by_status()
        .await?
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.as_str().to_string(),
            count,
        })
        .collect();
    let total_external_users = pool.count_external_users().await?;
    let recent_cases = pool
        .recent_cases(RECENT_CASES)
        .await?
        .into_iter()
        .map(|row| case_query::summarize(row, false))
        .collect();

    Ok(DashboardResponse {
        total_cases,
        cases_by_status,
        total_external_users,
        recent_cases,
    })
}
