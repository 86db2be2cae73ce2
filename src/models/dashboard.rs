//! Administrator dashboard statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::case_file::CaseSummary;

/// Number of cases in one status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Dashboard payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub total_cases: u64,
    /// One entry per status, zero counts included
    pub cases_by_status: Vec<StatusCount>,
    pub total_external_users: u64,
    pub recent_cases: Vec<CaseSummary>,
}
