use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ActivityLog;

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogList {
    pub items: Vec<ActivityLog>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityStats {
    pub total_activities: i64,
    pub unique_users: i64,
    pub today_activities: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanLogsResult {
    pub deleted: u64,
    pub cutoff: DateTime<Utc>,
}
