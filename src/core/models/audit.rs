use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppLog {
    pub id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StudyAudit {
    pub id: String,
    pub study_id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
