use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Relation row between a study and a user. One row per (study, user) pair.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Membership {
    pub study_id: String,
    pub user_id: String,
    /// False while the member waits for leader approval.
    pub is_approve: bool,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn pending(study_id: &str, user_id: &str) -> Self {
        Membership {
            study_id: study_id.to_string(),
            user_id: user_id.to_string(),
            is_approve: false,
            joined_at: Utc::now(),
        }
    }

    pub fn approved(study_id: &str, user_id: &str) -> Self {
        Membership {
            is_approve: true,
            ..Membership::pending(study_id, user_id)
        }
    }
}
