use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum StudyStatus {
    Opened,
    Closed,
}

impl std::fmt::Display for StudyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StudyStatus::Opened => "OPENED",
            StudyStatus::Closed => "CLOSED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Study {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Leader user id. A study can be leaderless after its leader quits.
    pub leader: Option<String>,
    pub status: StudyStatus,
    pub created_at: DateTime<Utc>,
}

impl Study {
    pub fn is_led_by(&self, user_id: &str) -> bool {
        self.leader.as_deref() == Some(user_id)
    }
}

/// Partial update applied by the study leader or an admin.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct StudyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<StudyStatus>,
}
