use crate::core::errors::StudyHubError;
use crate::core::models::{audit::StudyAudit, membership::Membership, study::Study, user::User};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use bcrypt::hash;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

// Lock order is studies before memberships wherever both are taken.
#[derive(Clone)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    users_by_email: Arc<RwLock<HashMap<String, User>>>,
    studies: Arc<RwLock<HashMap<String, Study>>>,
    // Keyed by study id, rows kept in join order.
    memberships: Arc<RwLock<HashMap<String, Vec<Membership>>>>,
    study_audits: Arc<RwLock<HashMap<String, Vec<StudyAudit>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Arc::new(RwLock::new(HashMap::new())),
            users_by_email: Arc::new(RwLock::new(HashMap::new())),
            studies: Arc::new(RwLock::new(HashMap::new())),
            memberships: Arc::new(RwLock::new(HashMap::new())),
            study_audits: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user_if_not_exists(&self, user: User) -> Result<Option<User>, StudyHubError> {
        let mut users_by_email = self.users_by_email.write().await;
        if users_by_email.contains_key(&user.email) {
            return Ok(None);
        }
        let hashed_user = User {
            password: hash(&user.password, bcrypt::DEFAULT_COST)
                .map_err(|e| StudyHubError::InternalServerError(format!("Password hashing error: {}", e)))?,
            ..user
        };
        users_by_email.insert(hashed_user.email.clone(), hashed_user.clone());
        let mut users = self.users.write().await;
        users.insert(hashed_user.id.clone(), hashed_user.clone());
        Ok(Some(hashed_user))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StudyHubError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StudyHubError> {
        let users_by_email = self.users_by_email.read().await;
        Ok(users_by_email.get(email).cloned())
    }

    async fn create_study(&self, study: Study, leader_membership: Membership) -> Result<(), StudyHubError> {
        let mut studies = self.studies.write().await;
        let mut memberships = self.memberships.write().await;
        memberships
            .entry(study.id.clone())
            .or_default()
            .push(leader_membership);
        studies.insert(study.id.clone(), study);
        Ok(())
    }

    async fn save_study(&self, study: Study) -> Result<(), StudyHubError> {
        let mut studies = self.studies.write().await;
        studies.insert(study.id.clone(), study);
        Ok(())
    }

    async fn get_study(&self, study_id: &str) -> Result<Option<Study>, StudyHubError> {
        let studies = self.studies.read().await;
        Ok(studies.get(study_id).cloned())
    }

    async fn list_studies(&self) -> Result<Vec<Study>, StudyHubError> {
        let studies = self.studies.read().await;
        let mut all: Vec<Study> = studies.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn delete_study(&self, study_id: &str) -> Result<(), StudyHubError> {
        let mut studies = self.studies.write().await;
        if studies.remove(study_id).is_some() {
            let mut memberships = self.memberships.write().await;
            memberships.remove(study_id);
            let mut study_audits = self.study_audits.write().await;
            study_audits.remove(study_id);
        }
        Ok(())
    }

    async fn add_member(&self, membership: Membership) -> Result<bool, StudyHubError> {
        let mut memberships = self.memberships.write().await;
        let rows = memberships.entry(membership.study_id.clone()).or_default();
        if rows.iter().any(|m| m.user_id == membership.user_id) {
            return Ok(false);
        }
        rows.push(membership);
        Ok(true)
    }

    async fn get_membership(&self, study_id: &str, user_id: &str) -> Result<Option<Membership>, StudyHubError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .get(study_id)
            .and_then(|rows| rows.iter().find(|m| m.user_id == user_id))
            .cloned())
    }

    async fn get_memberships(&self, study_id: &str) -> Result<Vec<Membership>, StudyHubError> {
        let memberships = self.memberships.read().await;
        Ok(memberships.get(study_id).cloned().unwrap_or_default())
    }

    async fn set_approval(
        &self,
        study_id: &str,
        user_id: &str,
        approved: bool,
    ) -> Result<Option<Membership>, StudyHubError> {
        let mut memberships = self.memberships.write().await;
        let row = memberships
            .get_mut(study_id)
            .and_then(|rows| rows.iter_mut().find(|m| m.user_id == user_id));
        Ok(row.map(|m| {
            m.is_approve = approved;
            m.clone()
        }))
    }

    async fn remove_member(&self, study_id: &str, user_id: &str) -> Result<bool, StudyHubError> {
        let mut memberships = self.memberships.write().await;
        match memberships.get_mut(study_id) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|m| m.user_id != user_id);
                Ok(rows.len() < before)
            }
            None => Ok(false),
        }
    }

    async fn quit_study(&self, study_id: &str, user_id: &str) -> Result<Option<(Study, bool)>, StudyHubError> {
        let mut studies = self.studies.write().await;
        let mut memberships = self.memberships.write().await;
        let Some(study) = studies.get_mut(study_id) else {
            return Ok(None);
        };
        let removed = match memberships.get_mut(study_id) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|m| m.user_id != user_id);
                rows.len() < before
            }
            None => false,
        };
        if removed && study.is_led_by(user_id) {
            study.leader = None;
        }
        Ok(Some((study.clone(), removed)))
    }

    async fn transfer_leadership(&self, study_id: &str, user_id: &str) -> Result<Option<Study>, StudyHubError> {
        let mut studies = self.studies.write().await;
        let mut memberships = self.memberships.write().await;
        let Some(study) = studies.get_mut(study_id) else {
            return Ok(None);
        };
        let rows = memberships.entry(study_id.to_string()).or_default();
        if !rows.iter().any(|m| m.user_id == user_id) {
            rows.push(Membership::pending(study_id, user_id));
        }
        study.leader = Some(user_id.to_string());
        Ok(Some(study.clone()))
    }

    async fn save_study_audit(&self, audit: StudyAudit) -> Result<(), StudyHubError> {
        let mut study_audits = self.study_audits.write().await;
        study_audits.entry(audit.study_id.clone()).or_default().push(audit);
        Ok(())
    }

    async fn get_study_audits(&self, study_id: &str) -> Result<Vec<StudyAudit>, StudyHubError> {
        let study_audits = self.study_audits.read().await;
        Ok(study_audits.get(study_id).cloned().unwrap_or_default())
    }
}
