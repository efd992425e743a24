use crate::core::errors::StudyHubError;
use crate::core::models::{audit::StudyAudit, membership::Membership, study::Study, user::User};
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Ok(None) when the email is already registered.
    async fn create_user_if_not_exists(&self, user: User) -> Result<Option<User>, StudyHubError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StudyHubError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StudyHubError>;

    /// Atomic create: inserts the study row and the creator's relation row
    /// together.
    async fn create_study(&self, study: Study, leader_membership: Membership) -> Result<(), StudyHubError>;
    async fn save_study(&self, study: Study) -> Result<(), StudyHubError>;
    async fn get_study(&self, study_id: &str) -> Result<Option<Study>, StudyHubError>;
    async fn list_studies(&self) -> Result<Vec<Study>, StudyHubError>;
    /// Cascades: memberships and audits of the study go with it.
    async fn delete_study(&self, study_id: &str) -> Result<(), StudyHubError>;

    /// Insert-if-absent. Ok(false) when a relation row for the
    /// (study, user) pair already exists; duplicate check and insert run
    /// under one write lock so concurrent joins cannot both succeed.
    async fn add_member(&self, membership: Membership) -> Result<bool, StudyHubError>;
    async fn get_membership(&self, study_id: &str, user_id: &str) -> Result<Option<Membership>, StudyHubError>;
    /// All relation rows of a study, in join order.
    async fn get_memberships(&self, study_id: &str) -> Result<Vec<Membership>, StudyHubError>;
    /// Ok(None) when no relation row exists for the pair.
    async fn set_approval(
        &self,
        study_id: &str,
        user_id: &str,
        approved: bool,
    ) -> Result<Option<Membership>, StudyHubError>;
    /// Ok(false) when no relation row existed.
    async fn remove_member(&self, study_id: &str, user_id: &str) -> Result<bool, StudyHubError>;

    /// Atomic quit: removes the relation row and clears `leader` when the
    /// quitting user holds it. Ok(None) when the study does not exist; the
    /// bool is false when the user had no relation row (nothing changed).
    async fn quit_study(&self, study_id: &str, user_id: &str) -> Result<Option<(Study, bool)>, StudyHubError>;

    /// Atomic leader transfer: creates a pending relation row when the user
    /// has none, then reassigns `leader`. Ok(None) when the study does not
    /// exist.
    async fn transfer_leadership(&self, study_id: &str, user_id: &str) -> Result<Option<Study>, StudyHubError>;

    async fn save_study_audit(&self, audit: StudyAudit) -> Result<(), StudyHubError>;
    async fn get_study_audits(&self, study_id: &str) -> Result<Vec<StudyAudit>, StudyHubError>;
}

pub mod in_memory;
