use crate::auth::jwt::{Claims, JwtService};
use crate::core::errors::StudyHubError;
use crate::core::models::{
    audit::{AppLog, StudyAudit},
    membership::Membership,
    study::{Study, StudyPatch, StudyStatus},
    user::{Actor, User},
};
use crate::core::permissions::is_study_manager;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

pub const USER_ADDED: &str = "USER_ADDED";
pub const STUDY_CREATED: &str = "STUDY_CREATED";
pub const STUDY_UPDATED: &str = "STUDY_UPDATED";
pub const STUDY_DELETED: &str = "STUDY_DELETED";
pub const MEMBER_JOINED: &str = "MEMBER_JOINED";
pub const MEMBER_APPROVED: &str = "MEMBER_APPROVED";
pub const MEMBER_REJECTED: &str = "MEMBER_REJECTED";
pub const MEMBER_QUIT: &str = "MEMBER_QUIT";
pub const LEADER_CHANGED: &str = "LEADER_CHANGED";

pub struct StudyService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    jwt_service: JwtService,
}

impl<L: LoggingService, S: Storage> StudyService<L, S> {
    pub fn new(storage: S, logging: L, jwt_secret: String) -> Self {
        StudyService {
            storage,
            logging,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, StudyHubError> {
        self.jwt_service.validate_token(token)
    }

    /// Object-level permission gate: leader of the study or admin.
    async fn validate_study_manager(&self, study_id: &str, actor: &Actor) -> Result<Study, StudyHubError> {
        let study = self
            .storage
            .get_study(study_id)
            .await?
            .ok_or_else(|| StudyHubError::StudyNotFound(study_id.to_string()))?;
        if !is_study_manager(&study, actor) {
            return Err(StudyHubError::NotStudyManager(actor.id.clone()));
        }
        Ok(study)
    }

    async fn log_and_audit(
        &self,
        study_id: Option<&str>,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), StudyHubError> {
        self.logging.log_action(action, details.clone(), user_id).await?;
        if let Some(sid) = study_id {
            self.storage
                .save_study_audit(StudyAudit {
                    id: Uuid::new_v4().to_string(),
                    study_id: sid.to_string(),
                    action: action.to_string(),
                    user_id: user_id.map(String::from),
                    details,
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), StudyHubError> {
        if value.trim().is_empty() {
            return Err(StudyHubError::InvalidInput(
                field.to_string(),
                format!("{} cannot be empty", field),
            ));
        }
        if value.len() > max_length {
            return Err(StudyHubError::InvalidInput(
                field.to_string(),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(StudyHubError::InvalidInput(
                field.to_string(),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, StudyHubError> {
        let user = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or(StudyHubError::InvalidCredentials)?;

        if bcrypt::verify(password, &user.password)
            .map_err(|e| StudyHubError::InternalServerError(format!("Password verification error: {}", e)))?
        {
            self.jwt_service.generate_token(&user.id, &user.role.to_string())
        } else {
            Err(StudyHubError::InvalidCredentials)
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, StudyHubError> {
        self.storage.get_user(user_id).await
    }

    pub async fn add_user(&self, user: User) -> Result<User, StudyHubError> {
        if user.email.is_empty() {
            return Err(StudyHubError::MissingEmail);
        }
        if !user.email.contains('@') || !user.email.contains('.') || user.email.len() < 5 {
            return Err(StudyHubError::InvalidEmail(user.email.clone()));
        }
        if user.password.is_empty() {
            return Err(StudyHubError::InvalidInput(
                "password".to_string(),
                "Password cannot be empty".to_string(),
            ));
        }
        self.validate_string_input("name", &user.name, 100)?;

        let new_user = self
            .storage
            .create_user_if_not_exists(user.clone())
            .await?
            .ok_or(StudyHubError::EmailAlreadyRegistered(user.email.clone()))?;

        self.log_and_audit(
            None,
            USER_ADDED,
            json!({ "user_id": new_user.id, "name": new_user.name, "email": new_user.email }),
            Some(new_user.id.as_str()),
        )
        .await?;
        Ok(new_user)
    }

    pub async fn list_studies(&self) -> Result<Vec<Study>, StudyHubError> {
        self.storage.list_studies().await
    }

    pub async fn get_study(&self, study_id: &str) -> Result<Option<Study>, StudyHubError> {
        self.storage.get_study(study_id).await
    }

    /// Relation rows of a study, join order. Open read: used to serialize
    /// the member list of responses.
    pub async fn get_study_members(&self, study_id: &str) -> Result<Vec<Membership>, StudyHubError> {
        self.storage.get_memberships(study_id).await
    }

    /// The creator becomes leader and an approved member in one storage
    /// operation.
    pub async fn create_study(
        &self,
        title: String,
        description: String,
        created_by: &Actor,
    ) -> Result<Study, StudyHubError> {
        self.validate_string_input("title", &title, 100)?;
        if !description.is_empty() {
            self.validate_string_input("description", &description, 1000)?;
        }
        self.storage
            .get_user(&created_by.id)
            .await?
            .ok_or_else(|| StudyHubError::UserNotFound(created_by.id.clone()))?;

        let study = Study {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            leader: Some(created_by.id.clone()),
            status: StudyStatus::Opened,
            created_at: Utc::now(),
        };
        self.storage
            .create_study(study.clone(), Membership::approved(&study.id, &created_by.id))
            .await?;

        self.log_and_audit(
            Some(&study.id),
            STUDY_CREATED,
            json!({ "study_id": study.id, "title": study.title, "leader": created_by.id }),
            Some(created_by.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    pub async fn update_study(
        &self,
        study_id: &str,
        patch: StudyPatch,
        updated_by: &Actor,
    ) -> Result<Study, StudyHubError> {
        let mut study = self.validate_study_manager(study_id, updated_by).await?;

        if let Some(title) = patch.title {
            self.validate_string_input("title", &title, 100)?;
            study.title = title;
        }
        if let Some(description) = patch.description {
            if !description.is_empty() {
                self.validate_string_input("description", &description, 1000)?;
            }
            study.description = description;
        }
        if let Some(status) = patch.status {
            study.status = status;
        }
        self.storage.save_study(study.clone()).await?;

        self.log_and_audit(
            Some(study_id),
            STUDY_UPDATED,
            json!({ "study_id": study_id, "title": study.title, "status": study.status.to_string() }),
            Some(updated_by.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    pub async fn delete_study(&self, study_id: &str, deleted_by: &Actor) -> Result<(), StudyHubError> {
        let study = self.validate_study_manager(study_id, deleted_by).await?;
        self.storage.delete_study(study_id).await?;

        self.log_and_audit(
            None,
            STUDY_DELETED,
            json!({ "study_id": study_id, "title": study.title }),
            Some(deleted_by.id.as_str()),
        )
        .await?;
        Ok(())
    }

    /// Creates a pending relation row. The study must be open and the user
    /// must not already hold a row of any approval state. The duplicate
    /// check lives inside the store's insert, so racing joins cannot both
    /// succeed.
    pub async fn join_study(&self, study_id: &str, user: &Actor) -> Result<Study, StudyHubError> {
        let study = self
            .storage
            .get_study(study_id)
            .await?
            .ok_or_else(|| StudyHubError::StudyNotFound(study_id.to_string()))?;
        if study.status != StudyStatus::Opened {
            return Err(StudyHubError::StudyNotOpen(study_id.to_string()));
        }
        if !self.storage.add_member(Membership::pending(study_id, &user.id)).await? {
            return Err(StudyHubError::AlreadyJoined(user.id.clone()));
        }

        self.log_and_audit(
            Some(study_id),
            MEMBER_JOINED,
            json!({ "study_id": study_id, "user_id": user.id }),
            Some(user.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    /// Read-only listing of every relation row, pending and approved, for
    /// the leader/admin approval screen.
    pub async fn list_applicants(&self, study_id: &str, requested_by: &Actor) -> Result<Vec<Membership>, StudyHubError> {
        self.validate_study_manager(study_id, requested_by).await?;
        self.storage.get_memberships(study_id).await
    }

    /// Idempotent: approving an already approved member leaves it approved.
    pub async fn approve_member(
        &self,
        study_id: &str,
        user_id: &str,
        approved_by: &Actor,
    ) -> Result<Membership, StudyHubError> {
        self.validate_study_manager(study_id, approved_by).await?;
        let membership = self
            .storage
            .set_approval(study_id, user_id, true)
            .await?
            .ok_or_else(|| StudyHubError::MembershipNotFound(user_id.to_string()))?;

        self.log_and_audit(
            Some(study_id),
            MEMBER_APPROVED,
            json!({ "study_id": study_id, "user_id": user_id }),
            Some(approved_by.id.as_str()),
        )
        .await?;
        Ok(membership)
    }

    /// Deletes the relation row outright. The leader cannot be rejected;
    /// reassign leadership first or let them quit.
    pub async fn reject_member(
        &self,
        study_id: &str,
        user_id: &str,
        rejected_by: &Actor,
    ) -> Result<Study, StudyHubError> {
        let study = self.validate_study_manager(study_id, rejected_by).await?;
        if study.is_led_by(user_id) {
            return Err(StudyHubError::CannotRejectLeader);
        }
        if !self.storage.remove_member(study_id, user_id).await? {
            return Err(StudyHubError::MembershipNotFound(user_id.to_string()));
        }

        self.log_and_audit(
            Some(study_id),
            MEMBER_REJECTED,
            json!({ "study_id": study_id, "user_id": user_id }),
            Some(rejected_by.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    /// The caller leaves the study. When the leader quits, the study becomes
    /// leaderless; row removal and leader-nulling happen in one storage
    /// critical section.
    pub async fn quit_study(&self, study_id: &str, user: &Actor) -> Result<Study, StudyHubError> {
        let (study, removed) = self
            .storage
            .quit_study(study_id, &user.id)
            .await?
            .ok_or_else(|| StudyHubError::StudyNotFound(study_id.to_string()))?;
        if !removed {
            return Err(StudyHubError::MembershipNotFound(user.id.clone()));
        }

        self.log_and_audit(
            Some(study_id),
            MEMBER_QUIT,
            json!({ "study_id": study_id, "user_id": user.id, "leader": study.leader }),
            Some(user.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    /// Reassigns leadership. A non-member target is added as a pending
    /// member first; relation creation and leader reassignment happen in
    /// one storage critical section.
    pub async fn set_leader(&self, study_id: &str, user_id: &str, set_by: &Actor) -> Result<Study, StudyHubError> {
        self.validate_study_manager(study_id, set_by).await?;
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| StudyHubError::UserNotFound(user_id.to_string()))?;

        let study = self
            .storage
            .transfer_leadership(study_id, user_id)
            .await?
            .ok_or_else(|| StudyHubError::StudyNotFound(study_id.to_string()))?;

        self.log_and_audit(
            Some(study_id),
            LEADER_CHANGED,
            json!({ "study_id": study_id, "new_leader": user_id }),
            Some(set_by.id.as_str()),
        )
        .await?;
        Ok(study)
    }

    pub async fn get_study_audits(&self, study_id: &str, requested_by: &Actor) -> Result<Vec<StudyAudit>, StudyHubError> {
        self.validate_study_manager(study_id, requested_by).await?;
        self.storage.get_study_audits(study_id).await
    }

    pub async fn get_app_logs(&self, requested_by: &Actor) -> Result<Vec<AppLog>, StudyHubError> {
        if !requested_by.is_admin() {
            return Err(StudyHubError::NotStudyManager(requested_by.id.clone()));
        }
        self.logging.get_logs().await
    }
}
