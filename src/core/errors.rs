use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum StudyHubError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Invalid input for field `{0}`: {1}")]
    InvalidInput(String, String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Study {0} not found")]
    StudyNotFound(String),
    #[error("User not found")]
    MembershipNotFound(String),
    #[error("Study not available")]
    StudyNotOpen(String),
    #[error("User already joined study")]
    AlreadyJoined(String),
    #[error("Cannot reject leader")]
    CannotRejectLeader,
    #[error("User {0} is not study leader or admin")]
    NotStudyManager(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}
