use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::StudyHubError;
use crate::core::models::{
    membership::Membership,
    study::{Study, StudyStatus},
    user::{Role, User},
};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to USER when omitted.
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateStudyRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// User without the password hash.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Study together with its relation rows, the shape every workflow endpoint
/// responds with.
#[derive(Serialize, ToSchema)]
pub struct StudyResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub leader: Option<String>,
    pub status: StudyStatus,
    pub members: Vec<Membership>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl StudyResponse {
    pub fn new(study: Study, members: Vec<Membership>) -> Self {
        StudyResponse {
            id: study.id,
            title: study.title,
            description: study.description,
            leader: study.leader,
            status: study.status,
            members,
            created_at: study.created_at,
        }
    }
}

// Error response struct, `{"detail": "<reason>"}` on the wire
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

// Newtype wrapper for StudyHubError to implement IntoResponse
pub struct ApiError(pub StudyHubError);

impl From<StudyHubError> for ApiError {
    fn from(err: StudyHubError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            StudyHubError::MissingEmail
            | StudyHubError::InvalidEmail(_)
            | StudyHubError::InvalidInput(_, _) => StatusCode::BAD_REQUEST,
            StudyHubError::InvalidCredentials | StudyHubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            StudyHubError::StudyNotOpen(_)
            | StudyHubError::AlreadyJoined(_)
            | StudyHubError::CannotRejectLeader
            | StudyHubError::NotStudyManager(_) => StatusCode::FORBIDDEN,
            StudyHubError::UserNotFound(_)
            | StudyHubError::StudyNotFound(_)
            | StudyHubError::MembershipNotFound(_) => StatusCode::NOT_FOUND,
            StudyHubError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            StudyHubError::InternalServerError(_)
            | StudyHubError::StorageError(_)
            | StudyHubError::LoggingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = self.0.to_string();
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
