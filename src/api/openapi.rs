use utoipa::OpenApi;

use crate::{
    api::models::{
        CreateStudyRequest, CreateUserRequest, ErrorResponse, LoginRequest, LoginResponse, StudyResponse,
        UserResponse,
    },
    core::models::{
        audit::{AppLog, StudyAudit},
        membership::Membership,
        study::{Study, StudyPatch, StudyStatus},
        user::Role,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::login,
        super::handlers::create_user,
        super::handlers::get_user,
        super::handlers::list_studies,
        super::handlers::get_study,
        super::handlers::create_study,
        super::handlers::update_study,
        super::handlers::delete_study,
        super::handlers::join_study,
        super::handlers::quit_study,
        super::handlers::approval,
        super::handlers::approve_member,
        super::handlers::reject_member,
        super::handlers::set_leader,
        super::handlers::get_study_audits,
        super::handlers::get_app_logs
    ),
    components(schemas(
        CreateUserRequest,
        LoginRequest,
        LoginResponse,
        CreateStudyRequest,
        StudyPatch,
        UserResponse,
        StudyResponse,
        ErrorResponse,
        Role,
        Study,
        StudyStatus,
        Membership,
        AppLog,
        StudyAudit
    )),
    info(
        title = "StudyHub API",
        description = "API for managing study groups and their membership workflow",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
