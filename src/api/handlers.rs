use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::StudyHubError,
        models::{
            audit::{AppLog, StudyAudit},
            membership::Membership,
            study::{Study, StudyPatch},
            user::{Actor, Role, User},
        },
        services::StudyService,
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, patch, post},
};
use http::header;
use std::sync::Arc;
use uuid::Uuid;

pub type AppService = Arc<StudyService<InMemoryLogging, InMemoryStorage>>;

/// Middleware validating the JWT when one is presented. Requests without an
/// Authorization header pass through as anonymous; handlers that need an
/// authenticated caller reject them via `require_actor`.
async fn auth_middleware(
    State(service): State<AppService>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let claims = match req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(auth_header) => {
            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| StudyHubError::Unauthorized("Invalid Authorization header".to_string()))?;
            Some(service.validate_token(token)?)
        }
        None => None,
    };
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn require_actor(claims: Option<Claims>) -> Result<Actor, ApiError> {
    claims
        .map(|c| c.actor())
        .ok_or_else(|| ApiError(StudyHubError::Unauthorized("Missing Authorization header".to_string())))
}

async fn study_response(service: &AppService, study: Study) -> Result<StudyResponse, ApiError> {
    let members = service.get_study_members(&study.id).await?;
    Ok(StudyResponse::new(study, members))
}

// Define API routes
pub fn api_routes(service: AppService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/login", post(login))
        .route("/users", post(create_user))
        .route("/users/{user_id}", get(get_user))
        .route("/studies", get(list_studies).post(create_study))
        .route(
            "/studies/{id}",
            get(get_study).put(update_study).patch(update_study).delete(delete_study),
        )
        .route("/studies/{id}/join", patch(join_study))
        .route("/studies/{id}/quit", patch(quit_study))
        .route("/studies/{id}/approval", get(approval))
        .route("/studies/{id}/approval/{user_id}", patch(approve_member))
        .route("/studies/{id}/reject/{user_id}", patch(reject_member))
        .route("/studies/{id}/set-leader/{user_id}", patch(set_leader))
        .route("/studies/{id}/audits", get(get_study_audits))
        .route("/logs", get(get_app_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware))
        .with_state(service)
}

async fn health() -> &'static str {
    "OK"
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(service): State<AppService>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(service): State<AppService>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        password: req.password,
        role: req.role.unwrap_or(Role::User),
    };
    let created = service.add_user(user).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = String, Path, description = "ID of the user to retrieve")),
    responses(
        (status = 200, description = "User retrieved", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_user(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    require_actor(claims)?;
    let user = service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| StudyHubError::UserNotFound(user_id))?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/studies",
    responses((status = 200, description = "All studies", body = Vec<StudyResponse>))
)]
pub(crate) async fn list_studies(State(service): State<AppService>) -> Result<Json<Vec<StudyResponse>>, ApiError> {
    let mut out = Vec::new();
    for study in service.list_studies().await? {
        out.push(study_response(&service, study).await?);
    }
    Ok(Json(out))
}

#[utoipa::path(
    get,
    path = "/studies/{id}",
    params(("id" = String, Path, description = "Study id")),
    responses(
        (status = 200, description = "Study detail", body = StudyResponse),
        (status = 404, description = "Study not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_study(
    State(service): State<AppService>,
    Path(id): Path<String>,
) -> Result<Json<StudyResponse>, ApiError> {
    let study = service
        .get_study(&id)
        .await?
        .ok_or_else(|| StudyHubError::StudyNotFound(id))?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    post,
    path = "/studies",
    request_body = CreateStudyRequest,
    responses(
        (status = 201, description = "Study created, creator becomes leader", body = StudyResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn create_study(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Json(req): Json<CreateStudyRequest>,
) -> Result<(StatusCode, Json<StudyResponse>), ApiError> {
    let actor = require_actor(claims)?;
    let study = service.create_study(req.title, req.description, &actor).await?;
    Ok((StatusCode::CREATED, Json(study_response(&service, study).await?)))
}

#[utoipa::path(
    patch,
    path = "/studies/{id}",
    request_body = StudyPatch,
    params(("id" = String, Path, description = "Study id")),
    responses(
        (status = 200, description = "Study updated", body = StudyResponse),
        (status = 403, description = "Not leader or admin", body = ErrorResponse),
        (status = 404, description = "Study not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn update_study(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
    Json(patch): Json<StudyPatch>,
) -> Result<Json<StudyResponse>, ApiError> {
    let actor = require_actor(claims)?;
    let study = service.update_study(&id, patch, &actor).await?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    delete,
    path = "/studies/{id}",
    params(("id" = String, Path, description = "Study id")),
    responses(
        (status = 204, description = "Study deleted"),
        (status = 403, description = "Not leader or admin", body = ErrorResponse),
        (status = 404, description = "Study not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn delete_study(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = require_actor(claims)?;
    service.delete_study(&id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/studies/{id}/join",
    params(("id" = String, Path, description = "Study to join")),
    responses(
        (status = 200, description = "Joined, approval pending", body = StudyResponse),
        (status = 403, description = "Study not open or already joined", body = ErrorResponse),
        (status = 404, description = "Study not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn join_study(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<StudyResponse>, ApiError> {
    let actor = require_actor(claims)?;
    let study = service.join_study(&id, &actor).await?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    patch,
    path = "/studies/{id}/quit",
    params(("id" = String, Path, description = "Study to leave")),
    responses(
        (status = 200, description = "Left the study; a quitting leader leaves it leaderless", body = StudyResponse),
        (status = 404, description = "Study or membership not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn quit_study(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<StudyResponse>, ApiError> {
    let actor = require_actor(claims)?;
    let study = service.quit_study(&id, &actor).await?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    get,
    path = "/studies/{id}/approval",
    params(("id" = String, Path, description = "Study id")),
    responses(
        (status = 200, description = "All relation rows, pending and approved", body = Vec<Membership>),
        (status = 403, description = "Not leader or admin", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn approval(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Membership>>, ApiError> {
    let actor = require_actor(claims)?;
    let applicants = service.list_applicants(&id, &actor).await?;
    Ok(Json(applicants))
}

#[utoipa::path(
    patch,
    path = "/studies/{id}/approval/{user_id}",
    params(
        ("id" = String, Path, description = "Study id"),
        ("user_id" = String, Path, description = "Member to approve")
    ),
    responses(
        (status = 200, description = "Member approved", body = Membership),
        (status = 403, description = "Not leader or admin", body = ErrorResponse),
        (status = 404, description = "No relation row for the user", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn approve_member(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<Membership>, ApiError> {
    let actor = require_actor(claims)?;
    let membership = service.approve_member(&id, &user_id, &actor).await?;
    Ok(Json(membership))
}

#[utoipa::path(
    patch,
    path = "/studies/{id}/reject/{user_id}",
    params(
        ("id" = String, Path, description = "Study id"),
        ("user_id" = String, Path, description = "Member to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = StudyResponse),
        (status = 403, description = "Not leader or admin, or target is the leader", body = ErrorResponse),
        (status = 404, description = "No relation row for the user", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn reject_member(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<StudyResponse>, ApiError> {
    let actor = require_actor(claims)?;
    let study = service.reject_member(&id, &user_id, &actor).await?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    patch,
    path = "/studies/{id}/set-leader/{user_id}",
    params(
        ("id" = String, Path, description = "Study id"),
        ("user_id" = String, Path, description = "User to promote")
    ),
    responses(
        (status = 200, description = "Leadership reassigned", body = StudyResponse),
        (status = 403, description = "Not leader or admin", body = ErrorResponse),
        (status = 404, description = "Study or user not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn set_leader(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<StudyResponse>, ApiError> {
    let actor = require_actor(claims)?;
    let study = service.set_leader(&id, &user_id, &actor).await?;
    Ok(Json(study_response(&service, study).await?))
}

#[utoipa::path(
    get,
    path = "/studies/{id}/audits",
    params(("id" = String, Path, description = "Study id")),
    responses(
        (status = 200, description = "Audit trail of the study", body = Vec<StudyAudit>),
        (status = 403, description = "Not leader or admin", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_study_audits(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StudyAudit>>, ApiError> {
    let actor = require_actor(claims)?;
    let audits = service.get_study_audits(&id, &actor).await?;
    Ok(Json(audits))
}

#[utoipa::path(
    get,
    path = "/logs",
    responses(
        (status = 200, description = "Application log", body = Vec<AppLog>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_app_logs(
    State(service): State<AppService>,
    Extension(claims): Extension<Option<Claims>>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    let actor = require_actor(claims)?;
    let logs = service.get_app_logs(&actor).await?;
    Ok(Json(logs))
}
