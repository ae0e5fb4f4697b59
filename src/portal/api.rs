//! Portal API Endpoints
//! Mission: Expose portal records behind bearer auth, 403 on denial

use crate::{
    auth::models::Claims,
    portal::{
        models::{
            Absence, AccessSummary, Announcement, LeaveDecisionRequest, LeaveRequest, NewAbsence,
            NewAnnouncement, NewLeaveRequest, NewResearchProject, Notification, ResearchProject,
            ResearchProjectUpdate, Salary,
        },
        repository::{PortalError, PortalResult},
        service::PortalService,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Shared portal state
#[derive(Clone)]
pub struct PortalState {
    pub service: Arc<PortalService>,
}

impl PortalState {
    pub fn new(service: Arc<PortalService>) -> Self {
        Self { service }
    }
}

/// Portal routes. Handlers expect `Claims` in request extensions,
/// so mount this behind the auth middleware.
pub fn portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/api/access", get(get_access))
        .route(
            "/api/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route("/api/announcements/:id/approve", post(approve_announcement))
        .route(
            "/api/leave-requests",
            get(list_leave_requests).post(create_leave_request),
        )
        .route("/api/leave-requests/:id/status", patch(decide_leave_request))
        .route("/api/absences", get(list_absences).post(record_absence))
        .route("/api/absences/:id/report", post(report_absence))
        .route("/api/salaries", get(list_salaries))
        .route(
            "/api/research-projects",
            get(list_research_projects).post(create_research_project),
        )
        .route("/api/research-projects/:id", patch(update_research_project))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/:id/read", post(mark_notification_read))
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> PortalResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| PortalError::Invalid(e.body_text()))
}

// ===== Route Handlers =====

/// GET /api/access
async fn get_access(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> Json<AccessSummary> {
    Json(state.service.access_summary(&claims))
}

async fn list_announcements(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<Announcement>>> {
    state.service.list_announcements(&claims).await.map(Json)
}

async fn create_announcement(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewAnnouncement>, JsonRejection>,
) -> PortalResult<(StatusCode, Json<Announcement>)> {
    let new = body(payload)?;
    let created = state.service.create_announcement(&claims, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn approve_announcement(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> PortalResult<Json<Announcement>> {
    state
        .service
        .approve_announcement(&claims, &id)
        .await
        .map(Json)
}

async fn list_leave_requests(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<LeaveRequest>>> {
    state.service.list_leave_requests(&claims).await.map(Json)
}

async fn create_leave_request(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewLeaveRequest>, JsonRejection>,
) -> PortalResult<(StatusCode, Json<LeaveRequest>)> {
    let new = body(payload)?;
    let created = state.service.create_leave_request(&claims, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/leave-requests/:id/status `{status: approved|rejected}`
async fn decide_leave_request(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<LeaveDecisionRequest>, JsonRejection>,
) -> PortalResult<Json<LeaveRequest>> {
    let decision = body(payload)?;
    state
        .service
        .decide_leave_request(&claims, &id, decision.status)
        .await
        .map(Json)
}

async fn list_absences(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<Absence>>> {
    state.service.list_absences(&claims).await.map(Json)
}

async fn record_absence(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewAbsence>, JsonRejection>,
) -> PortalResult<(StatusCode, Json<Absence>)> {
    let new = body(payload)?;
    let created = state.service.record_absence(&claims, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn report_absence(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> PortalResult<Json<Absence>> {
    state.service.report_absence(&claims, &id).await.map(Json)
}

async fn list_salaries(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<Salary>>> {
    state.service.list_salaries(&claims).await.map(Json)
}

async fn list_research_projects(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<ResearchProject>>> {
    state.service.list_research_projects(&claims).await.map(Json)
}

async fn create_research_project(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewResearchProject>, JsonRejection>,
) -> PortalResult<(StatusCode, Json<ResearchProject>)> {
    let new = body(payload)?;
    let created = state.service.create_research_project(&claims, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_research_project(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<ResearchProjectUpdate>, JsonRejection>,
) -> PortalResult<Json<ResearchProject>> {
    let update = body(payload)?;
    state
        .service
        .update_research_project(&claims, &id, update)
        .await
        .map(Json)
}

async fn list_notifications(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
) -> PortalResult<Json<Vec<Notification>>> {
    state.service.notifications(&claims).await.map(Json)
}

async fn mark_notification_read(
    State(state): State<PortalState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> PortalResult<Json<Notification>> {
    state
        .service
        .mark_notification_read(&claims, &id)
        .await
        .map(Json)
}
