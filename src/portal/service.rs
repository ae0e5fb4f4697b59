//! Portal Service
//! Mission: Gate every portal read and command through the access resolver

use crate::{
    access::{permissions, AccessResolver, Feature},
    auth::models::Claims,
    portal::{
        models::{
            Absence, AccessSummary, Announcement, LeaveDecision, LeaveRequest, LeaveStatus,
            NewAbsence, NewAnnouncement, NewLeaveRequest, NewResearchProject, Notification,
            ResearchProject, ResearchProjectUpdate, Salary,
        },
        repository::{
            AbsenceRepository, AnnouncementRepository, LeaveRequestRepository, MemoryStore,
            NotificationRepository, PortalError, PortalResult, ResearchProjectRepository,
            SalaryRepository,
        },
        seed,
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const LEAVE_REQUESTS: &str = "leave_requests";
const ABSENCES: &str = "absences";
const RESEARCH_PROJECTS: &str = "research_projects";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Storage engines behind the portal, one per entity
#[derive(Clone)]
pub struct PortalRepositories {
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub leave_requests: Arc<dyn LeaveRequestRepository>,
    pub absences: Arc<dyn AbsenceRepository>,
    pub salaries: Arc<dyn SalaryRepository>,
    pub research_projects: Arc<dyn ResearchProjectRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl PortalRepositories {
    /// In-memory repositories holding the demo data set
    pub fn demo() -> Self {
        Self {
            announcements: Arc::new(MemoryStore::with_rows(seed::announcements())),
            leave_requests: Arc::new(MemoryStore::with_rows(seed::leave_requests())),
            absences: Arc::new(MemoryStore::with_rows(seed::absences())),
            salaries: Arc::new(MemoryStore::with_rows(seed::salaries())),
            research_projects: Arc::new(MemoryStore::with_rows(seed::research_projects())),
            notifications: Arc::new(MemoryStore::with_rows(seed::notifications())),
        }
    }
}

pub struct PortalService {
    access: AccessResolver,
    repos: PortalRepositories,
}

impl PortalService {
    pub fn new(access: AccessResolver, repos: PortalRepositories) -> Self {
        Self { access, repos }
    }

    pub fn access(&self) -> &AccessResolver {
        &self.access
    }

    fn has(&self, actor: &Claims, permission: &str) -> bool {
        self.access.has_permission(actor.role.as_str(), permission)
    }

    fn require(&self, actor: &Claims, permission: &str) -> PortalResult<()> {
        if self.has(actor, permission) {
            Ok(())
        } else {
            debug!(user_id = %actor.user_id, role = %actor.role, permission, "Permission denied");
            Err(PortalError::Forbidden)
        }
    }

    fn require_feature(&self, actor: &Claims, feature: Feature) -> PortalResult<()> {
        if self.access.can_access(actor.role.as_str(), feature) {
            Ok(())
        } else {
            debug!(user_id = %actor.user_id, role = %actor.role, feature = feature.as_str(), "Feature denied");
            Err(PortalError::Forbidden)
        }
    }

    fn require_manage(
        &self,
        actor: &Claims,
        resource_type: &str,
        owner_id: &str,
    ) -> PortalResult<()> {
        if self.access.can_manage_resource(
            actor.role.as_str(),
            resource_type,
            Some(owner_id),
            Some(&actor.user_id),
        ) {
            Ok(())
        } else {
            debug!(user_id = %actor.user_id, role = %actor.role, resource_type, owner_id, "Management denied");
            Err(PortalError::Forbidden)
        }
    }

    pub fn access_summary(&self, actor: &Claims) -> AccessSummary {
        AccessSummary {
            role: actor.role,
            permissions: self
                .access
                .permissions(actor.role)
                .into_iter()
                .map(str::to_string)
                .collect(),
            features: self
                .access
                .feature_map(actor.role.as_str())
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    // ===== Announcements =====

    /// Managers see everything; others see approved announcements aimed at their role.
    pub async fn list_announcements(&self, actor: &Claims) -> PortalResult<Vec<Announcement>> {
        self.require_feature(actor, Feature::Announcements)?;
        let all = self.repos.announcements.list().await?;

        if self.has(actor, permissions::MANAGE_ANNOUNCEMENTS) {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|a| a.approved && a.for_roles.contains(&actor.role))
            .collect())
    }

    pub async fn create_announcement(
        &self,
        actor: &Claims,
        new: NewAnnouncement,
    ) -> PortalResult<Announcement> {
        self.require(actor, permissions::MANAGE_ANNOUNCEMENTS)?;
        if new.title.trim().is_empty() {
            return Err(PortalError::Invalid("Title is required".into()));
        }
        if new.for_roles.is_empty() {
            return Err(PortalError::Invalid("At least one target role is required".into()));
        }

        let self_approved = self.has(actor, permissions::APPROVE_ANNOUNCEMENTS);
        let announcement = Announcement {
            id: new_id(),
            title: new.title,
            content: new.content,
            created_by: actor.user_id.clone(),
            created_at: Utc::now(),
            approved: self_approved,
            approved_by: self_approved.then(|| actor.user_id.clone()),
            for_roles: new.for_roles,
        };

        let created = self.repos.announcements.create(announcement).await?;
        info!(id = %created.id, by = %actor.user_id, approved = created.approved, "Announcement created");
        Ok(created)
    }

    pub async fn approve_announcement(&self, actor: &Claims, id: &str) -> PortalResult<Announcement> {
        self.require(actor, permissions::APPROVE_ANNOUNCEMENTS)?;
        let approved = self.repos.announcements.approve(id, &actor.user_id).await?;
        info!(id, by = %actor.user_id, "Announcement approved");
        Ok(approved)
    }

    // ===== Leave requests =====

    pub async fn list_leave_requests(&self, actor: &Claims) -> PortalResult<Vec<LeaveRequest>> {
        self.require_feature(actor, Feature::LeaveRequests)?;
        let all = self.repos.leave_requests.list().await?;

        if self.has(actor, permissions::MANAGE_LEAVE_REQUESTS) {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|r| r.user_id == actor.user_id)
            .collect())
    }

    /// New requests belong to the caller and start out pending.
    pub async fn create_leave_request(
        &self,
        actor: &Claims,
        new: NewLeaveRequest,
    ) -> PortalResult<LeaveRequest> {
        self.require_feature(actor, Feature::LeaveRequests)?;
        if new.end_date < new.start_date {
            return Err(PortalError::Invalid("End date precedes start date".into()));
        }

        let request = LeaveRequest {
            id: new_id(),
            user_id: actor.user_id.clone(),
            user_name: actor.name.clone(),
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason,
            status: LeaveStatus::Pending,
            approved_by: None,
            kind: new.kind,
        };

        let created = self.repos.leave_requests.create(request).await?;
        info!(id = %created.id, user_id = %actor.user_id, "Leave request submitted");
        Ok(created)
    }

    /// Approve or reject, then notify the requester.
    pub async fn decide_leave_request(
        &self,
        actor: &Claims,
        id: &str,
        decision: LeaveDecision,
    ) -> PortalResult<LeaveRequest> {
        self.require(actor, permissions::APPROVE_LEAVE_REQUESTS)?;
        let existing = self.repos.leave_requests.get(id).await?;
        self.require_manage(actor, LEAVE_REQUESTS, &existing.user_id)?;

        let status = LeaveStatus::from(decision);
        let updated = self
            .repos
            .leave_requests
            .update_status(id, status, &actor.user_id)
            .await?;

        self.repos
            .notifications
            .create(Notification {
                id: new_id(),
                user_id: updated.user_id.clone(),
                message: format!("Your leave request has been {}", status.as_str()),
                read: false,
                created_at: Utc::now(),
                link: Some("/leave-requests".into()),
            })
            .await?;

        info!(id, status = status.as_str(), by = %actor.user_id, "Leave request decided");
        Ok(updated)
    }

    // ===== Absences =====

    pub async fn list_absences(&self, actor: &Claims) -> PortalResult<Vec<Absence>> {
        self.require_feature(actor, Feature::Absences)?;
        let all = self.repos.absences.list().await?;

        if self.has(actor, permissions::MANAGE_ABSENCES) {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|a| a.user_id == actor.user_id)
            .collect())
    }

    /// Record an absence for the caller, or for someone else when the
    /// caller may manage absences of that user.
    pub async fn record_absence(&self, actor: &Claims, new: NewAbsence) -> PortalResult<Absence> {
        self.require_feature(actor, Feature::Absences)?;
        let owner = new.user_id.unwrap_or_else(|| actor.user_id.clone());
        self.require_manage(actor, ABSENCES, &owner)?;

        let user_name = match new.user_name {
            Some(name) => name,
            None if owner == actor.user_id => actor.name.clone(),
            None => return Err(PortalError::Invalid("userName is required".into())),
        };

        let absence = Absence {
            id: new_id(),
            user_id: owner,
            user_name,
            date: new.date,
            reason: new.reason,
            reported: false,
        };

        let created = self.repos.absences.create(absence).await?;
        info!(id = %created.id, user_id = %created.user_id, by = %actor.user_id, "Absence recorded");
        Ok(created)
    }

    pub async fn report_absence(&self, actor: &Claims, id: &str) -> PortalResult<Absence> {
        let existing = self.repos.absences.get(id).await?;
        self.require_manage(actor, ABSENCES, &existing.user_id)?;
        self.repos.absences.mark_reported(id).await
    }

    // ===== Salaries =====

    pub async fn list_salaries(&self, actor: &Claims) -> PortalResult<Vec<Salary>> {
        let all = self.repos.salaries.list().await?;
        if self.has(actor, permissions::VIEW_ALL_DATA) {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|s| s.user_id == actor.user_id)
            .collect())
    }

    // ===== Research projects =====

    /// Own projects plus those the caller collaborates on; managers see all.
    pub async fn list_research_projects(
        &self,
        actor: &Claims,
    ) -> PortalResult<Vec<ResearchProject>> {
        self.require_feature(actor, Feature::ResearchProjects)?;
        let all = self.repos.research_projects.list().await?;

        if self.has(actor, permissions::MANAGE_RESEARCH_PROJECTS) {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|p| p.user_id == actor.user_id || p.collaborators.contains(&actor.user_id))
            .collect())
    }

    pub async fn create_research_project(
        &self,
        actor: &Claims,
        new: NewResearchProject,
    ) -> PortalResult<ResearchProject> {
        self.require_feature(actor, Feature::ResearchProjects)?;
        self.require_manage(actor, RESEARCH_PROJECTS, &actor.user_id)?;
        if new.title.trim().is_empty() {
            return Err(PortalError::Invalid("Title is required".into()));
        }

        let project = ResearchProject {
            id: new_id(),
            title: new.title,
            description: new.description,
            user_id: actor.user_id.clone(),
            collaborators: new.collaborators,
            status: new.status,
            start_date: new.start_date,
            end_date: new.end_date,
            publications: new.publications,
        };

        let created = self.repos.research_projects.create(project).await?;
        info!(id = %created.id, user_id = %actor.user_id, "Research project created");
        Ok(created)
    }

    pub async fn update_research_project(
        &self,
        actor: &Claims,
        id: &str,
        update: ResearchProjectUpdate,
    ) -> PortalResult<ResearchProject> {
        let existing = self.repos.research_projects.get(id).await?;
        self.require_manage(actor, RESEARCH_PROJECTS, &existing.user_id)?;
        self.repos.research_projects.update(id, update).await
    }

    // ===== Notifications =====

    pub async fn notifications(&self, actor: &Claims) -> PortalResult<Vec<Notification>> {
        self.repos.notifications.list_for_user(&actor.user_id).await
    }

    pub async fn mark_notification_read(
        &self,
        actor: &Claims,
        id: &str,
    ) -> PortalResult<Notification> {
        let existing = self.repos.notifications.get(id).await?;
        if existing.user_id != actor.user_id {
            return Err(PortalError::Forbidden);
        }
        self.repos.notifications.mark_read(id).await
    }
}
