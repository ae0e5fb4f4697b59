//! Portal Repositories
//! Mission: One storage interface per entity; callers get snapshots and issue commands
//!
//! `MemoryStore<T>` is the in-process engine behind every trait here. A
//! relational or document engine can implement the same traits.

use crate::portal::models::{
    Absence, Announcement, LeaveRequest, LeaveStatus, Notification, ResearchProject,
    ResearchProjectUpdate, Salary,
};
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::RwLock;
use serde_json::json;

/// Portal errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    NotFound(String),
    Conflict(String),
    Forbidden,
    Invalid(String),
}

pub type PortalResult<T> = Result<T, PortalError>;

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortalError::NotFound(what) => write!(f, "{} not found", what),
            PortalError::Conflict(msg) => write!(f, "{}", msg),
            PortalError::Forbidden => write!(f, "Insufficient permissions"),
            PortalError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PortalError {}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = match self {
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::Forbidden => StatusCode::FORBIDDEN,
            PortalError::Invalid(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Anything stored in a `MemoryStore`
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: &'static str;
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(Announcement, "Announcement");
impl_record!(LeaveRequest, "Leave request");
impl_record!(Absence, "Absence");
impl_record!(Salary, "Salary");
impl_record!(ResearchProject, "Research project");
impl_record!(Notification, "Notification");

/// In-memory table with unique ids. Reads hand out clones.
pub struct MemoryStore<T: Record> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Store pre-existing rows; later duplicates of an id are dropped.
    pub fn with_rows(rows: Vec<T>) -> Self {
        let store = Self::new();
        for row in rows {
            let _ = store.insert(row);
        }
        store
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    pub fn find(&self, id: &str) -> PortalResult<T> {
        self.rows
            .read()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(T::KIND.to_string()))
    }

    pub fn insert(&self, row: T) -> PortalResult<T> {
        let mut rows = self.rows.write();
        if rows.iter().any(|r| r.id() == row.id()) {
            return Err(PortalError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                row.id()
            )));
        }
        rows.push(row.clone());
        Ok(row)
    }

    /// Apply `change` to the row with `id` and return the updated snapshot.
    pub fn modify<F>(&self, id: &str, change: F) -> PortalResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write();
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| PortalError::NotFound(T::KIND.to_string()))?;
        change(row);
        Ok(row.clone())
    }
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn list(&self) -> PortalResult<Vec<Announcement>>;
    async fn create(&self, announcement: Announcement) -> PortalResult<Announcement>;
    async fn approve(&self, id: &str, approved_by: &str) -> PortalResult<Announcement>;
}

#[async_trait]
pub trait LeaveRequestRepository: Send + Sync {
    async fn list(&self) -> PortalResult<Vec<LeaveRequest>>;
    async fn get(&self, id: &str) -> PortalResult<LeaveRequest>;
    async fn create(&self, request: LeaveRequest) -> PortalResult<LeaveRequest>;
    async fn update_status(
        &self,
        id: &str,
        status: LeaveStatus,
        approved_by: &str,
    ) -> PortalResult<LeaveRequest>;
}

#[async_trait]
pub trait AbsenceRepository: Send + Sync {
    async fn list(&self) -> PortalResult<Vec<Absence>>;
    async fn get(&self, id: &str) -> PortalResult<Absence>;
    async fn create(&self, absence: Absence) -> PortalResult<Absence>;
    async fn mark_reported(&self, id: &str) -> PortalResult<Absence>;
}

#[async_trait]
pub trait SalaryRepository: Send + Sync {
    async fn list(&self) -> PortalResult<Vec<Salary>>;
}

#[async_trait]
pub trait ResearchProjectRepository: Send + Sync {
    async fn list(&self) -> PortalResult<Vec<ResearchProject>>;
    async fn get(&self, id: &str) -> PortalResult<ResearchProject>;
    async fn create(&self, project: ResearchProject) -> PortalResult<ResearchProject>;
    async fn update(&self, id: &str, update: ResearchProjectUpdate)
        -> PortalResult<ResearchProject>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn list_for_user(&self, user_id: &str) -> PortalResult<Vec<Notification>>;
    async fn get(&self, id: &str) -> PortalResult<Notification>;
    async fn create(&self, notification: Notification) -> PortalResult<Notification>;
    async fn mark_read(&self, id: &str) -> PortalResult<Notification>;
}

#[async_trait]
impl AnnouncementRepository for MemoryStore<Announcement> {
    async fn list(&self) -> PortalResult<Vec<Announcement>> {
        Ok(self.snapshot())
    }

    async fn create(&self, announcement: Announcement) -> PortalResult<Announcement> {
        self.insert(announcement)
    }

    async fn approve(&self, id: &str, approved_by: &str) -> PortalResult<Announcement> {
        self.modify(id, |a| {
            a.approved = true;
            a.approved_by = Some(approved_by.to_string());
        })
    }
}

#[async_trait]
impl LeaveRequestRepository for MemoryStore<LeaveRequest> {
    async fn list(&self) -> PortalResult<Vec<LeaveRequest>> {
        Ok(self.snapshot())
    }

    async fn get(&self, id: &str) -> PortalResult<LeaveRequest> {
        self.find(id)
    }

    async fn create(&self, request: LeaveRequest) -> PortalResult<LeaveRequest> {
        self.insert(request)
    }

    async fn update_status(
        &self,
        id: &str,
        status: LeaveStatus,
        approved_by: &str,
    ) -> PortalResult<LeaveRequest> {
        self.modify(id, |r| {
            r.status = status;
            r.approved_by = Some(approved_by.to_string());
        })
    }
}

#[async_trait]
impl AbsenceRepository for MemoryStore<Absence> {
    async fn list(&self) -> PortalResult<Vec<Absence>> {
        Ok(self.snapshot())
    }

    async fn get(&self, id: &str) -> PortalResult<Absence> {
        self.find(id)
    }

    async fn create(&self, absence: Absence) -> PortalResult<Absence> {
        self.insert(absence)
    }

    async fn mark_reported(&self, id: &str) -> PortalResult<Absence> {
        self.modify(id, |a| a.reported = true)
    }
}

#[async_trait]
impl SalaryRepository for MemoryStore<Salary> {
    async fn list(&self) -> PortalResult<Vec<Salary>> {
        Ok(self.snapshot())
    }
}

#[async_trait]
impl ResearchProjectRepository for MemoryStore<ResearchProject> {
    async fn list(&self) -> PortalResult<Vec<ResearchProject>> {
        Ok(self.snapshot())
    }

    async fn get(&self, id: &str) -> PortalResult<ResearchProject> {
        self.find(id)
    }

    async fn create(&self, project: ResearchProject) -> PortalResult<ResearchProject> {
        self.insert(project)
    }

    async fn update(
        &self,
        id: &str,
        update: ResearchProjectUpdate,
    ) -> PortalResult<ResearchProject> {
        self.modify(id, |p| update.apply(p))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore<Notification> {
    async fn list_for_user(&self, user_id: &str) -> PortalResult<Vec<Notification>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect())
    }

    async fn get(&self, id: &str) -> PortalResult<Notification> {
        self.find(id)
    }

    async fn create(&self, notification: Notification) -> PortalResult<Notification> {
        self.insert(notification)
    }

    async fn mark_read(&self, id: &str) -> PortalResult<Notification> {
        self.modify(id, |n| n.read = true)
    }
}
