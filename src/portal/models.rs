//! Portal Models
//! Mission: Business records of the staff portal and the commands that create or change them

use crate::access::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff announcement, visible once approved to the roles it targets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub approved: bool,
    pub approved_by: Option<String>,
    pub for_roles: Vec<Role>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub for_roles: Vec<Role>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<String>,
    #[serde(rename = "type")]
    pub kind: LeaveType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaveRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: LeaveType,
}

/// Decision on a pending leave request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(d: LeaveDecision) -> Self {
        match d {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDecisionRequest {
    pub status: LeaveDecision,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
    pub reported: bool,
}

/// Record an absence. Without `user_id` the absence is the caller's own.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAbsence {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Monthly salary line. `total = amount + bonuses - deductions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub month: u32,
    pub year: i32,
    pub bonuses: f64,
    pub deductions: f64,
    pub total: f64,
}

impl Salary {
    pub fn new(
        id: &str,
        user_id: &str,
        amount: f64,
        month: u32,
        year: i32,
        bonuses: f64,
        deductions: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount,
            month,
            year,
            bonuses,
            deductions,
            total: amount + bonuses - deductions,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResearchProject {
    pub id: String,
    pub title: String,
    pub description: String,
    pub user_id: String,
    pub collaborators: Vec<String>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub publications: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub collaborators: Vec<String>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publications: Vec<String>,
}

/// Partial update; absent fields keep their value. Ownership cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub collaborators: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub end_date: Option<DateTime<Utc>>,
    pub publications: Option<Vec<String>>,
}

impl ResearchProjectUpdate {
    pub fn apply(self, project: &mut ResearchProject) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(collaborators) = self.collaborators {
            project.collaborators = collaborators;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(end_date) = self.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(publications) = self.publications {
            project.publications = publications;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub link: Option<String>,
}

/// Role, permissions and feature switches of the caller - GET /api/access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSummary {
    pub role: Role,
    pub permissions: Vec<String>,
    pub features: std::collections::BTreeMap<String, bool>,
}
