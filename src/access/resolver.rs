//! Access Resolver
//! Mission: Answer "can role R do X" as a pure function of role and permission table

use crate::access::{
    permissions::{self, PermissionTable},
    roles::{AuthorityTier, Role},
};
use anyhow::Result;
use lazy_static::lazy_static;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

lazy_static! {
    static ref BUILTIN_TABLE: Arc<PermissionTable> = Arc::new(PermissionTable::builtin());
}

/// User-facing functional areas
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Dashboard,
    Users,
    Announcements,
    LeaveRequests,
    Absences,
    ResearchProjects,
    LibraryManagement,
    StudentRegistration,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Dashboard,
        Feature::Users,
        Feature::Announcements,
        Feature::LeaveRequests,
        Feature::Absences,
        Feature::ResearchProjects,
        Feature::LibraryManagement,
        Feature::StudentRegistration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Dashboard => "dashboard",
            Feature::Users => "users",
            Feature::Announcements => "announcements",
            Feature::LeaveRequests => "leave_requests",
            Feature::Absences => "absences",
            Feature::ResearchProjects => "research_projects",
            Feature::LibraryManagement => "library_management",
            Feature::StudentRegistration => "student_registration",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Any one of these grants access (manage-or-view).
    pub fn granting_permissions(&self) -> &'static [&'static str] {
        match self {
            Feature::Dashboard => &[permissions::VIEW_DASHBOARD],
            Feature::Users => &[permissions::MANAGE_USERS],
            Feature::Announcements => &[
                permissions::MANAGE_ANNOUNCEMENTS,
                permissions::VIEW_ANNOUNCEMENTS,
            ],
            Feature::LeaveRequests => &[
                permissions::MANAGE_LEAVE_REQUESTS,
                permissions::MANAGE_OWN_LEAVE_REQUESTS,
            ],
            Feature::Absences => &[
                permissions::MANAGE_ABSENCES,
                permissions::MANAGE_OWN_ABSENCES,
            ],
            Feature::ResearchProjects => &[
                permissions::MANAGE_RESEARCH_PROJECTS,
                permissions::MANAGE_OWN_RESEARCH_PROJECTS,
            ],
            Feature::LibraryManagement => &[permissions::MANAGE_LIBRARY],
            Feature::StudentRegistration => &[permissions::MANAGE_REGISTRATIONS],
        }
    }
}

/// Role-based access decisions. Cheap to clone, no locking.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    table: Arc<PermissionTable>,
}

impl AccessResolver {
    /// Build a resolver over `table`, refusing tables that miss a role.
    pub fn new(table: PermissionTable) -> Result<Self> {
        table.validate()?;
        Ok(Self {
            table: Arc::new(table),
        })
    }

    /// Resolver over the built-in table.
    pub fn builtin() -> Result<Self> {
        BUILTIN_TABLE.validate()?;
        Ok(Self {
            table: BUILTIN_TABLE.clone(),
        })
    }

    /// True iff `permission` is registered for `role`. Unknown roles hold nothing.
    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        match Role::from_str(role) {
            Some(role) => self.table.contains(role, permission),
            None => false,
        }
    }

    /// True iff the role holds at least one permission mapped to the feature.
    /// Unknown features and unknown roles resolve to false.
    pub fn can_access_feature(&self, role: &str, feature: &str) -> bool {
        let Some(feature) = Feature::from_str(feature) else {
            return false;
        };
        self.can_access(role, feature)
    }

    pub fn can_access(&self, role: &str, feature: Feature) -> bool {
        feature
            .granting_permissions()
            .iter()
            .any(|p| self.has_permission(role, p))
    }

    /// Resource-level management right, evaluated in order:
    /// full-admin override, then supervisory `manage_<type>`,
    /// then `manage_own_<type>` plus ownership.
    pub fn can_manage_resource(
        &self,
        role: &str,
        resource_type: &str,
        resource_owner_id: Option<&str>,
        acting_user_id: Option<&str>,
    ) -> bool {
        let Some(acting_user_id) = acting_user_id.filter(|id| !id.is_empty()) else {
            return false;
        };
        let Some(parsed) = Role::from_str(role) else {
            return false;
        };

        match parsed.tier() {
            AuthorityTier::Full => true,
            AuthorityTier::Supervisory => {
                self.has_permission(role, &format!("manage_{resource_type}"))
            }
            AuthorityTier::SelfService => {
                self.has_permission(role, &format!("manage_own_{resource_type}"))
                    && resource_owner_id == Some(acting_user_id)
            }
        }
    }

    pub fn permissions(&self, role: Role) -> Vec<&str> {
        self.table.permissions(role)
    }

    /// Feature name -> accessible, for navigation menus.
    pub fn feature_map(&self, role: &str) -> BTreeMap<&'static str, bool> {
        Feature::ALL
            .into_iter()
            .map(|f| (f.as_str(), self.can_access(role, f)))
            .collect()
    }
}
