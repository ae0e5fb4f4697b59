//! Permission Table
//! Mission: Static role -> permission-set mapping, immutable after startup

use crate::access::roles::Role;
use anyhow::{bail, Result};
use std::collections::{BTreeSet, HashMap};

pub const VIEW_DASHBOARD: &str = "view_dashboard";
pub const MANAGE_USERS: &str = "manage_users";
pub const MANAGE_ANNOUNCEMENTS: &str = "manage_announcements";
pub const VIEW_ANNOUNCEMENTS: &str = "view_announcements";
pub const APPROVE_ANNOUNCEMENTS: &str = "approve_announcements";
pub const MANAGE_LEAVE_REQUESTS: &str = "manage_leave_requests";
pub const MANAGE_OWN_LEAVE_REQUESTS: &str = "manage_own_leave_requests";
pub const APPROVE_LEAVE_REQUESTS: &str = "approve_leave_requests";
pub const MANAGE_ABSENCES: &str = "manage_absences";
pub const MANAGE_OWN_ABSENCES: &str = "manage_own_absences";
pub const MANAGE_RESEARCH_PROJECTS: &str = "manage_research_projects";
pub const MANAGE_OWN_RESEARCH_PROJECTS: &str = "manage_own_research_projects";
pub const MANAGE_LIBRARY: &str = "manage_library";
pub const VIEW_LIBRARY_DATA: &str = "view_library_data";
pub const MANAGE_REGISTRATIONS: &str = "manage_registrations";
pub const VIEW_REGISTRATION_DATA: &str = "view_registration_data";
pub const VIEW_ALL_DATA: &str = "view_all_data";
pub const VIEW_OWN_DATA: &str = "view_own_data";

const ADMIN_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    MANAGE_USERS,
    MANAGE_ANNOUNCEMENTS,
    MANAGE_LEAVE_REQUESTS,
    MANAGE_ABSENCES,
    MANAGE_RESEARCH_PROJECTS,
    MANAGE_LIBRARY,
    MANAGE_REGISTRATIONS,
    VIEW_ALL_DATA,
    APPROVE_ANNOUNCEMENTS,
    APPROVE_LEAVE_REQUESTS,
];

const DEAN_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    MANAGE_ANNOUNCEMENTS,
    MANAGE_LEAVE_REQUESTS,
    MANAGE_ABSENCES,
    MANAGE_RESEARCH_PROJECTS,
    VIEW_ALL_DATA,
    APPROVE_LEAVE_REQUESTS,
];

const TEACHER_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_ANNOUNCEMENTS,
    MANAGE_OWN_LEAVE_REQUESTS,
    MANAGE_OWN_ABSENCES,
    MANAGE_OWN_RESEARCH_PROJECTS,
    VIEW_OWN_DATA,
];

const REGISTRAR_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_ANNOUNCEMENTS,
    MANAGE_REGISTRATIONS,
    VIEW_REGISTRATION_DATA,
];

const LIBRARIAN_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_ANNOUNCEMENTS,
    MANAGE_LIBRARY,
    VIEW_LIBRARY_DATA,
];

/// Role -> permission set. Built once, read-only afterwards, shared without locking.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    entries: HashMap<Role, BTreeSet<String>>,
}

impl PermissionTable {
    /// The portal's built-in table.
    pub fn builtin() -> Self {
        Self::from_entries([
            (Role::Admin, ADMIN_PERMISSIONS),
            (Role::Dean, DEAN_PERMISSIONS),
            (Role::Teacher, TEACHER_PERMISSIONS),
            (Role::Registrar, REGISTRAR_PERMISSIONS),
            (Role::Librarian, LIBRARIAN_PERMISSIONS),
        ])
    }

    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, &'a [&'a str])>,
    {
        let entries = entries
            .into_iter()
            .map(|(role, perms)| (role, perms.iter().map(|p| p.to_string()).collect()))
            .collect();
        Self { entries }
    }

    /// Fail fast if any role of the closed enumeration has no entry.
    /// An explicitly empty entry is fine.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = Role::ALL
            .iter()
            .filter(|role| !self.entries.contains_key(role))
            .map(|role| role.as_str())
            .collect();

        if !missing.is_empty() {
            bail!(
                "Permission table has no entry for role(s): {}",
                missing.join(", ")
            );
        }

        Ok(())
    }

    pub fn contains(&self, role: Role, permission: &str) -> bool {
        self.entries
            .get(&role)
            .map(|set| set.contains(permission))
            .unwrap_or(false)
    }

    /// Permissions held by a role, sorted. Empty when the role has no entry.
    pub fn permissions(&self, role: Role) -> Vec<&str> {
        self.entries
            .get(&role)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
